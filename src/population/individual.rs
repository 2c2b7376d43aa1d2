//! Individual wrapper type
//!
//! This module provides the Individual type that wraps a genome with its fitness.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::genome::traits::Genome;

/// An individual in the population
///
/// Wraps a genome with its fitness. The fitness is unset until the individual
/// has been evaluated; operators never modify an evaluated individual, they
/// build a new one from a copy of its genome.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Individual<G: Genome> {
    /// The genome of this individual
    pub genome: G,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<f64>,
}

impl<G: Genome> Individual<G> {
    /// Create a new individual with an unevaluated genome
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: None,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(genome: G, fitness: f64) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
        }
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Get the fitness value, panicking if not evaluated
    pub fn fitness_value(&self) -> f64 {
        self.fitness.expect("Individual has not been evaluated")
    }

    /// Fitness used for ranking: unevaluated individuals rank below everything
    pub(crate) fn rank(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Take the genome out of this individual
    pub fn into_genome(self) -> G {
        self.genome
    }

    /// Get a reference to the genome
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Check if this individual is strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness, other.fitness) {
            (Some(f1), Some(f2)) => f1 > f2,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl<G: Genome> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome && self.fitness == other.fitness
    }
}

impl<G: Genome> PartialOrd for Individual<G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.fitness, other.fitness) {
            (Some(f1), Some(f2)) => f1.partial_cmp(&f2),
            (Some(_), None) => Some(Ordering::Greater),
            (None, Some(_)) => Some(Ordering::Less),
            (None, None) => Some(Ordering::Equal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::program::Key;
    use crate::genome::sequence::Sequence;

    fn genome() -> Sequence<Key> {
        Sequence::new(vec![Key::Q, Key::W])
    }

    #[test]
    fn test_new_individual_is_unevaluated() {
        let indv = Individual::new(genome());
        assert!(!indv.is_evaluated());
        assert_eq!(indv.rank(), f64::NEG_INFINITY);
    }

    #[test]
    #[should_panic(expected = "not been evaluated")]
    fn test_fitness_value_panics_when_unevaluated() {
        Individual::new(genome()).fitness_value();
    }

    #[test]
    fn test_is_better_than() {
        let a = Individual::with_fitness(genome(), 3.0);
        let b = Individual::with_fitness(genome(), 2.0);
        let c = Individual::new(genome());

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(b.is_better_than(&c));
        assert!(!c.is_better_than(&b));
        assert!(!a.is_better_than(&a.clone()));
    }

    #[test]
    fn test_serde_shape() {
        let indv = Individual::with_fitness(genome(), 1.5);
        let json = serde_json::to_string(&indv).unwrap();
        assert_eq!(json, r#"{"genome":["q","w"],"fitness":1.5}"#);
    }
}
