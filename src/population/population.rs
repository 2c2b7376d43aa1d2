//! Population type
//!
//! This module provides the Population container type. A population has a
//! fixed, non-zero size and tracks the index of its fittest member so that
//! `best()` never needs a scan.
//!
//! `replace` keeps the cache with a single comparison in every case but one:
//! overwriting the best slot with a worse individual leaves no known runner-up,
//! so that replacement rescans the whole population. The rescan is linear in
//! the population size and leaves the cache exact; ties keep the lowest slot.

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::genome::traits::Genome;
use crate::population::individual::Individual;

/// A fixed-size population of individuals with a cached best member
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Population<G: Genome> {
    /// The individuals in this population
    individuals: Vec<Individual<G>>,
    /// Slot holding the fittest individual
    best_index: usize,
}

impl<G: Genome> Population<G> {
    /// Create a population from a vector of individuals
    ///
    /// This is the only place the best member is found by a full scan.
    pub fn new(individuals: Vec<Individual<G>>) -> EvoResult<Self> {
        if individuals.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        let best_index = scan_best(&individuals);
        Ok(Self {
            individuals,
            best_index,
        })
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Always false; populations are never empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> EvoResult<&Individual<G>> {
        self.individuals
            .get(index)
            .ok_or(EvolutionError::IndexOutOfRange {
                index,
                len: self.individuals.len(),
            })
    }

    /// Overwrite the individual at `index`
    ///
    /// The best cache is updated by comparing the candidate against the
    /// current best only. When the best slot itself is overwritten by a worse
    /// candidate the cache has nothing left to compare against, so that one
    /// case rescans.
    pub fn replace(&mut self, index: usize, candidate: Individual<G>) -> EvoResult<()> {
        let len = self.individuals.len();
        if index >= len {
            return Err(EvolutionError::IndexOutOfRange { index, len });
        }

        let current_best = self.individuals[self.best_index].rank();
        let candidate_rank = candidate.rank();
        self.individuals[index] = candidate;

        if candidate_rank > current_best {
            self.best_index = index;
        } else if index == self.best_index && candidate_rank < current_best {
            self.best_index = scan_best(&self.individuals);
        }
        Ok(())
    }

    /// The fittest individual
    pub fn best(&self) -> &Individual<G> {
        &self.individuals[self.best_index]
    }

    /// Slot of the fittest individual
    pub fn best_index(&self) -> usize {
        self.best_index
    }

    /// Mean fitness of the population
    pub fn mean(&self) -> f64 {
        debug_assert!(self.all_evaluated(), "statistics over unevaluated population");
        self.individuals.iter().map(|i| i.rank()).sum::<f64>() / self.len() as f64
    }

    /// Sample standard deviation of fitness (0 for a single individual)
    pub fn std_dev(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .individuals
            .iter()
            .map(|i| (i.rank() - mean).powi(2))
            .sum::<f64>()
            / (self.len() - 1) as f64;
        variance.sqrt()
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    /// Take the individuals out of this population
    pub fn into_individuals(self) -> Vec<Individual<G>> {
        self.individuals
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual<G>> {
        self.individuals.iter()
    }

    /// Fitness values in slot order; unevaluated slots report negative infinity
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(|i| i.rank()).collect()
    }
}

fn scan_best<G: Genome>(individuals: &[Individual<G>]) -> usize {
    let mut best = 0;
    for (index, indv) in individuals.iter().enumerate() {
        if indv.rank() > individuals[best].rank() {
            best = index;
        }
    }
    best
}

impl<G: Genome> std::ops::Index<usize> for Population<G> {
    type Output = Individual<G>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}
