//! Replacement operators
//!
//! This module provides the policies that decide where an evaluated
//! offspring goes in a steady-state or generational population.

use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::genome::traits::Genome;
use crate::operators::traits::ReplacementOperator;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Replace a random member among the `k` least fit
#[derive(Clone, Debug)]
pub struct ReplaceAmongWorst {
    pub k: usize,
}

impl ReplaceAmongWorst {
    /// Create a new worst-k replacement
    pub fn new(k: usize) -> Self {
        assert!(k > 0, "k must be positive");
        Self { k }
    }
}

impl Default for ReplaceAmongWorst {
    fn default() -> Self {
        Self::new(5)
    }
}

impl<G: Genome> ReplacementOperator<G> for ReplaceAmongWorst {
    fn choose_target<R: Rng>(
        &self,
        population: &Population<G>,
        _candidate: &Individual<G>,
        _evaluations: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let fitness = population.fitness_values();
        let mut order: Vec<usize> = (0..fitness.len()).collect();
        order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));

        let k = self.k.min(order.len());
        Some(order[rng.gen_range(0..k)])
    }
}

/// Inverse tournament
///
/// Draws `size` distinct members; the candidate takes the place of the least
/// fit of them, but only if it is strictly fitter.
#[derive(Clone, Debug)]
pub struct InverseTournament {
    pub size: usize,
}

impl InverseTournament {
    /// Create a new inverse tournament
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Tournament size must be positive");
        Self { size }
    }
}

impl Default for InverseTournament {
    fn default() -> Self {
        Self::new(3)
    }
}

impl<G: Genome> ReplacementOperator<G> for InverseTournament {
    fn choose_target<R: Rng>(
        &self,
        population: &Population<G>,
        candidate: &Individual<G>,
        _evaluations: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let size = self.size.min(population.len());
        let mut competitors = sample(rng, population.len(), size).into_iter();

        let mut worst = competitors.next()?;
        for idx in competitors {
            if population[idx].rank() < population[worst].rank() {
                worst = idx;
            }
        }
        (candidate.rank() > population[worst].rank()).then_some(worst)
    }
}

/// Inverse-fitness weighted replacement
///
/// Every member is a target with weight `|f|^-alpha`, or 0.25 when `f == 0`.
/// `alpha` grows linearly from 0.5 to 2.0 as the evaluation count approaches
/// `horizon`, so the pressure on weak members rises over a run.
#[derive(Clone, Debug)]
pub struct InverseFitnessWeighted {
    pub horizon: usize,
}

impl InverseFitnessWeighted {
    /// Create a new inverse-fitness replacement
    pub fn new(horizon: usize) -> Self {
        assert!(horizon > 0, "Horizon must be positive");
        Self { horizon }
    }

    /// Exponent applied at `evaluations`
    pub fn alpha(&self, evaluations: usize) -> f64 {
        0.5 + 1.5 * evaluations as f64 / self.horizon as f64
    }

    /// Weight of a single member
    pub fn weight(&self, fitness: f64, evaluations: usize) -> f64 {
        if fitness == 0.0 {
            0.25
        } else {
            (1.0 / fitness.abs()).powf(self.alpha(evaluations))
        }
    }
}

impl Default for InverseFitnessWeighted {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl<G: Genome> ReplacementOperator<G> for InverseFitnessWeighted {
    fn choose_target<R: Rng>(
        &self,
        population: &Population<G>,
        _candidate: &Individual<G>,
        evaluations: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let weights: Vec<f64> = population
            .iter()
            .map(|indv| self.weight(indv.rank(), evaluations))
            .collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => Some(dist.sample(rng)),
            Err(_) => Some(rng.gen_range(0..population.len())),
        }
    }
}

/// Discards every candidate
#[derive(Clone, Debug, Default)]
pub struct NeverReplace;

impl<G: Genome> ReplacementOperator<G> for NeverReplace {
    fn choose_target<R: Rng>(
        &self,
        _population: &Population<G>,
        _candidate: &Individual<G>,
        _evaluations: usize,
        _rng: &mut R,
    ) -> Option<usize> {
        None
    }
}
