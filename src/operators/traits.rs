//! Operator traits
//!
//! This module defines the operator traits the search strategies are composed
//! from. Every operator is generic over the random source so engines can drive
//! them from a single seeded generator.

use rand::Rng;

use crate::error::OperatorResult;
use crate::genome::traits::Genome;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Selection operator trait
///
/// Selects individuals from a population for reproduction.
pub trait SelectionOperator<G: Genome>: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(&self, population: &Population<G>, rng: &mut R) -> usize;

    /// Select multiple individuals from the population
    fn select_many<R: Rng>(
        &self,
        population: &Population<G>,
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count).map(|_| self.select(population, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines genetic material from two parents to create offspring.
pub trait CrossoverOperator<G: Genome>: Send + Sync {
    /// Apply crossover to two parents and produce two offspring
    fn crossover<R: Rng>(&self, parent1: &G, parent2: &G, rng: &mut R)
        -> OperatorResult<(G, G)>;
}

/// Mutation operator trait
///
/// Applies random changes to a genome in place. Callers mutate a copy; the
/// genome of an evaluated individual is never touched.
pub trait MutationOperator<G: Genome>: Send + Sync {
    /// Apply mutation to a genome in place
    fn mutate<R: Rng>(&self, genome: &mut G, rng: &mut R) -> OperatorResult<()>;
}

/// Repair operator trait
///
/// Canonicalizes a genome after crossover and mutation. Repairs must be
/// idempotent.
pub trait RepairOperator<G: Genome>: Send + Sync {
    /// Repair a genome
    fn repair(&self, genome: G) -> G;
}

/// Replacement operator trait
///
/// Decides which population slot, if any, a freshly evaluated candidate takes.
pub trait ReplacementOperator<G: Genome>: Send + Sync {
    /// Choose the slot to overwrite, or `None` to discard the candidate
    ///
    /// `evaluations` is the engine's running evaluation count, for operators
    /// whose pressure changes over a run.
    fn choose_target<R: Rng>(
        &self,
        population: &Population<G>,
        candidate: &Individual<G>,
        evaluations: usize,
        rng: &mut R,
    ) -> Option<usize>;
}
