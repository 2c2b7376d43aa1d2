//! Strategy capability trait
//!
//! A strategy bundles everything representation-specific about a search:
//! how genomes are generated, decoded, scored, recombined, varied, repaired,
//! and where offspring go. The engines are written once against this trait.

use std::time::Duration;

use rand::Rng;

use crate::error::{GenomeError, OperatorResult};
use crate::evaluation::program::ActuationProgram;
use crate::genome::traits::Genome;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// The operations a search engine needs from a strategy
pub trait Strategy: Send + Sync {
    /// Genome representation searched by this strategy
    type Genome: Genome;

    /// Short name used for logs and result directories
    fn name(&self) -> &str;

    /// Generate a random genome
    fn random_genome<R: Rng>(&self, rng: &mut R) -> Self::Genome;

    /// Decode a genome into the program the harness plays
    fn decode(&self, genome: &Self::Genome) -> Result<ActuationProgram, GenomeError> {
        genome.decode()
    }

    /// Fitness of a run that reached `progress` in `elapsed`
    fn fitness(&self, progress: f64, elapsed: Duration) -> f64;

    /// Pick `n` parents, by population index
    fn select_parents<R: Rng>(
        &self,
        population: &Population<Self::Genome>,
        n: usize,
        rng: &mut R,
    ) -> Vec<usize>;

    /// Recombine two parents into two offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Genome,
        parent2: &Self::Genome,
        rng: &mut R,
    ) -> OperatorResult<(Self::Genome, Self::Genome)>;

    /// Return a mutated copy of `genome`
    fn mutate<R: Rng>(&self, genome: &Self::Genome, rng: &mut R) -> OperatorResult<Self::Genome>;

    /// Canonicalize a genome after crossover and mutation
    fn repair(&self, genome: Self::Genome) -> Self::Genome;

    /// Slot the evaluated `candidate` should take, or `None` to discard it
    fn choose_replacement_target<R: Rng>(
        &self,
        population: &Population<Self::Genome>,
        candidate: &Individual<Self::Genome>,
        evaluations: usize,
        rng: &mut R,
    ) -> Option<usize>;
}
