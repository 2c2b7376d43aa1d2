//! Mutation operators
//!
//! This module provides mutation operators for sequence genomes. Each
//! operator changes a single gene per application.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{OperatorError, OperatorResult};
use crate::genome::bitmask::TimedBitmask;
use crate::genome::sequence::Sequence;
use crate::genome::traits::{Allele, Genome};
use crate::operators::traits::MutationOperator;

fn pick_gene<A: Allele, R: Rng>(genome: &Sequence<A>, rng: &mut R) -> OperatorResult<usize> {
    if genome.is_empty() {
        return Err(OperatorError::MutationFailed(
            "cannot mutate an empty genome".to_string(),
        ));
    }
    Ok(rng.gen_range(0..genome.len()))
}

/// Edit mutation
///
/// With equal probability replaces one gene with a random one, inserts a
/// random gene, swaps two genes, or deletes one gene. A single-gene genome is
/// never shrunk; the deletion falls back to a replacement.
#[derive(Clone, Debug, Default)]
pub struct EditMutation;

impl EditMutation {
    /// Create a new edit mutation
    pub fn new() -> Self {
        Self
    }
}

impl<A: Allele> MutationOperator<Sequence<A>> for EditMutation {
    fn mutate<R: Rng>(&self, genome: &mut Sequence<A>, rng: &mut R) -> OperatorResult<()> {
        let selected = pick_gene(genome, rng)?;
        let len = genome.len();
        let genes = genome.genes_mut();

        let decider: f64 = rng.gen();
        if decider < 0.25 || (decider >= 0.75 && len == 1) {
            genes[selected] = A::random(rng);
        } else if decider < 0.5 {
            genes.insert(selected, A::random(rng));
        } else if decider < 0.75 {
            let other = rng.gen_range(0..len);
            genes.swap(selected, other);
        } else {
            genes.remove(selected);
        }
        Ok(())
    }
}

/// Replace one randomly chosen gene with a fresh random gene
#[derive(Clone, Debug, Default)]
pub struct RandomResetMutation;

impl RandomResetMutation {
    /// Create a new random reset mutation
    pub fn new() -> Self {
        Self
    }
}

impl<A: Allele> MutationOperator<Sequence<A>> for RandomResetMutation {
    fn mutate<R: Rng>(&self, genome: &mut Sequence<A>, rng: &mut R) -> OperatorResult<()> {
        let selected = pick_gene(genome, rng)?;
        genome.genes_mut()[selected] = A::random(rng);
        Ok(())
    }
}

/// Timed bitmask mutation
///
/// Either flips one control of a gene's mask or shifts its duration by a
/// Gaussian amount, with equal probability.
#[derive(Clone, Debug)]
pub struct TimedBitmaskMutation {
    /// Standard deviation of the duration shift, in milliseconds
    pub sigma: f64,
}

impl TimedBitmaskMutation {
    /// Create a new timed bitmask mutation
    pub fn new(sigma: f64) -> Self {
        assert!(sigma >= 0.0, "Standard deviation must be non-negative");
        Self { sigma }
    }
}

impl Default for TimedBitmaskMutation {
    fn default() -> Self {
        Self::new(7.0)
    }
}

impl MutationOperator<Sequence<TimedBitmask>> for TimedBitmaskMutation {
    fn mutate<R: Rng>(
        &self,
        genome: &mut Sequence<TimedBitmask>,
        rng: &mut R,
    ) -> OperatorResult<()> {
        let selected = pick_gene(genome, rng)?;
        let gene = &mut genome.genes_mut()[selected];

        if rng.gen_bool(0.5) {
            let bit = rng.gen_range(0..4);
            gene.mask[bit] = !gene.mask[bit];
        } else {
            let normal = Normal::new(0.0, self.sigma)
                .map_err(|e| OperatorError::InvalidConfiguration(e.to_string()))?;
            gene.duration_ms += normal.sample(rng);
        }
        Ok(())
    }
}

/// Leaves the genome untouched
#[derive(Clone, Debug, Default)]
pub struct NoMutation;

impl<G: Genome> MutationOperator<G> for NoMutation {
    fn mutate<R: Rng>(&self, _genome: &mut G, _rng: &mut R) -> OperatorResult<()> {
        Ok(())
    }
}
