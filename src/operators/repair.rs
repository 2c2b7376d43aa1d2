//! Repair operators
//!
//! Repairs canonicalize offspring after crossover and mutation. They never
//! fail, and applying one twice gives the same genome as applying it once.

use crate::genome::bitmask::TimedBitmask;
use crate::genome::sequence::Sequence;
use crate::genome::traits::{Allele, Genome};
use crate::operators::traits::RepairOperator;

/// Leaves the genome untouched
#[derive(Clone, Debug, Default)]
pub struct NoRepair;

impl<G: Genome> RepairOperator<G> for NoRepair {
    fn repair(&self, genome: G) -> G {
        genome
    }
}

/// Replicates genomes that got too short to take part in crossover
///
/// A genome of at most `max_len` genes is repeated `copies` times. The
/// result is only idempotent while `max_len * copies > max_len`, which the
/// constructor enforces.
#[derive(Clone, Debug)]
pub struct ReplicateShort {
    pub max_len: usize,
    pub copies: usize,
}

impl ReplicateShort {
    /// Create a new replicating repair
    pub fn new(max_len: usize, copies: usize) -> Self {
        assert!(copies >= 2, "Replication needs at least two copies");
        Self { max_len, copies }
    }
}

impl Default for ReplicateShort {
    fn default() -> Self {
        Self::new(2, 4)
    }
}

impl<A: Allele> RepairOperator<Sequence<A>> for ReplicateShort {
    fn repair(&self, genome: Sequence<A>) -> Sequence<A> {
        if genome.is_empty() || genome.len() > self.max_len {
            return genome;
        }
        let genes = genome.into_genes();
        Sequence::new(genes.repeat(self.copies))
    }
}

/// Raises every hold duration to at least `min_ms`
///
/// Non-finite durations are left alone so decoding still reports them.
#[derive(Clone, Debug)]
pub struct ClampDurations {
    pub min_ms: f64,
}

impl ClampDurations {
    /// Create a new clamping repair
    pub fn new(min_ms: f64) -> Self {
        Self { min_ms }
    }
}

impl Default for ClampDurations {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RepairOperator<Sequence<TimedBitmask>> for ClampDurations {
    fn repair(&self, mut genome: Sequence<TimedBitmask>) -> Sequence<TimedBitmask> {
        for gene in genome.genes_mut().iter_mut() {
            if gene.duration_ms.is_finite() && gene.duration_ms < self.min_ms {
                gene.duration_ms = self.min_ms;
            }
        }
        genome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::program::Key;

    #[test]
    fn test_replicate_short() {
        let repair = ReplicateShort::default();
        let short = Sequence::new(vec![Key::Q, Key::P]);
        let repaired = repair.repair(short);
        assert_eq!(repaired.len(), 8);
        assert_eq!(repaired[2], Key::Q);
        assert_eq!(repaired[7], Key::P);

        let again = repair.repair(repaired.clone());
        assert_eq!(again, repaired);
    }

    #[test]
    fn test_replicate_leaves_long_and_empty_alone() {
        let repair = ReplicateShort::default();
        let long = Sequence::new(vec![Key::Q, Key::W, Key::O]);
        assert_eq!(repair.repair(long.clone()), long);

        let empty: Sequence<Key> = Sequence::new(vec![]);
        assert!(repair.repair(empty).is_empty());
    }

    #[test]
    fn test_clamp_durations() {
        let repair = ClampDurations::new(5.0);
        let genome = Sequence::new(vec![
            TimedBitmask::new([true; 4], -3.0),
            TimedBitmask::new([false; 4], 20.0),
            TimedBitmask::new([false; 4], f64::NAN),
        ]);
        let repaired = repair.repair(genome);

        assert_eq!(repaired[0].duration_ms, 5.0);
        assert_eq!(repaired[1].duration_ms, 20.0);
        assert!(repaired[2].duration_ms.is_nan());
    }
}
