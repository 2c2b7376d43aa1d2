//! Crossover operators
//!
//! This module provides crossover operators for sequence genomes.

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::genome::sequence::Sequence;
use crate::genome::traits::{Allele, Genome};
use crate::operators::traits::CrossoverOperator;

/// Two-point crossover
///
/// Swaps the segment between two cut points, both shorter than the shorter
/// parent. Parents too short to hold two distinct interior points are
/// returned unchanged.
#[derive(Clone, Debug, Default)]
pub struct TwoPointCrossover {
    /// Smallest allowed first cut point
    pub min_point: usize,
}

impl TwoPointCrossover {
    /// Create a new two-point crossover
    pub fn new(min_point: usize) -> Self {
        Self { min_point }
    }
}

impl<A: Allele> CrossoverOperator<Sequence<A>> for TwoPointCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Sequence<A>,
        parent2: &Sequence<A>,
        rng: &mut R,
    ) -> OperatorResult<(Sequence<A>, Sequence<A>)> {
        let shortest = parent1.len().min(parent2.len());
        if shortest < self.min_point + 3 {
            return Ok((parent1.clone(), parent2.clone()));
        }

        let max_point = shortest - 1;
        let point1 = rng.gen_range(self.min_point..max_point - 1);
        let point2 = rng.gen_range(point1 + 1..max_point);

        let (g1, g2) = (parent1.genes(), parent2.genes());
        let child1 = g1[..point1]
            .iter()
            .chain(&g2[point1..point2])
            .chain(&g1[point2..])
            .copied()
            .collect();
        let child2 = g2[..point1]
            .iter()
            .chain(&g1[point1..point2])
            .chain(&g2[point2..])
            .copied()
            .collect();
        Ok((child1, child2))
    }
}

/// Cut-and-splice crossover
///
/// Cuts each parent at its own random point and exchanges the tails, so the
/// offspring lengths can differ from both parents.
#[derive(Clone, Debug, Default)]
pub struct CutAndSpliceCrossover {
    /// Smallest allowed cut point
    pub min_cut: usize,
}

impl CutAndSpliceCrossover {
    /// Create a new cut-and-splice crossover
    pub fn new(min_cut: usize) -> Self {
        Self { min_cut }
    }

    fn cut_point<A: Allele, R: Rng>(&self, parent: &Sequence<A>, rng: &mut R) -> OperatorResult<usize> {
        if !self.can_cut(parent) {
            return Err(OperatorError::CrossoverFailed(format!(
                "cannot cut a genome of length {} at or after {}",
                parent.len(),
                self.min_cut
            )));
        }
        Ok(rng.gen_range(self.min_cut..parent.len() - 1))
    }

    /// Check whether a parent is long enough to be cut
    pub fn can_cut<A: Allele>(&self, parent: &Sequence<A>) -> bool {
        parent.len() >= self.min_cut + 2
    }
}

impl<A: Allele> CrossoverOperator<Sequence<A>> for CutAndSpliceCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Sequence<A>,
        parent2: &Sequence<A>,
        rng: &mut R,
    ) -> OperatorResult<(Sequence<A>, Sequence<A>)> {
        let cut1 = self.cut_point(parent1, rng)?;
        let cut2 = self.cut_point(parent2, rng)?;

        let (g1, g2) = (parent1.genes(), parent2.genes());
        let child1 = g1[..cut1].iter().chain(&g2[cut2..]).copied().collect();
        let child2 = g2[..cut2].iter().chain(&g1[cut1..]).copied().collect();
        Ok((child1, child2))
    }
}

/// Even mix of two-point and cut-and-splice crossover
///
/// Pairs with a parent too short to cut always use two-point crossover.
#[derive(Clone, Debug, Default)]
pub struct MixedCrossover {
    pub two_point: TwoPointCrossover,
    pub cut_and_splice: CutAndSpliceCrossover,
}

impl MixedCrossover {
    /// Create a mixed crossover whose operators share the same minimum cut point
    pub fn new(min_point: usize) -> Self {
        Self {
            two_point: TwoPointCrossover::new(min_point),
            cut_and_splice: CutAndSpliceCrossover::new(min_point),
        }
    }
}

impl<A: Allele> CrossoverOperator<Sequence<A>> for MixedCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Sequence<A>,
        parent2: &Sequence<A>,
        rng: &mut R,
    ) -> OperatorResult<(Sequence<A>, Sequence<A>)> {
        let splice_possible =
            self.cut_and_splice.can_cut(parent1) && self.cut_and_splice.can_cut(parent2);
        if rng.gen_bool(0.5) || !splice_possible {
            self.two_point.crossover(parent1, parent2, rng)
        } else {
            self.cut_and_splice.crossover(parent1, parent2, rng)
        }
    }
}

/// Returns copies of the parents
#[derive(Clone, Debug, Default)]
pub struct CloneCrossover;

impl<G: Genome> CrossoverOperator<G> for CloneCrossover {
    fn crossover<R: Rng>(&self, parent1: &G, parent2: &G, _rng: &mut R) -> OperatorResult<(G, G)> {
        Ok((parent1.clone(), parent2.clone()))
    }
}
