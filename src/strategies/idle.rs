//! Idle strategy
//!
//! Never touches the controls. Useful as a baseline and for exercising the
//! harness and engines without moving the runner.

use std::time::Duration;

use rand::Rng;

use crate::error::{GenomeError, OperatorResult};
use crate::evaluation::program::{ActuationProgram, Key};
use crate::genome::sequence::Sequence;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::strategies::traits::Strategy;

/// Strategy whose every genome does nothing
#[derive(Clone, Copy, Debug)]
pub struct IdleStrategy {
    name: &'static str,
}

impl IdleStrategy {
    /// Idle baseline for the linear engine
    pub fn new() -> Self {
        Self { name: "idle" }
    }

    /// Idle baseline for the cellular engine
    pub fn cellular() -> Self {
        Self {
            name: "idle-cellular",
        }
    }
}

impl Default for IdleStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for IdleStrategy {
    type Genome = Sequence<Key>;

    fn name(&self) -> &str {
        self.name
    }

    fn random_genome<R: Rng>(&self, _rng: &mut R) -> Sequence<Key> {
        Sequence::new(Vec::new())
    }

    fn decode(&self, _genome: &Sequence<Key>) -> Result<ActuationProgram, GenomeError> {
        Ok(ActuationProgram::new())
    }

    fn fitness(&self, _progress: f64, _elapsed: Duration) -> f64 {
        0.0
    }

    fn select_parents<R: Rng>(
        &self,
        population: &Population<Sequence<Key>>,
        n: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..n).map(|_| rng.gen_range(0..population.len())).collect()
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Sequence<Key>,
        parent2: &Sequence<Key>,
        _rng: &mut R,
    ) -> OperatorResult<(Sequence<Key>, Sequence<Key>)> {
        Ok((parent1.clone(), parent2.clone()))
    }

    fn mutate<R: Rng>(&self, genome: &Sequence<Key>, _rng: &mut R) -> OperatorResult<Sequence<Key>> {
        Ok(genome.clone())
    }

    fn repair(&self, genome: Sequence<Key>) -> Sequence<Key> {
        genome
    }

    fn choose_replacement_target<R: Rng>(
        &self,
        _population: &Population<Sequence<Key>>,
        _candidate: &Individual<Sequence<Key>>,
        _evaluations: usize,
        _rng: &mut R,
    ) -> Option<usize> {
        None
    }
}
