//! Snapshot state structures
//!
//! Complete engine state for persisting and resuming a trial.

use serde::{Deserialize, Serialize};

use crate::algorithms::config::EvolutionConfig;
use crate::diagnostics::History;
use crate::genome::traits::Genome;
use crate::population::individual::Individual;

/// Current snapshot format version
pub const CHECKPOINT_VERSION: u32 = 1;

/// Everything needed to resume an engine
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<G: Genome> {
    /// Schema version for forward compatibility
    pub version: u32,
    /// Name of the strategy that produced the population
    pub algorithm: String,
    /// Configuration the engine was built from
    pub config: EvolutionConfig,
    /// Population in slot (row-major for grids) order
    pub population: Vec<Individual<G>>,
    /// Grid shape, for cellular engines
    pub grid: Option<(usize, usize)>,
    /// Total fitness evaluations
    pub total_evaluations: usize,
    /// Current generation
    pub generation: usize,
    /// Best individual found so far
    pub best: Individual<G>,
    /// History recorded so far
    pub history: History,
}

impl<G: Genome> Snapshot<G> {
    /// Create a snapshot of the current version
    pub fn new(
        algorithm: impl Into<String>,
        config: EvolutionConfig,
        population: Vec<Individual<G>>,
        best: Individual<G>,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            algorithm: algorithm.into(),
            config,
            population,
            grid: None,
            total_evaluations: 0,
            generation: 0,
            best,
            history: History::new(),
        }
    }

    /// Set the evaluation and generation counters
    pub fn with_counters(mut self, total_evaluations: usize, generation: usize) -> Self {
        self.total_evaluations = total_evaluations;
        self.generation = generation;
        self
    }

    /// Set the grid shape
    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid = Some((rows, cols));
        self
    }

    /// Attach a history
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Check if the snapshot can be read by this version
    pub fn is_compatible(&self) -> bool {
        self.version <= CHECKPOINT_VERSION
    }
}
