//! Engine configuration
//!
//! This module provides `EvolutionConfig`, the immutable record of
//! hyperparameters an engine is constructed from, and its builder. A
//! configuration round-trips losslessly through serde so a run can be
//! described, persisted and resumed from it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// How the mutation probability changes over a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationSchedule {
    /// Always use the configured probability
    #[default]
    Constant,
    /// Start at 1 and fall linearly through the configured probability,
    /// which is reached after `horizon` evaluations
    Annealed { horizon: usize },
}

impl MutationSchedule {
    /// Mutation probability after `evaluations` evaluations
    pub fn probability(&self, base: f64, evaluations: usize) -> f64 {
        match *self {
            MutationSchedule::Constant => base,
            MutationSchedule::Annealed { horizon } => {
                let progress = evaluations as f64 / horizon.max(1) as f64;
                (1.0 - (1.0 - base) * progress).clamp(0.0, 1.0)
            }
        }
    }
}

/// How many offspring a linear engine produces per generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stepping {
    /// One pair of parents per generation
    #[default]
    SteadyState,
    /// `population_size` parents per generation
    Generational,
}

/// Seed pool settings
///
/// When present, the initial population is drawn from the runners that got
/// farthest in a pool of `pool_size` random genomes, each evaluated with the
/// shorter `time_limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedingConfig {
    pub pool_size: usize,
    pub time_limit: Duration,
}

impl SeedingConfig {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            time_limit: Duration::from_secs(60),
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

/// Hyperparameters of one search engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population size
    pub population_size: usize,
    /// Probability that a pair of parents is recombined
    pub crossover_probability: f64,
    /// Base probability that an offspring is mutated
    pub mutation_probability: f64,
    /// How the mutation probability moves over the run
    pub mutation_schedule: MutationSchedule,
    /// Steady-state or generational stepping (linear engine only)
    pub stepping: Stepping,
    /// Hard time limit of every evaluation
    pub eval_time_limit: Duration,
    /// Total evaluations a trial may spend
    pub evaluation_budget: usize,
    /// RNG seed
    pub seed: u64,
    /// Optional seed pool for the initial population
    pub seeding: Option<SeedingConfig>,
    /// Copy both parents into the offspring when crossover does not fire,
    /// so every pair is mutated and evaluated (linear engine only)
    #[serde(default)]
    pub pass_through_parents: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            crossover_probability: 0.9,
            mutation_probability: 0.05,
            mutation_schedule: MutationSchedule::Constant,
            stepping: Stepping::SteadyState,
            eval_time_limit: Duration::from_secs(180),
            evaluation_budget: 1000,
            seed: 1234,
            seeding: None,
            pass_through_parents: false,
        }
    }
}

impl EvolutionConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> EvolutionConfigBuilder {
        EvolutionConfigBuilder::default()
    }

    /// Mutation probability after `evaluations` evaluations
    pub fn mutation_probability_at(&self, evaluations: usize) -> f64 {
        self.mutation_schedule
            .probability(self.mutation_probability, evaluations)
    }

    /// Check every field
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(EvolutionError::Configuration(format!(
                "Crossover probability {} is outside [0, 1]",
                self.crossover_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(EvolutionError::Configuration(format!(
                "Mutation probability {} is outside [0, 1]",
                self.mutation_probability
            )));
        }
        if let MutationSchedule::Annealed { horizon: 0 } = self.mutation_schedule {
            return Err(EvolutionError::Configuration(
                "Annealing horizon must be positive".to_string(),
            ));
        }
        if self.eval_time_limit.is_zero() {
            return Err(EvolutionError::Configuration(
                "Evaluation time limit must be positive".to_string(),
            ));
        }
        if let Some(seeding) = &self.seeding {
            if seeding.pool_size < self.population_size {
                return Err(EvolutionError::Configuration(format!(
                    "Seed pool of {} cannot fill a population of {}",
                    seeding.pool_size, self.population_size
                )));
            }
        }
        Ok(())
    }
}

/// Builder for EvolutionConfig
#[derive(Clone, Debug, Default)]
pub struct EvolutionConfigBuilder {
    config: EvolutionConfig,
}

impl EvolutionConfigBuilder {
    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the crossover probability
    pub fn crossover_probability(mut self, probability: f64) -> Self {
        self.config.crossover_probability = probability;
        self
    }

    /// Set the base mutation probability
    pub fn mutation_probability(mut self, probability: f64) -> Self {
        self.config.mutation_probability = probability;
        self
    }

    /// Set the mutation schedule
    pub fn mutation_schedule(mut self, schedule: MutationSchedule) -> Self {
        self.config.mutation_schedule = schedule;
        self
    }

    /// Set the stepping mode
    pub fn stepping(mut self, stepping: Stepping) -> Self {
        self.config.stepping = stepping;
        self
    }

    /// Set the per-evaluation time limit
    pub fn eval_time_limit(mut self, limit: Duration) -> Self {
        self.config.eval_time_limit = limit;
        self
    }

    /// Set the evaluation budget
    pub fn evaluation_budget(mut self, budget: usize) -> Self {
        self.config.evaluation_budget = budget;
        self
    }

    /// Set the RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Draw the initial population from a seed pool
    pub fn seeding(mut self, seeding: SeedingConfig) -> Self {
        self.config.seeding = Some(seeding);
        self
    }

    /// Pass uncrossed parents on to mutation and evaluation
    pub fn pass_through_parents(mut self, enabled: bool) -> Self {
        self.config.pass_through_parents = enabled;
        self
    }

    /// Validate and build
    pub fn build(self) -> EvoResult<EvolutionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
