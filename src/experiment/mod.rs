//! Experiment runner
//!
//! An experiment runs independent trials of one algorithm, each to the same
//! evaluation budget, records every trial's history and aggregates them. With
//! a [`ResultsStore`] attached it also persists each trial, the best solution
//! found across trials, the experiment metadata and the aggregate history.

pub mod seeding;
pub mod storage;

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::info;
use serde::{Deserialize, Serialize};

use crate::algorithms::config::EvolutionConfig;
use crate::algorithms::engine::SearchEngine;
use crate::diagnostics::{aggregate_histories, AggregateRecord, History};
use crate::error::{EvoResult, EvolutionError};
use crate::genome::traits::Genome;
use crate::population::individual::Individual;

pub use storage::ResultsStore;

/// Evaluations between progress log lines
const LOG_EVERY: usize = 100;

/// Outcome of one trial
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TrialResult<G: Genome> {
    pub name: String,
    pub trial: usize,
    pub config: EvolutionConfig,
    pub best_individual: G,
    pub best_fitness: f64,
    pub history: History,
}

/// Best genome found by an algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Solution<G: Genome> {
    pub best_genome: G,
    pub best_fitness: f64,
}

/// What was run, and when
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    /// Seconds since the Unix epoch
    pub date: u64,
    pub trials: usize,
    pub config: EvolutionConfig,
}

/// Outcome of a whole experiment
#[derive(Clone, Debug)]
pub struct ExperimentReport<G: Genome> {
    pub trials: Vec<TrialResult<G>>,
    pub best: Individual<G>,
    pub aggregate: Vec<AggregateRecord>,
}

/// Runs trials of one algorithm
#[derive(Clone, Debug)]
pub struct Experiment {
    name: String,
    config: EvolutionConfig,
    trials: usize,
    store: Option<ResultsStore>,
}

impl Experiment {
    /// Experiment running `trials` trials of `name` configured by `config`
    pub fn new(name: impl Into<String>, config: EvolutionConfig, trials: usize) -> EvoResult<Self> {
        if trials == 0 {
            return Err(EvolutionError::Configuration(
                "An experiment needs at least one trial".to_string(),
            ));
        }
        config.validate()?;
        Ok(Self {
            name: name.into(),
            config,
            trials,
            store: None,
        })
    }

    /// Persist results under `store`
    pub fn with_store(mut self, store: ResultsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Configuration of trial `trial`; each trial gets its own seed
    pub fn trial_config(&self, trial: usize) -> EvolutionConfig {
        let mut config = self.config.clone();
        config.seed = self.config.seed.wrapping_add(trial as u64);
        config
    }

    /// Run every trial, building each engine with `factory`
    ///
    /// `factory` is handed the trial number (from 1) and that trial's
    /// configuration.
    pub fn run<E, F>(&self, mut factory: F) -> EvoResult<ExperimentReport<E::Genome>>
    where
        E: SearchEngine,
        F: FnMut(usize, EvolutionConfig) -> EvoResult<E>,
    {
        info!(
            "running {} for {} trials of {} evaluations",
            self.name, self.trials, self.config.evaluation_budget
        );

        let mut results = Vec::with_capacity(self.trials);
        for trial in 1..=self.trials {
            let started = Instant::now();
            info!("running trial #{}", trial);
            let mut engine = factory(trial, self.trial_config(trial))?;
            let result = self.run_trial(trial, &mut engine)?;
            info!(
                "trial #{} completed after {:.1}s, best fitness {:.3}",
                trial,
                started.elapsed().as_secs_f64(),
                result.best_fitness
            );
            results.push(result);
        }

        self.finish(results)
    }

    /// Run one engine to the evaluation budget, recording its history
    pub fn run_trial<E: SearchEngine>(
        &self,
        trial: usize,
        engine: &mut E,
    ) -> EvoResult<TrialResult<E::Genome>> {
        engine.check_budget_reachable()?;

        let budget = engine.configuration().evaluation_budget;
        let mut history = History::new();
        history.record(engine.history_record());

        let mut logged = 0;
        while engine.total_evaluations() < budget {
            engine.advance()?;
            history.record(engine.history_record());

            if engine.total_evaluations() - logged > LOG_EVERY {
                logged = engine.total_evaluations();
                info!("{} evaluations completed...", logged);
            }
        }

        let best = engine.best_individual();
        let result = TrialResult {
            name: self.name.clone(),
            trial,
            config: engine.configuration().clone(),
            best_individual: best.genome.clone(),
            best_fitness: best.fitness_value(),
            history,
        };

        if let Some(store) = &self.store {
            let path = store.trials_dir(&self.name)?.join(format!("trial{}.json", trial));
            storage::write_json(&path, &result)?;
        }
        Ok(result)
    }

    /// Aggregate finished trials and persist the summary
    pub fn finish<G: Genome>(&self, trials: Vec<TrialResult<G>>) -> EvoResult<ExperimentReport<G>> {
        let best_trial = trials
            .iter()
            .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
            .ok_or_else(|| EvolutionError::Configuration("no trials were run".to_string()))?;
        let best = Individual::with_fitness(best_trial.best_individual.clone(), best_trial.best_fitness);

        let histories: Vec<History> = trials.iter().map(|t| t.history.clone()).collect();
        let aggregate = aggregate_histories(&histories);

        if let Some(store) = &self.store {
            let dir = store.algorithm_dir(&self.name)?;
            let solution = Solution {
                best_genome: best.genome.clone(),
                best_fitness: best_trial.best_fitness,
            };
            storage::write_json(&dir.join("solution.json"), &solution)?;

            let metadata = ExperimentMetadata {
                name: self.name.clone(),
                date: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_secs()),
                trials: trials.len(),
                config: self.config.clone(),
            };
            storage::write_json(&dir.join("metadata.json"), &metadata)?;
            storage::write_json(&dir.join("history.json"), &aggregate)?;
            info!("experiment completed, results saved to {}", dir.display());
        }

        Ok(ExperimentReport {
            trials,
            best,
            aggregate,
        })
    }
}

pub mod prelude {
    pub use super::seeding::{build_seed_pool, seed_population};
    pub use super::storage::ResultsStore;
    pub use super::{Experiment, ExperimentMetadata, ExperimentReport, Solution, TrialResult};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::linear::LinearGA;
    use crate::evaluation::harness::{EvaluationResult, ProgramEvaluator};
    use crate::evaluation::program::{ActuationProgram, Key};
    use crate::genome::sequence::Sequence;
    use crate::strategies::presets;
    use std::time::Duration;
    use tempfile::tempdir;

    struct StepCounter;

    impl ProgramEvaluator for StepCounter {
        fn evaluate(
            &mut self,
            programs: &[ActuationProgram],
            _time_limit: Duration,
        ) -> EvoResult<Vec<EvaluationResult>> {
            Ok(programs
                .iter()
                .map(|p| EvaluationResult {
                    progress: p.len() as f64 / 4.0,
                    elapsed: Duration::from_secs(3),
                })
                .collect())
        }
    }

    fn config() -> EvolutionConfig {
        EvolutionConfig::builder()
            .population_size(6)
            .crossover_probability(1.0)
            .evaluation_budget(20)
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_trials_rejected() {
        assert!(Experiment::new("keystroke", config(), 0).is_err());
    }

    #[test]
    fn test_trial_seeds_differ() {
        let experiment = Experiment::new("keystroke", config(), 3).unwrap();
        assert_eq!(experiment.trial_config(1).seed, 1235);
        assert_eq!(experiment.trial_config(3).seed, 1237);
    }

    #[test]
    fn test_run_records_and_persists() {
        let dir = tempdir().unwrap();
        let store = ResultsStore::new(dir.path());
        let experiment = Experiment::new("keystroke", config(), 2)
            .unwrap()
            .with_store(store.clone());

        let report = experiment
            .run(|_, config| LinearGA::new(presets::keystroke()?, StepCounter, config))
            .unwrap();

        assert_eq!(report.trials.len(), 2);
        for trial in &report.trials {
            let records = trial.history.records();
            // one record at start, one per advance; each advance adds two evaluations
            assert_eq!(records[0].evaluations, 6);
            assert_eq!(records.last().unwrap().evaluations, 20);
            assert_eq!(records.len(), 8);
            assert!(report.best.fitness_value() >= trial.best_fitness);
        }
        assert_eq!(report.aggregate.len(), 8);

        let algorithm_dir = dir.path().join("keystroke");
        assert!(algorithm_dir.join("trials").join("trial2.json").exists());
        assert!(algorithm_dir.join("metadata.json").exists());
        assert!(algorithm_dir.join("history.json").exists());

        let solution: Solution<Sequence<Key>> =
            storage::read_json(&store.solution_path("keystroke")).unwrap();
        assert_eq!(solution.best_fitness, report.best.fitness_value());
    }
}
