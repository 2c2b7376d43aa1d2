//! Diagnostics and statistics
//!
//! This module provides the per-step history records a trial appends as it
//! runs, and the aggregation of many trials' histories into one.

use serde::{Deserialize, Serialize};

use crate::genome::traits::Genome;
use crate::population::population::Population;

/// Population statistics after one engine step
///
/// Appended once per `advance`; never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Generation counter of the engine
    pub generation: usize,
    /// Best fitness in the population
    pub best_fitness: f64,
    /// Mean fitness of the population
    pub mean_fitness: f64,
    /// Sample standard deviation of the population's fitness
    pub std_dev: f64,
}

impl HistoryRecord {
    /// Compute a record from an evaluated population
    pub fn from_population<G: Genome>(
        population: &Population<G>,
        generation: usize,
        evaluations: usize,
    ) -> Self {
        Self {
            evaluations,
            generation,
            best_fitness: population.best().fitness_value(),
            mean_fitness: population.mean(),
            std_dev: population.std_dev(),
        }
    }
}

/// The history of one trial
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn record(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Best fitness of the last record
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.records.last().map(|r| r.best_fitness)
    }

    /// Best fitness after every step
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.best_fitness).collect()
    }

    /// Mean fitness after every step
    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean_fitness).collect()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        match self.records.last() {
            Some(last) => format!(
                "{} records, {} evaluations, best {:.3}, mean {:.3}",
                self.records.len(),
                last.evaluations,
                last.best_fitness,
                last.mean_fitness
            ),
            None => "empty history".to_string(),
        }
    }
}

impl From<Vec<HistoryRecord>> for History {
    fn from(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }
}

/// Statistics of many trials at the same step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Evaluation count reported by the last trial at this step
    pub evaluations: usize,
    /// Mean over trials of the best fitness
    pub mean_best_fitness: f64,
    /// Mean over trials of the mean fitness
    pub mean_average_fitness: f64,
    /// Sample standard deviation over trials of the best fitness
    pub best_fitness_std_dev: f64,
}

/// Aggregate trial histories step by step
///
/// Records are aligned by position. Trials can run a different number of
/// steps to the same budget, so the result is as long as the shortest
/// history.
pub fn aggregate_histories(histories: &[History]) -> Vec<AggregateRecord> {
    let steps = histories.iter().map(History::len).min().unwrap_or(0);
    let trials = histories.len() as f64;

    (0..steps)
        .map(|step| {
            let column: Vec<&HistoryRecord> =
                histories.iter().map(|h| &h.records[step]).collect();
            let bests: Vec<f64> = column.iter().map(|r| r.best_fitness).collect();

            let mean_best = bests.iter().sum::<f64>() / trials;
            let mean_average = column.iter().map(|r| r.mean_fitness).sum::<f64>() / trials;
            let std_dev = if bests.len() > 1 {
                let variance = bests.iter().map(|b| (b - mean_best).powi(2)).sum::<f64>()
                    / (bests.len() - 1) as f64;
                variance.sqrt()
            } else {
                0.0
            };

            AggregateRecord {
                evaluations: column.last().map_or(0, |r| r.evaluations),
                mean_best_fitness: mean_best,
                mean_average_fitness: mean_average,
                best_fitness_std_dev: std_dev,
            }
        })
        .collect()
}

pub mod prelude {
    pub use super::{aggregate_histories, AggregateRecord, History, HistoryRecord};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::program::Key;
    use crate::genome::sequence::Sequence;
    use crate::population::individual::Individual;
    use approx::assert_relative_eq;

    fn record(evaluations: usize, best: f64, mean: f64) -> HistoryRecord {
        HistoryRecord {
            evaluations,
            generation: 0,
            best_fitness: best,
            mean_fitness: mean,
            std_dev: 0.0,
        }
    }

    #[test]
    fn test_record_from_population() {
        let individuals = [1.0, 2.0, 6.0]
            .iter()
            .map(|&f| Individual::with_fitness(Sequence::new(vec![Key::Q]), f))
            .collect();
        let population = Population::new(individuals).unwrap();
        let record = HistoryRecord::from_population(&population, 4, 33);
        assert_eq!(record.generation, 4);
        assert_eq!(record.evaluations, 33);
        assert_relative_eq!(record.best_fitness, 6.0);
        assert_relative_eq!(record.mean_fitness, 3.0);
        assert_relative_eq!(record.std_dev, 7.0_f64.sqrt());
    }

    #[test]
    fn test_aggregate_two_trials() {
        let a = History::from(vec![record(30, 2.0, 1.0), record(32, 4.0, 2.0)]);
        let b = History::from(vec![record(30, 4.0, 3.0), record(32, 8.0, 4.0), record(34, 9.0, 5.0)]);
        let aggregate = aggregate_histories(&[a, b]);

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate[1].evaluations, 32);
        assert_relative_eq!(aggregate[1].mean_best_fitness, 6.0);
        assert_relative_eq!(aggregate[1].mean_average_fitness, 3.0);
        assert_relative_eq!(aggregate[1].best_fitness_std_dev, 8.0_f64.sqrt());
    }

    #[test]
    fn test_single_trial_has_zero_spread() {
        let a = History::from(vec![record(10, 5.0, 2.0)]);
        let aggregate = aggregate_histories(&[a]);
        assert_eq!(aggregate[0].best_fitness_std_dev, 0.0);
        assert!(aggregate_histories(&[]).is_empty());
    }
}
