//! Seed pools
//!
//! A seed pool is a batch of random genomes, each given one short run. The
//! runners that got farthest become a population's starting point. Pools are
//! expensive, so they are cached on disk per algorithm, pool size and
//! population size and reused on later runs.

use log::info;
use rand::Rng;

use crate::algorithms::config::SeedingConfig;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::harness::ProgramEvaluator;
use crate::experiment::storage::{read_json, write_json, ResultsStore};
use crate::population::individual::Individual;
use crate::strategies::traits::Strategy;

/// Evaluate a random pool and keep the `population_size` farthest runners
///
/// Pool members are scored with the strategy's fitness, but ranked by the
/// distance they ran. Returned individuals carry their fitness.
pub fn build_seed_pool<S, V, R>(
    strategy: &S,
    evaluator: &mut V,
    seeding: &SeedingConfig,
    population_size: usize,
    rng: &mut R,
) -> EvoResult<Vec<Individual<S::Genome>>>
where
    S: Strategy,
    V: ProgramEvaluator,
    R: Rng,
{
    if seeding.pool_size < population_size {
        return Err(EvolutionError::Configuration(format!(
            "Seed pool of {} cannot fill a population of {}",
            seeding.pool_size, population_size
        )));
    }

    let genomes: Vec<_> = (0..seeding.pool_size)
        .map(|_| strategy.random_genome(rng))
        .collect();
    let programs = genomes
        .iter()
        .map(|genome| strategy.decode(genome))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "{}: evaluating a seed pool of {} for {:?} each",
        strategy.name(),
        seeding.pool_size,
        seeding.time_limit
    );
    let results = evaluator.evaluate(&programs, seeding.time_limit)?;

    let mut candidates: Vec<(Individual<S::Genome>, f64)> = genomes
        .into_iter()
        .zip(results)
        .map(|(genome, result)| {
            let fitness = strategy.fitness(result.progress, result.elapsed);
            (Individual::with_fitness(genome, fitness), result.progress)
        })
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(candidates
        .into_iter()
        .take(population_size)
        .map(|(individual, _)| individual)
        .collect())
}

/// Load the cached seed pool for a strategy, building and caching it first
/// if there is none
pub fn seed_population<S, V, R>(
    store: &ResultsStore,
    strategy: &S,
    evaluator: &mut V,
    seeding: &SeedingConfig,
    population_size: usize,
    rng: &mut R,
) -> EvoResult<Vec<Individual<S::Genome>>>
where
    S: Strategy,
    V: ProgramEvaluator,
    R: Rng,
{
    let path = store.seed_path(strategy.name(), seeding.pool_size, population_size)?;
    if path.exists() {
        info!("{}: reusing seed pool {}", strategy.name(), path.display());
        return read_json(&path);
    }

    let seeds = build_seed_pool(strategy, evaluator, seeding, population_size, rng)?;
    write_json(&path, &seeds)?;
    info!("{}: seed pool saved to {}", strategy.name(), path.display());
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::harness::EvaluationResult;
    use crate::evaluation::program::ActuationProgram;
    use crate::genome::traits::Genome;
    use crate::strategies::presets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tempfile::tempdir;

    #[derive(Default)]
    struct StepCounter {
        calls: usize,
    }

    impl ProgramEvaluator for StepCounter {
        fn evaluate(
            &mut self,
            programs: &[ActuationProgram],
            time_limit: Duration,
        ) -> EvoResult<Vec<EvaluationResult>> {
            assert_eq!(time_limit, Duration::from_secs(5));
            self.calls += programs.len();
            Ok(programs
                .iter()
                .map(|p| EvaluationResult {
                    progress: p.len() as f64,
                    elapsed: Duration::from_secs(2),
                })
                .collect())
        }
    }

    fn seeding() -> SeedingConfig {
        SeedingConfig::new(20).with_time_limit(Duration::from_secs(5))
    }

    #[test]
    fn test_pool_keeps_farthest_runners() {
        let strategy = presets::keystroke().unwrap();
        let mut evaluator = StepCounter::default();
        let mut rng = StdRng::seed_from_u64(3);

        let seeds = build_seed_pool(&strategy, &mut evaluator, &seeding(), 5, &mut rng).unwrap();
        assert_eq!(evaluator.calls, 20);
        assert_eq!(seeds.len(), 5);
        assert!(seeds.iter().all(|s| s.is_evaluated()));
        let lengths: Vec<usize> = seeds.iter().map(|s| s.genome.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_pool_too_small() {
        let strategy = presets::keystroke().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let result = build_seed_pool(&strategy, &mut StepCounter::default(), &seeding(), 30, &mut rng);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_cached_pool_is_reused() {
        let dir = tempdir().unwrap();
        let store = ResultsStore::new(dir.path());
        let strategy = presets::keystroke().unwrap();
        let mut evaluator = StepCounter::default();
        let mut rng = StdRng::seed_from_u64(3);

        let first =
            seed_population(&store, &strategy, &mut evaluator, &seeding(), 5, &mut rng).unwrap();
        let second =
            seed_population(&store, &strategy, &mut evaluator, &seeding(), 5, &mut rng).unwrap();

        assert_eq!(evaluator.calls, 20);
        assert!(store.seed_path("keystroke", 20, 5).unwrap().exists());
        let first: Vec<_> = first.iter().map(|i| &i.genome).collect();
        let second: Vec<_> = second.iter().map(|i| &i.genome).collect();
        assert_eq!(first, second);
    }
}
