//! Search engine contract
//!
//! `SearchEngine` is what the experiment runner and the command line drive.
//! `EngineCore` holds the state both engines share: the strategy, the
//! evaluator, the RNG, the counters and the best individual ever seen. All
//! evaluations go through it, so the evaluation counter is only ever
//! advanced in one place.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::config::EvolutionConfig;
use crate::checkpoint::state::Snapshot;
use crate::diagnostics::HistoryRecord;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::harness::ProgramEvaluator;
use crate::genome::traits::Genome;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::strategies::traits::Strategy;

/// A search engine running one trial
pub trait SearchEngine {
    /// Genome representation being searched
    type Genome: Genome;

    /// Advance the search by one generation
    fn advance(&mut self) -> EvoResult<()>;

    /// Fail when `run_to_budget` could never reach the evaluation budget
    fn check_budget_reachable(&self) -> EvoResult<()> {
        Ok(())
    }

    /// Advance until the evaluation budget is spent
    fn run_to_budget(&mut self) -> EvoResult<()> {
        self.check_budget_reachable()?;
        while self.total_evaluations() < self.configuration().evaluation_budget {
            self.advance()?;
        }
        Ok(())
    }

    /// Best individual found since the engine was built
    fn best_individual(&self) -> &Individual<Self::Genome>;

    /// Configuration the engine was built from
    fn configuration(&self) -> &EvolutionConfig;

    /// Total fitness evaluations so far
    fn total_evaluations(&self) -> usize;

    /// Generations completed so far
    fn generation(&self) -> usize;

    /// Current population
    fn population(&self) -> &Population<Self::Genome>;

    /// Statistics of the current population
    fn history_record(&self) -> HistoryRecord {
        HistoryRecord::from_population(
            self.population(),
            self.generation(),
            self.total_evaluations(),
        )
    }

    /// Capture the state needed to resume this engine
    fn snapshot(&self) -> Snapshot<Self::Genome>;
}

/// State shared by the linear and cellular engines
#[derive(Debug)]
pub(crate) struct EngineCore<S: Strategy, V> {
    pub(crate) strategy: S,
    pub(crate) evaluator: V,
    pub(crate) config: EvolutionConfig,
    pub(crate) rng: StdRng,
    pub(crate) total_evaluations: usize,
    pub(crate) generation: usize,
    pub(crate) best: Option<Individual<S::Genome>>,
}

impl<S, V> EngineCore<S, V>
where
    S: Strategy,
    V: ProgramEvaluator,
{
    pub(crate) fn new(strategy: S, evaluator: V, config: EvolutionConfig) -> EvoResult<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            strategy,
            evaluator,
            config,
            rng,
            total_evaluations: 0,
            generation: 0,
            best: None,
        })
    }

    /// Rebuild the shared state from a snapshot
    ///
    /// The RNG stream cannot be captured, so a resumed engine reseeds from the
    /// configured seed mixed with the evaluation count.
    pub(crate) fn resume(
        strategy: S,
        evaluator: V,
        snapshot: &Snapshot<S::Genome>,
    ) -> EvoResult<Self> {
        if !snapshot.is_compatible() {
            return Err(crate::error::CheckpointError::VersionMismatch {
                expected: crate::checkpoint::state::CHECKPOINT_VERSION,
                found: snapshot.version,
            }
            .into());
        }
        if snapshot.algorithm != strategy.name() {
            return Err(EvolutionError::Configuration(format!(
                "snapshot was taken from {:?}, not {:?}",
                snapshot.algorithm,
                strategy.name()
            )));
        }
        let mut core = Self::new(strategy, evaluator, snapshot.config.clone())?;
        core.rng = StdRng::seed_from_u64(snapshot.config.seed ^ snapshot.total_evaluations as u64);
        core.total_evaluations = snapshot.total_evaluations;
        core.generation = snapshot.generation;
        core.best = Some(snapshot.best.clone());
        Ok(core)
    }

    /// Build the initial population
    ///
    /// Supplied individuals fill the first slots; the rest are random.
    /// Individuals without a fitness are evaluated, counting towards the
    /// evaluation budget.
    pub(crate) fn initial_population(
        &mut self,
        supplied: Vec<Individual<S::Genome>>,
    ) -> EvoResult<Population<S::Genome>> {
        let size = self.config.population_size;
        let mut individuals: Vec<_> = supplied.into_iter().take(size).collect();
        while individuals.len() < size {
            let genome = self.strategy.random_genome(&mut self.rng);
            individuals.push(Individual::new(genome));
        }

        let pending: Vec<usize> = individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_evaluated())
            .map(|(i, _)| i)
            .collect();
        let genomes = pending
            .iter()
            .map(|&i| individuals[i].genome.clone())
            .collect();
        for (slot, evaluated) in pending.into_iter().zip(self.evaluate(genomes)?) {
            individuals[slot] = evaluated;
        }

        for individual in &individuals {
            self.observe(individual);
        }
        Population::new(individuals)
    }

    /// Decode, run and score a batch of genomes, strictly one after another
    pub(crate) fn evaluate(
        &mut self,
        genomes: Vec<S::Genome>,
    ) -> EvoResult<Vec<Individual<S::Genome>>> {
        if genomes.is_empty() {
            return Ok(Vec::new());
        }
        let programs = genomes
            .iter()
            .map(|genome| self.strategy.decode(genome))
            .collect::<Result<Vec<_>, _>>()?;

        let results = self
            .evaluator
            .evaluate(&programs, self.config.eval_time_limit)?;
        if results.len() != genomes.len() {
            return Err(EvolutionError::Evaluation(format!(
                "evaluator returned {} results for {} programs",
                results.len(),
                genomes.len()
            )));
        }

        let individuals: Vec<_> = genomes
            .into_iter()
            .zip(results)
            .map(|(genome, result)| {
                let fitness = self.strategy.fitness(result.progress, result.elapsed);
                debug!(
                    "evaluated {} genes: progress {:.2} in {:?}, fitness {:.3}",
                    genome.len(),
                    result.progress,
                    result.elapsed,
                    fitness
                );
                Individual::with_fitness(genome, fitness)
            })
            .collect();
        self.total_evaluations += individuals.len();
        for individual in &individuals {
            self.observe(individual);
        }
        Ok(individuals)
    }

    /// Mutate with the scheduled probability, then repair
    pub(crate) fn vary(&mut self, genome: S::Genome) -> EvoResult<S::Genome> {
        let probability = self.config.mutation_probability_at(self.total_evaluations);
        let genome = if self.rng.gen::<f64>() < probability {
            self.strategy.mutate(&genome, &mut self.rng)?
        } else {
            genome
        };
        Ok(self.strategy.repair(genome))
    }

    /// Best individual ever seen, falling back to the population's best
    pub(crate) fn best_or<'a>(
        &'a self,
        population: &'a Population<S::Genome>,
    ) -> &'a Individual<S::Genome> {
        self.best.as_ref().unwrap_or_else(|| population.best())
    }

    fn observe(&mut self, individual: &Individual<S::Genome>) {
        let improved = match &self.best {
            Some(best) => individual.is_better_than(best),
            None => individual.is_evaluated(),
        };
        if improved {
            self.best = Some(individual.clone());
        }
    }
}

/// Check that an engine's population matches its configuration
pub(crate) fn check_population_size(
    config: &EvolutionConfig,
    snapshot_len: usize,
) -> EvoResult<()> {
    if snapshot_len != config.population_size {
        return Err(EvolutionError::Configuration(format!(
            "snapshot holds {} individuals but the configuration asks for {}",
            snapshot_len, config.population_size
        )));
    }
    Ok(())
}
