//! Linear genetic algorithm
//!
//! This module implements the tournament-based engine over a flat
//! population. In steady-state mode a generation is one pair of parents and
//! at most two offspring; in generational mode every slot's worth of parents
//! is paired up. By default offspring only exist when crossover fires, so a
//! steady-state step whose crossover roll fails performs no evaluations at
//! all. With `pass_through_parents` set, an uncrossed pair is copied into the
//! offspring instead and goes through mutation and evaluation like children.

use log::info;
use rand::Rng;

use crate::algorithms::config::{EvolutionConfig, Stepping};
use crate::algorithms::engine::{check_population_size, EngineCore, SearchEngine};
use crate::checkpoint::state::Snapshot;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::harness::ProgramEvaluator;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::strategies::traits::Strategy;

/// Tournament-based engine over a linear population
pub struct LinearGA<S: Strategy, V> {
    core: EngineCore<S, V>,
    population: Population<S::Genome>,
}

impl<S, V> LinearGA<S, V>
where
    S: Strategy,
    V: ProgramEvaluator,
{
    /// Build an engine over a random, fully evaluated population
    pub fn new(strategy: S, evaluator: V, config: EvolutionConfig) -> EvoResult<Self> {
        Self::with_population(strategy, evaluator, config, Vec::new())
    }

    /// Build an engine whose population starts with `seeds`
    ///
    /// Slots the seeds do not fill get random genomes. Seeds that carry a
    /// fitness keep it and are not re-evaluated.
    pub fn with_population(
        strategy: S,
        evaluator: V,
        config: EvolutionConfig,
        seeds: Vec<Individual<S::Genome>>,
    ) -> EvoResult<Self> {
        check_stepping(&config)?;
        let mut core = EngineCore::new(strategy, evaluator, config)?;
        let population = core.initial_population(seeds)?;
        info!(
            "{}: initial population of {} ready after {} evaluations",
            core.strategy.name(),
            population.len(),
            core.total_evaluations
        );
        Ok(Self { core, population })
    }

    /// Resume an engine from a snapshot
    pub fn resume(strategy: S, evaluator: V, snapshot: Snapshot<S::Genome>) -> EvoResult<Self> {
        check_stepping(&snapshot.config)?;
        check_population_size(&snapshot.config, snapshot.population.len())?;
        let core = EngineCore::resume(strategy, evaluator, &snapshot)?;
        let population = Population::new(snapshot.population)?;
        Ok(Self { core, population })
    }

    /// The strategy driving this engine
    pub fn strategy(&self) -> &S {
        &self.core.strategy
    }

    /// Give back the evaluator
    pub fn into_evaluator(self) -> V {
        self.core.evaluator
    }

    fn parents_per_generation(&self) -> usize {
        match self.core.config.stepping {
            Stepping::SteadyState => 2,
            Stepping::Generational => self.core.config.population_size,
        }
    }
}

impl<S, V> SearchEngine for LinearGA<S, V>
where
    S: Strategy,
    V: ProgramEvaluator,
{
    type Genome = S::Genome;

    fn advance(&mut self) -> EvoResult<()> {
        let n = self.parents_per_generation();
        let parents = self
            .core
            .strategy
            .select_parents(&self.population, n, &mut self.core.rng);

        let mut offspring = Vec::with_capacity(parents.len());
        for pair in parents.chunks_exact(2) {
            if self.core.rng.gen::<f64>() < self.core.config.crossover_probability {
                let (child1, child2) = self.core.strategy.crossover(
                    self.population[pair[0]].genome(),
                    self.population[pair[1]].genome(),
                    &mut self.core.rng,
                )?;
                offspring.push(child1);
                offspring.push(child2);
            } else if self.core.config.pass_through_parents {
                offspring.push(self.population[pair[0]].genome().clone());
                offspring.push(self.population[pair[1]].genome().clone());
            }
        }

        let offspring = offspring
            .into_iter()
            .map(|genome| self.core.vary(genome))
            .collect::<EvoResult<Vec<_>>>()?;

        for child in self.core.evaluate(offspring)? {
            let target = self.core.strategy.choose_replacement_target(
                &self.population,
                &child,
                self.core.total_evaluations,
                &mut self.core.rng,
            );
            if let Some(index) = target {
                self.population.replace(index, child)?;
            }
        }

        self.core.generation += 1;
        Ok(())
    }

    fn check_budget_reachable(&self) -> EvoResult<()> {
        if self.core.config.crossover_probability <= 0.0 && !self.core.config.pass_through_parents {
            return Err(EvolutionError::Configuration(
                "Crossover probability of 0 never produces offspring, so the budget is unreachable"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn best_individual(&self) -> &Individual<S::Genome> {
        self.core.best_or(&self.population)
    }

    fn configuration(&self) -> &EvolutionConfig {
        &self.core.config
    }

    fn total_evaluations(&self) -> usize {
        self.core.total_evaluations
    }

    fn generation(&self) -> usize {
        self.core.generation
    }

    fn population(&self) -> &Population<S::Genome> {
        &self.population
    }

    fn snapshot(&self) -> Snapshot<S::Genome> {
        Snapshot::new(
            self.core.strategy.name(),
            self.core.config.clone(),
            self.population.individuals().to_vec(),
            self.best_individual().clone(),
        )
        .with_counters(self.core.total_evaluations, self.core.generation)
    }
}

fn check_stepping(config: &EvolutionConfig) -> EvoResult<()> {
    if config.stepping == Stepping::Generational && config.population_size % 2 != 0 {
        return Err(EvolutionError::Configuration(format!(
            "Generational stepping pairs parents, so the population size must be even (got {})",
            config.population_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::harness::EvaluationResult;
    use crate::evaluation::program::{ActuationProgram, Key};
    use crate::fitness::shapes::Distance;
    use crate::genome::sequence::Sequence;
    use crate::operators::crossover::TwoPointCrossover;
    use crate::operators::mutation::EditMutation;
    use crate::operators::replacement::ReplaceAmongWorst;
    use crate::operators::selection::TournamentSelection;
    use crate::strategies::sequence::SequenceStrategy;
    use std::time::Duration;

    /// Scores a program by how many steps it has
    #[derive(Default)]
    struct StepCounter {
        calls: usize,
    }

    impl ProgramEvaluator for StepCounter {
        fn evaluate(
            &mut self,
            programs: &[ActuationProgram],
            _time_limit: Duration,
        ) -> EvoResult<Vec<EvaluationResult>> {
            self.calls += programs.len();
            Ok(programs
                .iter()
                .map(|p| EvaluationResult {
                    progress: p.len() as f64,
                    elapsed: Duration::from_secs(1),
                })
                .collect())
        }
    }

    type TestStrategy = SequenceStrategy<
        Key,
        TournamentSelection,
        TwoPointCrossover,
        EditMutation,
        crate::operators::repair::NoRepair,
        ReplaceAmongWorst,
        Distance,
    >;

    fn strategy() -> TestStrategy {
        SequenceStrategy::builder("steps")
            .length(5..=15)
            .selection(TournamentSelection::new(3))
            .crossover(TwoPointCrossover::new(0))
            .mutation(EditMutation)
            .replacement(ReplaceAmongWorst::new(3))
            .fitness(Distance)
            .build()
            .unwrap()
    }

    fn config(cx: f64) -> EvolutionConfig {
        EvolutionConfig::builder()
            .population_size(8)
            .crossover_probability(cx)
            .mutation_probability(0.5)
            .evaluation_budget(40)
            .seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_initial_population_is_evaluated() {
        let ga = LinearGA::new(strategy(), StepCounter::default(), config(1.0)).unwrap();
        assert_eq!(ga.total_evaluations(), 8);
        assert!(ga.population().all_evaluated());
        assert_eq!(
            ga.best_individual().fitness_value(),
            ga.population().best().fitness_value()
        );
    }

    #[test]
    fn test_steady_state_always_crossing_adds_two() {
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config(1.0)).unwrap();
        for step in 1..=5 {
            ga.advance().unwrap();
            assert_eq!(ga.total_evaluations(), 8 + 2 * step);
            assert_eq!(ga.generation(), step);
        }
    }

    #[test]
    fn test_steady_state_never_crossing_adds_nothing() {
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config(0.0)).unwrap();
        for _ in 0..5 {
            ga.advance().unwrap();
        }
        assert_eq!(ga.total_evaluations(), 8);
        assert!(matches!(
            ga.run_to_budget(),
            Err(EvolutionError::Configuration(_))
        ));
    }

    #[test]
    fn test_pass_through_evaluates_uncrossed_parents() {
        let mut config = config(0.0);
        config.pass_through_parents = true;
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config).unwrap();
        for step in 1..=5 {
            ga.advance().unwrap();
            assert_eq!(ga.total_evaluations(), 8 + 2 * step);
        }
        ga.run_to_budget().unwrap();
        assert_eq!(ga.total_evaluations(), 40);
        assert_eq!(ga.into_evaluator().calls, 40);
    }

    #[test]
    fn test_pass_through_generational_evaluates_every_parent() {
        let mut config = config(0.0);
        config.pass_through_parents = true;
        config.stepping = Stepping::Generational;
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config).unwrap();
        ga.advance().unwrap();
        assert_eq!(ga.total_evaluations(), 16);
    }

    #[test]
    fn test_generational_replaces_whole_batches() {
        let mut config = config(1.0);
        config.stepping = Stepping::Generational;
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config).unwrap();
        ga.advance().unwrap();
        assert_eq!(ga.total_evaluations(), 16);
    }

    #[test]
    fn test_generational_rejects_odd_population() {
        let mut config = config(1.0);
        config.stepping = Stepping::Generational;
        config.population_size = 7;
        let result = LinearGA::new(strategy(), StepCounter::default(), config);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_run_to_budget_and_best_never_regresses() {
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config(0.9)).unwrap();
        let initial_best = ga.best_individual().fitness_value();
        ga.run_to_budget().unwrap();
        assert!(ga.total_evaluations() >= 40);
        assert!(ga.best_individual().fitness_value() >= initial_best);
        assert!(ga.best_individual().fitness_value() >= ga.population().best().fitness_value());
    }

    #[test]
    fn test_seeds_keep_their_fitness() {
        let seeds = vec![Individual::with_fitness(Sequence::new(vec![Key::Q; 3]), 99.0)];
        let ga = LinearGA::with_population(strategy(), StepCounter::default(), config(1.0), seeds)
            .unwrap();
        assert_eq!(ga.total_evaluations(), 7);
        assert_eq!(ga.population()[0].fitness, Some(99.0));
        assert_eq!(ga.best_individual().fitness_value(), 99.0);
    }

    #[test]
    fn test_resume_from_snapshot() {
        let mut ga = LinearGA::new(strategy(), StepCounter::default(), config(1.0)).unwrap();
        ga.advance().unwrap();
        let snapshot = ga.snapshot();

        let mut resumed = LinearGA::resume(strategy(), StepCounter::default(), snapshot).unwrap();
        assert_eq!(resumed.total_evaluations(), 10);
        assert_eq!(resumed.generation(), 1);
        assert_eq!(
            resumed.population().fitness_values(),
            ga.population().fitness_values()
        );
        resumed.advance().unwrap();
        assert_eq!(resumed.total_evaluations(), 12);
    }
}
