//! Integration tests for the search engines
//!
//! The environment is replaced by a deterministic evaluator so that runs are
//! fast and reproducible.

use std::time::Duration;

use tempfile::tempdir;
use totter::prelude::*;

/// Scores a program by how often it presses W
#[derive(Default)]
struct PressCounter {
    evaluations: usize,
}

impl ProgramEvaluator for PressCounter {
    fn evaluate(
        &mut self,
        programs: &[ActuationProgram],
        _time_limit: Duration,
    ) -> EvoResult<Vec<EvaluationResult>> {
        self.evaluations += programs.len();
        Ok(programs
            .iter()
            .map(|program| {
                let presses = program
                    .steps()
                    .iter()
                    .flat_map(|step| &step.actions)
                    .filter(|action| **action == Action::Press(Key::W))
                    .count();
                EvaluationResult {
                    progress: presses as f64,
                    elapsed: Duration::from_secs(20),
                }
            })
            .collect())
    }
}

fn config(population_size: usize, budget: usize, seed: u64) -> EvolutionConfig {
    EvolutionConfig::builder()
        .population_size(population_size)
        .crossover_probability(1.0)
        .mutation_probability(0.2)
        .evaluation_budget(budget)
        .seed(seed)
        .build()
        .unwrap()
}

fn trace<E: SearchEngine>(engine: &mut E) -> Vec<f64> {
    let mut best = vec![engine.best_individual().fitness_value()];
    while engine.total_evaluations() < engine.configuration().evaluation_budget {
        engine.advance().unwrap();
        best.push(engine.best_individual().fitness_value());
    }
    best
}

#[test]
fn steady_state_spends_two_evaluations_per_step() {
    let mut engine =
        LinearGA::new(presets::keystroke().unwrap(), PressCounter::default(), config(10, 30, 1))
            .unwrap();
    assert_eq!(engine.total_evaluations(), 10);

    engine.run_to_budget().unwrap();
    assert_eq!(engine.total_evaluations(), 30);
    assert_eq!(engine.generation(), 10);
    assert_eq!(engine.into_evaluator().evaluations, 30);
}

#[test]
fn generational_step_replaces_whole_population() {
    let config = EvolutionConfig::builder()
        .population_size(8)
        .crossover_probability(1.0)
        .stepping(Stepping::Generational)
        .evaluation_budget(40)
        .build()
        .unwrap();
    let mut engine =
        LinearGA::new(presets::bitmask().unwrap(), PressCounter::default(), config).unwrap();

    engine.advance().unwrap();
    assert_eq!(engine.total_evaluations(), 16);
    engine.run_to_budget().unwrap();
    assert_eq!(engine.total_evaluations(), 40);
}

#[test]
fn same_seed_gives_same_run() {
    let run = |seed| {
        let mut engine =
            LinearGA::new(presets::keystroke().unwrap(), PressCounter::default(), config(10, 60, seed))
                .unwrap();
        let best = trace(&mut engine);
        let genomes: Vec<_> = engine
            .population()
            .iter()
            .map(|i| i.genome.clone())
            .collect();
        (best, genomes)
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn linear_best_never_regresses() {
    let mut engine =
        LinearGA::new(presets::key_toggle().unwrap(), PressCounter::default(), config(12, 80, 3))
            .unwrap();
    let best = trace(&mut engine);
    assert!(best.windows(2).all(|w| w[1] >= w[0]), "{:?}", best);
}

#[test]
fn cellular_sweep_evaluates_every_cell() {
    let mut engine = CellularGA::new(
        presets::cellular_keystroke().unwrap(),
        PressCounter::default(),
        config(9, 27, 5),
    )
    .unwrap();
    assert_eq!((engine.grid().rows(), engine.grid().cols()), (3, 3));
    assert_eq!(engine.total_evaluations(), 9);

    engine.run_to_budget().unwrap();
    assert_eq!(engine.total_evaluations(), 27);
    assert_eq!(engine.generation(), 2);
}

#[test]
fn cellular_cells_never_get_worse() {
    let mut engine = CellularGA::new(
        presets::cellular_keystroke().unwrap(),
        PressCounter::default(),
        config(16, 16 * 6, 11),
    )
    .unwrap();

    let mut before = engine.population().fitness_values();
    while engine.total_evaluations() < engine.configuration().evaluation_budget {
        engine.advance().unwrap();
        let after = engine.population().fitness_values();
        assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
        before = after;
    }
}

#[test]
fn cellular_rejects_non_grid_population() {
    let result = CellularGA::new(
        presets::cellular_keystroke().unwrap(),
        PressCounter::default(),
        config(7, 20, 1),
    );
    assert!(matches!(result, Err(EvolutionError::GridShape { .. })));
}

#[test]
fn resumed_engine_continues_from_checkpoint() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keystroke.ckpt");

    let mut engine =
        LinearGA::new(presets::keystroke().unwrap(), PressCounter::default(), config(10, 40, 2))
            .unwrap();
    for _ in 0..5 {
        engine.advance().unwrap();
    }
    save_snapshot(&engine.snapshot(), &path, CheckpointFormat::Binary).unwrap();

    let snapshot = load_snapshot::<Sequence<Key>>(&path).unwrap();
    let mut resumed =
        LinearGA::resume(presets::keystroke().unwrap(), PressCounter::default(), snapshot).unwrap();

    assert_eq!(resumed.total_evaluations(), engine.total_evaluations());
    assert_eq!(resumed.generation(), 5);
    assert_eq!(
        resumed.best_individual().fitness_value(),
        engine.best_individual().fitness_value()
    );

    resumed.run_to_budget().unwrap();
    assert_eq!(resumed.total_evaluations(), 40);
    assert!(resumed.best_individual().fitness_value() >= engine.best_individual().fitness_value());
}

#[test]
fn resume_refuses_other_algorithm() {
    let engine =
        LinearGA::new(presets::keystroke().unwrap(), PressCounter::default(), config(10, 40, 2))
            .unwrap();
    let snapshot = engine.snapshot();
    let result = LinearGA::resume(presets::cellular_keystroke().unwrap(), PressCounter::default(), snapshot);
    assert!(result.is_err());
}

#[test]
fn experiment_aggregates_trials() {
    let experiment = Experiment::new("keystroke", config(6, 20, 4), 3).unwrap();
    let report = experiment
        .run(|_, config| LinearGA::new(presets::keystroke()?, PressCounter::default(), config))
        .unwrap();

    assert_eq!(report.trials.len(), 3);
    let seeds: Vec<u64> = report.trials.iter().map(|t| t.config.seed).collect();
    assert_eq!(seeds, vec![5, 6, 7]);

    let last = report.aggregate.last().unwrap();
    assert_eq!(last.evaluations, 20);
    let mean = report
        .trials
        .iter()
        .map(|t| t.history.final_best_fitness().unwrap())
        .sum::<f64>()
        / 3.0;
    approx::assert_relative_eq!(last.mean_best_fitness, mean, epsilon = 1e-9);
}

#[test]
fn dynamic_mutation_bitmask_evaluates_uncrossed_pairs() {
    let kind = AlgorithmKind::DynamicMutationBitmask;
    let config = EvolutionConfig::builder()
        .population_size(10)
        .crossover_probability(0.0)
        .mutation_schedule(kind.mutation_schedule(30))
        .pass_through_parents(kind.pass_through_parents())
        .evaluation_budget(30)
        .seed(9)
        .build()
        .unwrap();
    let mut engine =
        LinearGA::new(presets::dynamic_mutation_bitmask().unwrap(), PressCounter::default(), config)
            .unwrap();

    engine.advance().unwrap();
    assert_eq!(engine.total_evaluations(), 12);
    engine.run_to_budget().unwrap();
    assert_eq!(engine.total_evaluations(), 30);
    assert_eq!(engine.strategy().name(), "dynamic-mutation-bitmask");
}

#[test]
fn uncrossed_pairs_cost_nothing_by_default() {
    let kind = AlgorithmKind::DynamicReplacementBitmask;
    let config = EvolutionConfig::builder()
        .population_size(10)
        .crossover_probability(0.0)
        .mutation_schedule(kind.mutation_schedule(30))
        .pass_through_parents(kind.pass_through_parents())
        .evaluation_budget(30)
        .build()
        .unwrap();
    let mut engine = LinearGA::new(
        presets::dynamic_replacement_bitmask(30).unwrap(),
        PressCounter::default(),
        config,
    )
    .unwrap();

    for _ in 0..4 {
        engine.advance().unwrap();
    }
    assert_eq!(engine.total_evaluations(), 10);
    assert_eq!(engine.generation(), 4);
}

#[test]
fn idle_cellular_sweeps_without_moving() {
    let kind = AlgorithmKind::IdleCellular;
    assert_eq!(kind.engine(), EngineKind::Cellular);

    let mut engine =
        CellularGA::new(IdleStrategy::cellular(), PressCounter::default(), config(9, 27, 5)).unwrap();
    engine.run_to_budget().unwrap();

    assert_eq!(engine.total_evaluations(), 27);
    assert_eq!(engine.generation(), 2);
    assert_eq!(engine.best_individual().fitness_value(), 0.0);
    assert_eq!(engine.snapshot().algorithm, "idle-cellular");
}
