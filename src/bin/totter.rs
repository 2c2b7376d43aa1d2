//! totter CLI - evolve, seed and replay gait controllers on the simulated track.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use totter::experiment::storage::read_json;
use totter::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "totter")]
#[command(about = "Evolve gait controllers against a sensor-observed runner", long_about = None)]
#[command(version)]
struct Cli {
    /// Algorithm to run (keystroke, key-toggle, bitmask, timed-bitmask,
    /// dynamic-bitmask, dynamic-mutation-bitmask, dynamic-replacement-bitmask,
    /// cellular-keystroke, google, idle, idle-cellular)
    #[arg(short, long, global = true, default_value = "keystroke")]
    algorithm: AlgorithmKind,

    /// Watchdog poll interval in milliseconds
    #[arg(long, global = true, default_value = "250")]
    poll_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run independent trials of an algorithm and save the results
    Evolve {
        /// Number of trials
        #[arg(short, long, default_value = "1")]
        trials: usize,

        /// Evaluations per trial
        #[arg(short, long, default_value = "1000")]
        evaluations: usize,

        /// Time limit of one evaluation, in seconds
        #[arg(long, default_value = "180")]
        eval_time_limit: u64,

        /// Population size
        #[arg(short, long, default_value = "30")]
        pop_size: usize,

        /// Crossover probability
        #[arg(long, default_value = "0.9")]
        cx_prob: f64,

        /// Mutation probability
        #[arg(long, default_value = "0.05")]
        mt_prob: f64,

        /// Replace the whole population each generation
        #[arg(long)]
        generational: bool,

        /// Start from the best of a seed pool of this size
        #[arg(long)]
        seed_pool: Option<usize>,

        /// Time limit of one seed pool evaluation, in seconds
        #[arg(long, default_value = "60")]
        seeding_time_limit: u64,

        /// Random seed
        #[arg(short, long, default_value = "1234")]
        seed: u64,
    },

    /// Build and cache a seed pool
    Seed {
        /// Genomes in the pool
        #[arg(long, default_value = "500")]
        pool_size: usize,

        /// Population the pool will seed
        #[arg(short, long, default_value = "30")]
        pop_size: usize,

        /// Time limit of one evaluation, in seconds
        #[arg(long, default_value = "60")]
        seeding_time_limit: u64,

        /// Random seed
        #[arg(short, long, default_value = "1234")]
        seed: u64,
    },

    /// Replay the best genome an algorithm has found
    Simulate {
        /// Solution file to replay instead of the saved one
        #[arg(long)]
        saved_result: Option<PathBuf>,

        /// Time limit of the replay, in seconds
        #[arg(long, default_value = "600")]
        time_limit: u64,
    },
}

type TrackHarness = EvaluationHarness<SimulatedTrack, TrackReader>;

fn track_harness(poll: Duration) -> EvoResult<TrackHarness> {
    EvaluationHarness::with_config(
        SimulatedTrack::new(),
        TrackReader,
        HarnessConfig::default().poll_interval(poll),
    )
}

/// A command that runs against whichever strategy was picked
trait StrategyCommand {
    fn run<S: Strategy + Clone>(self, strategy: S, engine: EngineKind) -> Result<()>;
}

fn dispatch<C: StrategyCommand>(
    kind: AlgorithmKind,
    horizon: usize,
    time_limit: Duration,
    command: C,
) -> Result<()> {
    let engine = kind.engine();
    match kind {
        AlgorithmKind::Keystroke => command.run(presets::keystroke()?, engine),
        AlgorithmKind::KeyToggle => command.run(presets::key_toggle()?, engine),
        AlgorithmKind::Bitmask => command.run(presets::bitmask()?, engine),
        AlgorithmKind::TimedBitmask => command.run(presets::timed_bitmask()?, engine),
        AlgorithmKind::DynamicBitmask => command.run(presets::dynamic_bitmask(horizon)?, engine),
        AlgorithmKind::DynamicMutationBitmask => {
            command.run(presets::dynamic_mutation_bitmask()?, engine)
        }
        AlgorithmKind::DynamicReplacementBitmask => {
            command.run(presets::dynamic_replacement_bitmask(horizon)?, engine)
        }
        AlgorithmKind::CellularKeystroke => command.run(presets::cellular_keystroke()?, engine),
        AlgorithmKind::Google => command.run(presets::google(time_limit)?, engine),
        AlgorithmKind::Idle => command.run(IdleStrategy::new(), engine),
        AlgorithmKind::IdleCellular => command.run(IdleStrategy::cellular(), engine),
    }
}

struct Evolve {
    config: EvolutionConfig,
    trials: usize,
    poll: Duration,
}

impl StrategyCommand for Evolve {
    fn run<S: Strategy + Clone>(self, strategy: S, engine: EngineKind) -> Result<()> {
        let store = ResultsStore::from_env();
        let experiment = Experiment::new(strategy.name(), self.config.clone(), self.trials)
            .context("Invalid experiment settings")?
            .with_store(store.clone());

        let seeds = match &self.config.seeding {
            Some(seeding) => {
                let mut rng = StdRng::seed_from_u64(self.config.seed);
                seed_population(
                    &store,
                    &strategy,
                    &mut track_harness(self.poll)?,
                    seeding,
                    self.config.population_size,
                    &mut rng,
                )
                .context("Failed to build seed population")?
            }
            None => Vec::new(),
        };

        let poll = self.poll;
        let report = match engine {
            EngineKind::Linear => experiment.run(|_, config| {
                LinearGA::with_population(strategy.clone(), track_harness(poll)?, config, seeds.clone())
            }),
            EngineKind::Cellular => experiment.run(|_, config| {
                CellularGA::with_population(strategy.clone(), track_harness(poll)?, config, seeds.clone())
            }),
        }
        .context("Experiment failed")?;

        info!(
            "{}: best fitness {:.3} over {} trials",
            strategy.name(),
            report.best.fitness_value(),
            report.trials.len()
        );
        if let Some(last) = report.aggregate.last() {
            info!(
                "{}: mean best fitness {:.3} (std dev {:.3}) after {} evaluations",
                strategy.name(),
                last.mean_best_fitness,
                last.best_fitness_std_dev,
                last.evaluations
            );
        }
        Ok(())
    }
}

struct Seed {
    seeding: SeedingConfig,
    population_size: usize,
    seed: u64,
    poll: Duration,
}

impl StrategyCommand for Seed {
    fn run<S: Strategy + Clone>(self, strategy: S, _engine: EngineKind) -> Result<()> {
        let store = ResultsStore::from_env();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let seeds = seed_population(
            &store,
            &strategy,
            &mut track_harness(self.poll)?,
            &self.seeding,
            self.population_size,
            &mut rng,
        )
        .context("Failed to build seed population")?;

        let best = seeds
            .iter()
            .map(|s| s.fitness_value())
            .fold(f64::NEG_INFINITY, f64::max);
        info!("{}: {} seeds ready, best fitness {:.3}", strategy.name(), seeds.len(), best);
        Ok(())
    }
}

struct Simulate {
    saved_result: Option<PathBuf>,
    time_limit: Duration,
    poll: Duration,
}

impl StrategyCommand for Simulate {
    fn run<S: Strategy + Clone>(self, strategy: S, _engine: EngineKind) -> Result<()> {
        let path = match self.saved_result {
            Some(path) => path,
            None => ResultsStore::from_env().solution_path(strategy.name()),
        };
        if !path.exists() {
            error!(
                "{}: no saved result at {}, run evolve first",
                strategy.name(),
                path.display()
            );
            return Ok(());
        }

        let solution: Solution<S::Genome> = read_json(&path)
            .with_context(|| format!("Failed to read solution {}", path.display()))?;
        let program = strategy
            .decode(&solution.best_genome)
            .context("Saved genome does not decode")?;

        info!(
            "{}: replaying solution with recorded fitness {:.3}",
            strategy.name(),
            solution.best_fitness
        );
        let result = track_harness(self.poll)?.run(&program, self.time_limit);
        info!(
            "{}: reached {:.2} in {:.1}s, fitness {:.3}",
            strategy.name(),
            result.progress,
            result.elapsed.as_secs_f64(),
            strategy.fitness(result.progress, result.elapsed)
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let poll = Duration::from_millis(cli.poll_ms);

    match cli.command {
        Commands::Evolve {
            trials,
            evaluations,
            eval_time_limit,
            pop_size,
            cx_prob,
            mt_prob,
            generational,
            seed_pool,
            seeding_time_limit,
            seed,
        } => {
            let eval_time_limit = Duration::from_secs(eval_time_limit);
            let mut builder = EvolutionConfig::builder()
                .population_size(pop_size)
                .crossover_probability(cx_prob)
                .mutation_probability(mt_prob)
                .mutation_schedule(cli.algorithm.mutation_schedule(evaluations))
                .pass_through_parents(cli.algorithm.pass_through_parents())
                .eval_time_limit(eval_time_limit)
                .evaluation_budget(evaluations)
                .seed(seed);
            if generational {
                builder = builder.stepping(Stepping::Generational);
            }
            if let Some(pool_size) = seed_pool {
                builder = builder.seeding(
                    SeedingConfig::new(pool_size)
                        .with_time_limit(Duration::from_secs(seeding_time_limit)),
                );
            }
            let config = builder.build().context("Invalid evolution settings")?;

            dispatch(
                cli.algorithm,
                evaluations,
                eval_time_limit,
                Evolve {
                    config,
                    trials,
                    poll,
                },
            )
        }

        Commands::Seed {
            pool_size,
            pop_size,
            seeding_time_limit,
            seed,
        } => {
            let seeding_time_limit = Duration::from_secs(seeding_time_limit);
            dispatch(
                cli.algorithm,
                EvolutionConfig::default().evaluation_budget,
                seeding_time_limit,
                Seed {
                    seeding: SeedingConfig::new(pool_size).with_time_limit(seeding_time_limit),
                    population_size: pop_size,
                    seed,
                    poll,
                },
            )
        }

        Commands::Simulate {
            saved_result,
            time_limit,
        } => {
            let time_limit = Duration::from_secs(time_limit);
            dispatch(
                cli.algorithm,
                EvolutionConfig::default().evaluation_budget,
                time_limit,
                Simulate {
                    saved_result,
                    time_limit,
                    poll,
                },
            )
        }
    }
}
