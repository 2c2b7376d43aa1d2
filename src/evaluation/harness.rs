//! Evaluation harness
//!
//! Runs one actuation program against the environment. An actuator thread
//! plays the program on a loop while a watchdog thread polls the sensor; the
//! watchdog alone decides when the run ends, and the actuator stops at the
//! next step boundary after it does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::environment::{Environment, SensorDecoder};
use crate::evaluation::program::{Action, ActuationProgram, Key};
use crate::evaluation::watchdog::{WatchReport, Watchdog};

/// Outcome of evaluating one program
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Progress reached, after reconciliation
    pub progress: f64,
    /// Time from the start of the run until it was judged over
    pub elapsed: Duration,
}

/// Harness settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Time between sensor polls
    pub poll_interval: Duration,
    /// Number of identical consecutive readings that count as stagnation
    pub stagnation_window: usize,
    /// Largest disagreement between running and final progress that is
    /// still trusted
    pub reconcile_tolerance: f64,
    /// How often an empty program checks for termination
    pub idle_interval: Duration,
    /// Program played once when the environment did not end a run itself
    pub force_end: ActuationProgram,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            stagnation_window: 40,
            reconcile_tolerance: 1.0,
            idle_interval: Duration::from_millis(50),
            force_end: ActuationProgram::force_end(),
        }
    }
}

impl HarnessConfig {
    /// Set the poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the stagnation window
    pub fn stagnation_window(mut self, window: usize) -> Self {
        self.stagnation_window = window;
        self
    }

    /// Set the reconciliation tolerance
    pub fn reconcile_tolerance(mut self, tolerance: f64) -> Self {
        self.reconcile_tolerance = tolerance;
        self
    }

    /// Set the idle interval
    pub fn idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Set the force-end program
    pub fn force_end(mut self, program: ActuationProgram) -> Self {
        self.force_end = program;
        self
    }

    /// Check the settings before any run starts
    pub fn validate(&self) -> EvoResult<()> {
        if self.stagnation_window < 2 {
            return Err(EvolutionError::Configuration(format!(
                "Stagnation window must cover at least two readings, got {}",
                self.stagnation_window
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(EvolutionError::Configuration(
                "Poll interval must be positive".to_string(),
            ));
        }
        if self.reconcile_tolerance.is_nan() || self.reconcile_tolerance < 0.0 {
            return Err(EvolutionError::Configuration(format!(
                "Reconcile tolerance must be non-negative, got {}",
                self.reconcile_tolerance
            )));
        }
        Ok(())
    }
}

/// Scores a batch of programs, one after another
///
/// The input is always a sequence; a single program is a one-element slice.
pub trait ProgramEvaluator {
    /// Evaluate every program in order
    fn evaluate(
        &mut self,
        programs: &[ActuationProgram],
        time_limit: Duration,
    ) -> EvoResult<Vec<EvaluationResult>>;

    /// Evaluate a single program
    fn evaluate_one(
        &mut self,
        program: &ActuationProgram,
        time_limit: Duration,
    ) -> EvoResult<EvaluationResult> {
        self.evaluate(std::slice::from_ref(program), time_limit)?
            .pop()
            .ok_or_else(|| EvolutionError::Evaluation("evaluator returned no result".to_string()))
    }
}

impl<T: ProgramEvaluator + ?Sized> ProgramEvaluator for &mut T {
    fn evaluate(
        &mut self,
        programs: &[ActuationProgram],
        time_limit: Duration,
    ) -> EvoResult<Vec<EvaluationResult>> {
        (**self).evaluate(programs, time_limit)
    }
}

/// Pick the progress value to report
///
/// When the running and end-of-run readings disagree by more than
/// `tolerance`, one of them is a misread and the lower one is reported.
pub fn reconcile_progress(running: f64, end_of_run: f64, tolerance: f64) -> f64 {
    if (running - end_of_run).abs() > tolerance {
        running.min(end_of_run)
    } else {
        end_of_run
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

/// Controls currently held down; releases all of them when dropped
struct HeldControls<'a, 'e, E: Environment> {
    environment: &'a Mutex<&'e mut E>,
    held: [bool; 4],
}

impl<'a, 'e, E: Environment> HeldControls<'a, 'e, E> {
    fn new(environment: &'a Mutex<&'e mut E>) -> Self {
        Self {
            environment,
            held: [false; 4],
        }
    }

    fn apply(&mut self, action: Action) {
        lock(self.environment).apply_action(action);
        match action {
            Action::Press(key) => self.held[key.index()] = true,
            Action::Release(key) => self.held[key.index()] = false,
        }
    }

    fn play_once(&mut self, program: &ActuationProgram) {
        for step in program.steps() {
            for &action in &step.actions {
                self.apply(action);
            }
            thread::sleep(step.hold);
        }
    }
}

impl<E: Environment> Drop for HeldControls<'_, '_, E> {
    fn drop(&mut self) {
        let mut environment = lock(self.environment);
        for key in Key::ALL {
            if self.held[key.index()] {
                environment.apply_action(Action::Release(key));
            }
        }
    }
}

/// Play `program` on a loop until `stop` is raised
fn actuate<E: Environment>(
    environment: &Mutex<&mut E>,
    program: &ActuationProgram,
    stop: &AtomicBool,
    idle_interval: Duration,
) {
    let mut controls = HeldControls::new(environment);
    let idles = program.duration().is_zero();

    while !stop.load(Ordering::Acquire) {
        for step in program.steps() {
            if stop.load(Ordering::Acquire) {
                return;
            }
            for &action in &step.actions {
                controls.apply(action);
            }
            thread::sleep(step.hold);
        }
        if idles {
            thread::sleep(idle_interval);
        }
    }
}

/// Runs programs against one environment
pub struct EvaluationHarness<E, D> {
    environment: E,
    decoder: D,
    config: HarnessConfig,
}

impl<E, D> EvaluationHarness<E, D>
where
    E: Environment,
    D: SensorDecoder<E::Observation>,
{
    /// Create a harness with the default settings
    pub fn new(environment: E, decoder: D) -> Self {
        Self {
            environment,
            decoder,
            config: HarnessConfig::default(),
        }
    }

    /// Create a harness with explicit settings
    ///
    /// Fails when the settings could not drive a run to its end.
    pub fn with_config(environment: E, decoder: D, config: HarnessConfig) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self {
            environment,
            decoder,
            config,
        })
    }

    /// The harness settings
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The environment, between runs
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Take the environment back
    pub fn into_environment(self) -> E {
        self.environment
    }

    /// Run one program until the watchdog ends it
    pub fn run(&mut self, program: &ActuationProgram, time_limit: Duration) -> EvaluationResult {
        self.environment.reset();

        let watchdog = Watchdog::new(
            self.config.poll_interval,
            self.config.stagnation_window,
            time_limit,
        );
        let idle_interval = self.config.idle_interval;
        let decoder = &self.decoder;
        let environment = Mutex::new(&mut self.environment);
        let stop = AtomicBool::new(false);
        let start = Instant::now();

        let report: WatchReport = thread::scope(|scope| {
            let actuator = scope.spawn(|| actuate(&environment, program, &stop, idle_interval));
            let watcher = scope.spawn(|| {
                watchdog.watch(
                    || {
                        let observation = lock(&environment).sample();
                        decoder.interpret(&observation)
                    },
                    &stop,
                    start,
                )
            });
            let report = join(watcher);
            join(actuator);
            report
        });

        let final_reading = {
            let mut environment = lock(&environment);
            let observation = environment.sample();
            decoder.interpret(&observation)
        };

        if !report.saw_terminal() && !final_reading.terminal {
            warn!(
                "run ended by {} without reaching a terminal state, forcing the end",
                report.reason
            );
            HeldControls::new(&environment).play_once(&self.config.force_end);
        }

        let progress = match (report.last_progress, final_reading.progress) {
            (Some(running), Some(end_of_run)) => {
                let progress =
                    reconcile_progress(running, end_of_run, self.config.reconcile_tolerance);
                if progress != end_of_run {
                    warn!(
                        "progress readings disagree ({} running, {} at end), reporting {}",
                        running, end_of_run, progress
                    );
                }
                progress
            }
            (Some(running), None) => running,
            (None, Some(end_of_run)) => end_of_run,
            (None, None) => {
                warn!("no readable progress during the run, reporting 0");
                0.0
            }
        };

        debug!(
            "run ended by {} after {:.2}s at progress {:.2}",
            report.reason,
            report.elapsed.as_secs_f64(),
            progress
        );

        EvaluationResult {
            progress,
            elapsed: report.elapsed,
        }
    }
}

impl<E, D> ProgramEvaluator for EvaluationHarness<E, D>
where
    E: Environment,
    D: SensorDecoder<E::Observation>,
{
    fn evaluate(
        &mut self,
        programs: &[ActuationProgram],
        time_limit: Duration,
    ) -> EvoResult<Vec<EvaluationResult>> {
        Ok(programs
            .iter()
            .map(|program| self.run(program, time_limit))
            .collect())
    }
}
