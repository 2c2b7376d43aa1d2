//! Timing tests for the evaluation harness
//!
//! These run real actuator and watchdog threads, so bounds are generous.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use totter::prelude::*;

/// Replays a fixed list of readings, repeating the last one forever
struct Scripted {
    readings: Vec<(f64, bool)>,
    next: usize,
    actions: usize,
}

impl Scripted {
    fn new(readings: Vec<(f64, bool)>) -> Self {
        Self {
            readings,
            next: 0,
            actions: 0,
        }
    }
}

impl Environment for Scripted {
    type Observation = (f64, bool);

    fn reset(&mut self) {
        self.next = 0;
        self.actions = 0;
    }

    fn apply_action(&mut self, _action: Action) {
        self.actions += 1;
    }

    fn sample(&mut self) -> (f64, bool) {
        let index = self.next.min(self.readings.len() - 1);
        self.next += 1;
        self.readings[index]
    }
}

/// Sensor that fails outright after a few good samples
struct Failing {
    samples: u32,
    fail_after: u32,
}

impl Environment for Failing {
    type Observation = (f64, bool);

    fn reset(&mut self) {
        self.samples = 0;
    }

    fn apply_action(&mut self, _action: Action) {}

    fn sample(&mut self) -> (f64, bool) {
        self.samples += 1;
        if self.samples > self.fail_after {
            panic!("sensor disconnected");
        }
        (self.samples as f64, false)
    }
}

/// Progress grows by one on every sample; never stagnates or ends
#[derive(Default)]
struct Treadmill {
    samples: u32,
}

impl Environment for Treadmill {
    type Observation = (f64, bool);

    fn reset(&mut self) {
        self.samples = 0;
    }

    fn apply_action(&mut self, _action: Action) {}

    fn sample(&mut self) -> (f64, bool) {
        self.samples += 1;
        (self.samples as f64, false)
    }
}

fn decode(observation: &(f64, bool)) -> Reading {
    let (progress, terminal) = *observation;
    if terminal {
        Reading::terminal(Some(progress))
    } else {
        Reading::progress(progress)
    }
}

const POLL: Duration = Duration::from_millis(250);
const HOLD: Duration = Duration::from_millis(50);

fn config(window: usize) -> HarnessConfig {
    HarnessConfig::default()
        .poll_interval(POLL)
        .stagnation_window(window)
        .idle_interval(Duration::from_millis(20))
        .force_end(ActuationProgram::new())
}

fn walking() -> ActuationProgram {
    let mut program = ActuationProgram::new();
    program.tap(Key::W, HOLD);
    program.tap(Key::O, HOLD);
    program
}

#[test]
fn stagnation_ends_run_after_window_of_equal_readings() {
    let readings = [1.0, 2.0, 3.0, 3.0, 3.0, 3.0]
        .iter()
        .map(|&p| (p, false))
        .collect();
    let mut harness = EvaluationHarness::with_config(Scripted::new(readings), decode, config(4)).unwrap();

    let result = harness.run(&walking(), Duration::from_secs(30));

    // sixth poll completes the window of four 3.0 readings
    assert!(result.elapsed >= Duration::from_millis(1500), "{:?}", result.elapsed);
    assert!(result.elapsed < Duration::from_millis(2000), "{:?}", result.elapsed);
    assert_eq!(result.progress, 3.0);
    assert!(harness.environment().actions > 0);
}

#[test]
fn deadline_ends_run_on_time() {
    let mut harness =
        EvaluationHarness::with_config(Treadmill::default(), decode, config(40)).unwrap();
    let limit = Duration::from_secs(2);

    let started = Instant::now();
    let result = harness.run(&walking(), limit);
    let wall = started.elapsed();

    assert!(result.elapsed >= limit, "{:?}", result.elapsed);
    assert!(result.elapsed < limit + POLL, "{:?}", result.elapsed);
    // the actuator finishes its current step after the flag goes up
    assert!(wall < limit + POLL + HOLD, "{:?}", wall);
    assert!(result.progress > 0.0);
}

/// Run a harness on a helper thread, giving up after five seconds
fn finishes<E, D>(mut harness: EvaluationHarness<E, D>) -> Option<thread::Result<EvaluationResult>>
where
    E: Environment + Send + 'static,
    D: SensorDecoder<E::Observation> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            harness.run(&walking(), Duration::from_millis(200))
        }));
        let _ = sender.send(outcome);
    });
    receiver.recv_timeout(Duration::from_secs(5)).ok()
}

#[test]
fn one_reading_window_is_rejected_up_front() {
    let result = EvaluationHarness::with_config(Treadmill::default(), decode, config(1));
    assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    let result = EvaluationHarness::with_config(Treadmill::default(), decode, config(0));
    assert!(result.is_err());
}

#[test]
fn panicking_decoder_does_not_hang_run() {
    let panicky = |_: &(f64, bool)| -> Reading { panic!("frame could not be read") };
    let harness = EvaluationHarness::with_config(
        Treadmill::default(),
        panicky,
        config(40).poll_interval(Duration::from_millis(20)),
    )
    .unwrap();

    let outcome = finishes(harness).expect("run hung after the watchdog panicked");
    assert!(outcome.is_err());
}

#[test]
fn panicking_sensor_does_not_hang_run() {
    let environment = Failing {
        samples: 0,
        fail_after: 2,
    };
    let harness = EvaluationHarness::with_config(
        environment,
        decode,
        config(40).poll_interval(Duration::from_millis(20)),
    )
    .unwrap();

    let outcome = finishes(harness).expect("run hung after the watchdog panicked");
    assert!(outcome.is_err());
}

#[test]
fn terminal_reading_ends_run_immediately() {
    let readings = vec![(1.0, false), (2.0, true)];
    let mut harness = EvaluationHarness::with_config(Scripted::new(readings), decode, config(40)).unwrap();

    let result = harness.run(&walking(), Duration::from_secs(30));

    assert!(result.elapsed >= Duration::from_millis(500));
    assert!(result.elapsed < Duration::from_millis(1000), "{:?}", result.elapsed);
    assert_eq!(result.progress, 2.0);
}

#[test]
fn disagreeing_final_reading_reports_lower_value() {
    let readings = vec![(42.0, false), (42.0, true), (45.5, true)];
    let mut harness = EvaluationHarness::with_config(Scripted::new(readings), decode, config(40)).unwrap();

    let result = harness.run(&walking(), Duration::from_secs(30));
    assert_eq!(result.progress, 42.0);
}

#[test]
fn agreeing_final_reading_is_trusted() {
    let readings = vec![(42.0, false), (42.0, true), (42.5, true)];
    let mut harness = EvaluationHarness::with_config(Scripted::new(readings), decode, config(40)).unwrap();

    let result = harness.run(&walking(), Duration::from_secs(30));
    assert_eq!(result.progress, 42.5);
}

#[test]
fn empty_program_is_judged_like_any_other() {
    let readings = vec![(0.0, false)];
    let mut harness = EvaluationHarness::with_config(Scripted::new(readings), decode, config(3)).unwrap();

    let result = harness.run(&ActuationProgram::new(), Duration::from_secs(30));

    assert!(result.elapsed >= Duration::from_millis(750));
    assert!(result.elapsed < Duration::from_millis(1250), "{:?}", result.elapsed);
    assert_eq!(result.progress, 0.0);
    assert_eq!(harness.environment().actions, 0);
}

#[test]
fn simulated_track_runs_through_harness() {
    let mut harness = EvaluationHarness::with_config(
        SimulatedTrack::new(),
        TrackReader,
        HarnessConfig::default()
            .poll_interval(Duration::from_millis(20))
            .stagnation_window(10),
    )
    .unwrap();
    let strategy = presets::keystroke().unwrap();
    let genome = Sequence::new(vec![Key::W, Key::O, Key::Q, Key::P]);
    let program = strategy.decode(&genome).unwrap();

    let result = harness.run(&program, Duration::from_secs(2));
    assert!(result.progress.is_finite());
    assert!(result.elapsed <= Duration::from_secs(2) + Duration::from_millis(50));
}
