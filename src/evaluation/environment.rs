//! Environment collaborators
//!
//! The harness drives the environment through discrete actions and watches it
//! through a sensor. Neither side is implemented here beyond the in-process
//! track in `simulated`; these traits are the contract a driver must meet.

use crate::evaluation::program::Action;

/// A stateful, non-reentrant environment
///
/// Calls are synchronous and come from one evaluation at a time, though the
/// actuator and the watchdog of that evaluation take turns through a lock.
pub trait Environment: Send {
    /// Raw observation produced by the environment's sensor
    type Observation;

    /// Bring the environment back to its start state
    fn reset(&mut self);

    /// Deliver a single action
    fn apply_action(&mut self, action: Action);

    /// Capture the current observation
    fn sample(&mut self) -> Self::Observation;
}

/// Structured reading extracted from an observation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    /// Progress made so far, if the observation could be read
    pub progress: Option<f64>,
    /// Whether the environment reports that the run is over
    pub terminal: bool,
}

impl Reading {
    /// A readable, non-terminal reading
    pub fn progress(progress: f64) -> Self {
        Self {
            progress: Some(progress),
            terminal: false,
        }
    }

    /// A reading whose progress could not be made out
    pub fn unknown() -> Self {
        Self {
            progress: None,
            terminal: false,
        }
    }

    /// A terminal reading
    pub fn terminal(progress: Option<f64>) -> Self {
        Self {
            progress,
            terminal: true,
        }
    }
}

/// Turns raw observations into readings
pub trait SensorDecoder<O>: Sync {
    /// Interpret one observation
    fn interpret(&self, observation: &O) -> Reading;
}

impl<O, F> SensorDecoder<O> for F
where
    F: Fn(&O) -> Reading + Sync,
{
    fn interpret(&self, observation: &O) -> Reading {
        self(observation)
    }
}
