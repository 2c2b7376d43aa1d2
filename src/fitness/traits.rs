//! Fitness traits
//!
//! This module defines the fitness function trait. A fitness function turns
//! the outcome of one evaluation, the progress made and the time it took,
//! into the scalar the search maximizes.

use std::fmt::Debug;
use std::time::Duration;

/// Scalar fitness from an evaluation outcome
pub trait FitnessFunction: Send + Sync + Debug {
    /// Compute the fitness of a run that reached `progress` in `elapsed`
    fn fitness(&self, progress: f64, elapsed: Duration) -> f64;
}

/// Progress per minute; zero when no time has passed
pub fn speed_per_minute(progress: f64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        progress * 60.0 / seconds
    } else {
        0.0
    }
}
