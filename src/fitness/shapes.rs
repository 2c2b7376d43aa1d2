//! Fitness shapes
//!
//! The fitness functions used by the bundled strategies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::{speed_per_minute, FitnessFunction};

/// Fitness is the distance covered
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Distance;

impl FitnessFunction for Distance {
    fn fitness(&self, progress: f64, _elapsed: Duration) -> f64 {
        progress
    }
}

/// Distance plus speed in distance per minute
///
/// With a `min_distance`, runs that do not get past it are scored on distance
/// alone, so a runner that falls over immediately is not rewarded for a
/// high average speed over a short run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DistancePlusSpeed {
    pub min_distance: Option<f64>,
}

impl DistancePlusSpeed {
    /// Always add the speed bonus
    pub fn new() -> Self {
        Self { min_distance: None }
    }

    /// Only add the speed bonus past `min_distance`
    pub fn beyond(min_distance: f64) -> Self {
        Self {
            min_distance: Some(min_distance),
        }
    }
}

impl FitnessFunction for DistancePlusSpeed {
    fn fitness(&self, progress: f64, elapsed: Duration) -> f64 {
        match self.min_distance {
            Some(min) if progress <= min => progress,
            _ => progress + speed_per_minute(progress, elapsed),
        }
    }
}

/// Distance minus the time spent over par
///
/// Runs shorter than `par` that did not finish are scored on distance alone.
/// Finished runs are rewarded for coming in under par.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistanceMinusOvertime {
    pub par: Duration,
    pub finish_distance: f64,
}

impl Default for DistanceMinusOvertime {
    fn default() -> Self {
        Self {
            par: Duration::from_secs(75),
            finish_distance: 100.0,
        }
    }
}

impl FitnessFunction for DistanceMinusOvertime {
    fn fitness(&self, progress: f64, elapsed: Duration) -> f64 {
        if elapsed >= self.par || progress >= self.finish_distance {
            progress - (elapsed.as_secs_f64() - self.par.as_secs_f64())
        } else {
            progress
        }
    }
}

/// Speed, awarded only to runs that finished or outlasted the time limit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeedIfFinished {
    pub finish_distance: f64,
    pub time_limit: Duration,
}

impl SpeedIfFinished {
    /// Create with the time limit the evaluations run under
    pub fn new(time_limit: Duration) -> Self {
        Self {
            finish_distance: 99.0,
            time_limit,
        }
    }
}

impl FitnessFunction for SpeedIfFinished {
    fn fitness(&self, progress: f64, elapsed: Duration) -> f64 {
        if progress >= self.finish_distance || elapsed > self.time_limit {
            speed_per_minute(progress, elapsed)
        } else {
            0.0
        }
    }
}
