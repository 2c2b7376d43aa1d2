//! Simulated track
//!
//! A deterministic stand-in for the real runner: the four controls move the
//! runner's thighs and calves, alternating thighs makes forward strides,
//! awkward postures cost balance, and losing all balance is a fall. It reacts
//! only to actions, never to wall time, so the same action sequence always
//! produces the same run.

use serde::{Deserialize, Serialize};

use crate::evaluation::environment::{Environment, Reading, SensorDecoder};
use crate::evaluation::program::{Action, Key};

/// Length of the race
pub const TRACK_LENGTH: f64 = 100.0;

/// One frame of the simulated sensor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    /// Distance from the start line
    pub distance: f64,
    /// The runner has fallen over
    pub fallen: bool,
    /// The runner crossed the finish line
    pub finished: bool,
    /// Whether the distance marker could be read in this frame
    pub legible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Thigh {
    Left,
    Right,
}

/// Deterministic action-driven runner
#[derive(Clone, Debug)]
pub struct SimulatedTrack {
    held: [bool; 4],
    lead: Option<Thigh>,
    distance: f64,
    balance: f64,
    fallen: bool,
    frames: u64,
    /// Every n-th frame is illegible; `None` keeps every frame legible
    pub illegible_every: Option<u64>,
    /// Distance gained by a plain stride
    pub stride: f64,
}

impl Default for SimulatedTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTrack {
    /// Create a track with every frame legible
    pub fn new() -> Self {
        Self {
            held: [false; 4],
            lead: None,
            distance: 0.0,
            balance: 1.0,
            fallen: false,
            frames: 0,
            illegible_every: None,
            stride: 0.5,
        }
    }

    /// Make every `n`-th frame illegible
    pub fn with_illegible_frames(mut self, n: u64) -> Self {
        self.illegible_every = (n > 0).then_some(n);
        self
    }

    /// Current distance
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Whether the runner is down
    pub fn has_fallen(&self) -> bool {
        self.fallen
    }

    /// Whether the runner crossed the line
    pub fn has_finished(&self) -> bool {
        self.distance >= TRACK_LENGTH
    }

    fn is_over(&self) -> bool {
        self.fallen || self.has_finished()
    }

    fn holding(&self, key: Key) -> bool {
        self.held[key.index()]
    }

    fn swing(&mut self, thigh: Thigh) {
        match self.lead {
            Some(lead) if lead == thigh => {
                // dragging the same leg forward twice tips the runner
                self.balance -= 0.15;
            }
            _ => {
                let calf_push = if self.holding(Key::O) ^ self.holding(Key::P) {
                    0.3
                } else {
                    0.0
                };
                self.distance = (self.distance + self.stride + calf_push).min(TRACK_LENGTH);
                self.balance = (self.balance + 0.1).min(1.0);
                self.lead = Some(thigh);
            }
        }
    }

    fn settle_posture(&mut self) {
        if self.holding(Key::Q) && self.holding(Key::W) {
            self.balance -= 0.3;
        }
        if self.holding(Key::O) && self.holding(Key::P) {
            self.balance -= 0.2;
        }
        if self.balance <= 0.0 {
            self.fallen = true;
        }
    }
}

impl Environment for SimulatedTrack {
    type Observation = TrackFrame;

    fn reset(&mut self) {
        let illegible_every = self.illegible_every;
        let stride = self.stride;
        *self = Self {
            illegible_every,
            stride,
            ..Self::new()
        };
    }

    fn apply_action(&mut self, action: Action) {
        if self.is_over() {
            return;
        }
        match action {
            Action::Press(key) => {
                let was_held = self.holding(key);
                self.held[key.index()] = true;
                if !was_held {
                    match key {
                        Key::Q => self.swing(Thigh::Left),
                        Key::W => self.swing(Thigh::Right),
                        Key::O | Key::P => {}
                    }
                }
            }
            Action::Release(key) => self.held[key.index()] = false,
        }
        self.settle_posture();
    }

    fn sample(&mut self) -> TrackFrame {
        self.frames += 1;
        let legible = match self.illegible_every {
            Some(n) => self.frames % n != 0,
            None => true,
        };
        TrackFrame {
            distance: (self.distance * 10.0).round() / 10.0,
            fallen: self.fallen,
            finished: self.has_finished(),
            legible,
        }
    }
}

/// Sensor decoder for [`SimulatedTrack`] frames
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackReader;

impl SensorDecoder<TrackFrame> for TrackReader {
    fn interpret(&self, frame: &TrackFrame) -> Reading {
        Reading {
            progress: frame.legible.then_some(frame.distance),
            terminal: frame.fallen || frame.finished,
        }
    }
}
