//! Actuation programs
//!
//! The decoded, executable form of a genome: an ordered list of steps, each
//! issuing a handful of control actions and then holding them for a fixed time.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hold time used by the fixed-tempo representations
pub const DEFAULT_HOLD: Duration = Duration::from_millis(150);

/// One of the four controls the runner responds to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Q,
    W,
    O,
    P,
}

impl Key {
    /// All controls, in bitmask order
    pub const ALL: [Key; 4] = [Key::Q, Key::W, Key::O, Key::P];

    /// Position of this control inside a bitmask
    pub fn index(self) -> usize {
        match self {
            Key::Q => 0,
            Key::W => 1,
            Key::O => 2,
            Key::P => 3,
        }
    }

    /// Lowercase character naming this control
    pub fn as_char(self) -> char {
        match self {
            Key::Q => 'q',
            Key::W => 'w',
            Key::O => 'o',
            Key::P => 'p',
        }
    }

    /// Parse a control from its character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Key::Q),
            'w' => Some(Key::W),
            'o' => Some(Key::O),
            'p' => Some(Key::P),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single input delivered to the environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Start holding a control
    Press(Key),
    /// Stop holding a control
    Release(Key),
}

/// A group of actions followed by a hold period
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Actions issued at the start of the step, in order
    pub actions: Vec<Action>,
    /// How long the resulting control state is held
    pub hold: Duration,
}

impl Step {
    /// Create a step from actions and a hold time
    pub fn new(actions: Vec<Action>, hold: Duration) -> Self {
        Self { actions, hold }
    }

    /// A step that issues nothing and only waits
    pub fn wait(hold: Duration) -> Self {
        Self {
            actions: Vec::new(),
            hold,
        }
    }
}

/// Executable program produced by decoding a genome
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuationProgram {
    steps: Vec<Step>,
}

impl ActuationProgram {
    /// Create an empty program
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Create a program from a list of steps
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Append a step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Press `key`, hold it, then release it
    pub fn tap(&mut self, key: Key, hold: Duration) {
        self.steps.push(Step::new(vec![Action::Press(key)], hold));
        self.steps
            .push(Step::new(vec![Action::Release(key)], Duration::ZERO));
    }

    /// Press every control set in `mask`, release the others, then hold
    pub fn set_mask(&mut self, mask: [bool; 4], hold: Duration) {
        let actions = Key::ALL
            .iter()
            .map(|&key| {
                if mask[key.index()] {
                    Action::Press(key)
                } else {
                    Action::Release(key)
                }
            })
            .collect();
        self.steps.push(Step::new(actions, hold));
    }

    /// The steps of this program
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the program issues nothing at all
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time one pass over the program takes
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|s| s.hold).sum()
    }

    /// Input sequence that reliably knocks the runner over.
    ///
    /// Used to bring the environment to its terminal state when a run timed
    /// out without ending on its own.
    pub fn force_end() -> Self {
        let mut program = Self::new();
        program.push(Step::new(
            vec![Action::Press(Key::W), Action::Press(Key::O)],
            Duration::from_secs(1),
        ));
        program.push(Step::new(
            vec![
                Action::Release(Key::W),
                Action::Release(Key::O),
                Action::Press(Key::Q),
                Action::Press(Key::P),
            ],
            Duration::from_secs(3),
        ));
        program.push(Step::new(
            vec![Action::Release(Key::Q), Action::Release(Key::P)],
            Duration::ZERO,
        ));
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_char_roundtrip() {
        for key in Key::ALL {
            assert_eq!(Key::from_char(key.as_char()), Some(key));
            assert_eq!(Key::from_char(key.as_char().to_ascii_uppercase()), Some(key));
        }
        assert_eq!(Key::from_char('x'), None);
    }

    #[test]
    fn test_tap_presses_then_releases() {
        let mut program = ActuationProgram::new();
        program.tap(Key::W, DEFAULT_HOLD);

        assert_eq!(program.len(), 2);
        assert_eq!(program.steps()[0].actions, vec![Action::Press(Key::W)]);
        assert_eq!(program.steps()[0].hold, DEFAULT_HOLD);
        assert_eq!(program.steps()[1].actions, vec![Action::Release(Key::W)]);
        assert_eq!(program.duration(), DEFAULT_HOLD);
    }

    #[test]
    fn test_set_mask_covers_every_key() {
        let mut program = ActuationProgram::new();
        program.set_mask([true, false, false, true], DEFAULT_HOLD);

        let actions = &program.steps()[0].actions;
        assert_eq!(
            actions,
            &vec![
                Action::Press(Key::Q),
                Action::Release(Key::W),
                Action::Release(Key::O),
                Action::Press(Key::P),
            ]
        );
    }

    #[test]
    fn test_force_end_releases_everything() {
        let program = ActuationProgram::force_end();
        let last = program.steps().last().unwrap();
        assert!(last
            .actions
            .iter()
            .all(|a| matches!(a, Action::Release(_))));
        assert_eq!(program.duration(), Duration::from_secs(4));
    }
}
