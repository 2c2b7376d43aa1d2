//! Bitmask alleles
//!
//! A bitmask gene sets the complete control state at once: every control whose
//! bit is set is held, every other control is released. `Bitmask` holds the
//! state for the fixed tempo; `TimedBitmask` carries its own hold time.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::evaluation::program::{ActuationProgram, DEFAULT_HOLD};
use crate::genome::traits::Allele;

/// One of the sixteen full control states
///
/// Serialized as a letter from `A` (every control held) to `P` (nothing
/// held); the letters count down through the binary value of the
/// `(q, w, o, p)` mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub struct Bitmask(u8);

impl Bitmask {
    /// Create a bitmask from a `(q, w, o, p)` mask
    pub fn from_mask(mask: [bool; 4]) -> Self {
        let value = mask
            .iter()
            .fold(0u8, |acc, &held| (acc << 1) | u8::from(held));
        Self(value)
    }

    /// The `(q, w, o, p)` mask
    pub fn mask(self) -> [bool; 4] {
        [
            self.0 & 0b1000 != 0,
            self.0 & 0b0100 != 0,
            self.0 & 0b0010 != 0,
            self.0 & 0b0001 != 0,
        ]
    }

    /// Letter code of this state
    pub fn code(self) -> char {
        char::from(b'A' + (15 - self.0))
    }

    /// Parse a letter code
    pub fn from_code(c: char) -> Result<Self, GenomeError> {
        match c {
            'A'..='P' => Ok(Self(15 - (c as u8 - b'A'))),
            _ => Err(GenomeError::UnknownCode(c)),
        }
    }
}

impl From<Bitmask> for char {
    fn from(mask: Bitmask) -> Self {
        mask.code()
    }
}

impl TryFrom<char> for Bitmask {
    type Error = GenomeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Bitmask::from_code(c)
    }
}

impl fmt::Display for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Allele for Bitmask {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..16))
    }

    fn append_steps(
        &self,
        _index: usize,
        program: &mut ActuationProgram,
    ) -> Result<(), GenomeError> {
        program.set_mask(self.mask(), DEFAULT_HOLD);
        Ok(())
    }
}

/// Control state plus the time it is held, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedBitmask {
    /// `(q, w, o, p)` controls held during this gene
    pub mask: [bool; 4],
    /// Hold time in milliseconds
    pub duration_ms: f64,
}

impl TimedBitmask {
    /// Shortest duration drawn for a fresh gene
    pub const MIN_RANDOM_MS: f64 = 10.0;
    /// Longest duration drawn for a fresh gene
    pub const MAX_RANDOM_MS: f64 = 50.0;

    /// Create a timed bitmask
    pub fn new(mask: [bool; 4], duration_ms: f64) -> Self {
        Self { mask, duration_ms }
    }
}

impl Allele for TimedBitmask {
    fn random<R: Rng>(rng: &mut R) -> Self {
        let mask = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
        let duration_ms = rng.gen_range(Self::MIN_RANDOM_MS..Self::MAX_RANDOM_MS);
        Self { mask, duration_ms }
    }

    fn append_steps(
        &self,
        index: usize,
        program: &mut ActuationProgram,
    ) -> Result<(), GenomeError> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(GenomeError::InvalidGene {
                index,
                reason: format!("hold duration {} ms is not a valid time", self.duration_ms),
            });
        }
        let hold = Duration::from_secs_f64(self.duration_ms / 1000.0);
        program.set_mask(self.mask, hold);
        Ok(())
    }
}
