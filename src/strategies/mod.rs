//! Search strategies
//!
//! This module provides the strategy capability trait, operator-composed
//! sequence strategies, the idle baseline, and the named presets.

pub mod idle;
pub mod presets;
pub mod sequence;
pub mod traits;

pub mod prelude {
    pub use super::idle::*;
    pub use super::presets::{AlgorithmKind, EngineKind};
    pub use super::sequence::*;
    pub use super::traits::*;
}
