//! Population management
//!
//! This module provides individuals, the linear population with its best
//! cache, and the toroidal grid layout used by the cellular engine.

pub mod grid;
pub mod individual;
#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::grid::*;
    pub use super::individual::*;
    pub use super::population::*;
}
