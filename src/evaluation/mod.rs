//! Program evaluation
//!
//! This module provides the actuation program model, the environment and
//! sensor contracts, the termination watchdog, and the harness that races the
//! two against each other for every evaluation.

pub mod environment;
pub mod harness;
pub mod program;
pub mod simulated;
pub mod watchdog;

pub mod prelude {
    pub use super::environment::*;
    pub use super::harness::*;
    pub use super::program::*;
    pub use super::simulated::*;
    pub use super::watchdog::*;
}
