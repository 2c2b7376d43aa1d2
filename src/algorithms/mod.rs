//! Evolutionary algorithms
//!
//! This module provides the engine configuration, the `SearchEngine`
//! contract, and the linear and cellular engines.

pub mod cellular;
pub mod config;
pub mod engine;
pub mod linear;

pub mod prelude {
    pub use super::cellular::{CellularGA, CellularReplacement};
    pub use super::config::*;
    pub use super::engine::SearchEngine;
    pub use super::linear::LinearGA;
}
