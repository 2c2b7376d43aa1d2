//! Fitness evaluation
//!
//! This module provides the fitness abstraction and the fitness shapes used
//! by the bundled strategies.

pub mod shapes;
pub mod traits;

pub mod prelude {
    pub use super::shapes::*;
    pub use super::traits::*;
}
