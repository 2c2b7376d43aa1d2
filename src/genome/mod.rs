//! Genome representations
//!
//! This module provides the genome traits and the sequence representations
//! used by the bundled strategies.

pub mod bitmask;
pub mod keystroke;
pub mod sequence;
pub mod traits;

pub mod prelude {
    pub use super::bitmask::*;
    pub use super::keystroke::*;
    pub use super::sequence::*;
    pub use super::traits::*;
}
