//! Snapshots and resume
//!
//! This module provides the versioned engine snapshot and its persistence.

pub mod recovery;
pub mod state;

pub mod prelude {
    pub use super::recovery::{load_snapshot, save_snapshot, CheckpointFormat};
    pub use super::state::{Snapshot, CHECKPOINT_VERSION};
}
