//! Snapshot persistence
//!
//! Saves and loads snapshots as pretty JSON or as a compact binary file
//! with a version header.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::state::{Snapshot, CHECKPOINT_VERSION};
use crate::error::CheckpointError;
use crate::genome::traits::Genome;

const BINARY_MAGIC: &[u8; 4] = b"TOTR";

/// Format for snapshot serialization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckpointFormat {
    /// JSON format (human-readable, larger)
    Json,
    /// Binary format (compact, fast)
    #[default]
    Binary,
}

/// Save a snapshot to a file
pub fn save_snapshot<G: Genome>(
    snapshot: &Snapshot<G>,
    path: impl AsRef<Path>,
    format: CheckpointFormat,
) -> Result<(), CheckpointError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    match format {
        CheckpointFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, snapshot)
                .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        }
        CheckpointFormat::Binary => {
            writer.write_all(&CHECKPOINT_VERSION.to_le_bytes())?;
            writer.write_all(BINARY_MAGIC)?;
            bincode::serialize_into(&mut writer, snapshot)
                .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Load a snapshot from a file, detecting its format
pub fn load_snapshot<G: Genome>(path: impl AsRef<Path>) -> Result<Snapshot<G>, CheckpointError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CheckpointError::NotFound(path.display().to_string()));
    }

    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    let snapshot: Snapshot<G> = if bytes.len() >= 8 && &bytes[4..8] == BINARY_MAGIC {
        let version = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if version > CHECKPOINT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: CHECKPOINT_VERSION,
                found: version,
            });
        }
        bincode::deserialize(&bytes[8..])
            .map_err(|e| CheckpointError::Deserialization(e.to_string()))?
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| CheckpointError::Deserialization(e.to_string()))?
    };

    if !snapshot.is_compatible() {
        return Err(CheckpointError::VersionMismatch {
            expected: CHECKPOINT_VERSION,
            found: snapshot.version,
        });
    }
    if snapshot.population.is_empty() {
        return Err(CheckpointError::Corrupted(
            "snapshot holds an empty population".to_string(),
        ));
    }
    Ok(snapshot)
}
