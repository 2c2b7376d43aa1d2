//! Results storage layout
//!
//! Everything an experiment writes lives under one storage root, taken from
//! the `TOTTER_STORAGE` environment variable (default `../results`):
//!
//! ```text
//! <root>/<algorithm>/solution.json
//! <root>/<algorithm>/metadata.json
//! <root>/<algorithm>/history.json
//! <root>/<algorithm>/trials/trial<n>.json
//! <root>/<algorithm>/population_seeds/seed_<pool>_<pop>.json
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Environment variable naming the storage root
pub const STORAGE_ENV: &str = "TOTTER_STORAGE";

/// Storage root used when the environment variable is unset
pub const DEFAULT_STORAGE_ROOT: &str = "../results";

/// Directory layout for experiment results
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsStore {
    root: PathBuf,
}

impl ResultsStore {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !root.is_absolute() {
            warn!("storage root is not absolute: {}", root.display());
        }
        Self { root }
    }

    /// Store rooted at `$TOTTER_STORAGE`, or `../results`
    pub fn from_env() -> Self {
        let root = std::env::var_os(STORAGE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one algorithm's results, created on demand
    pub fn algorithm_dir(&self, algorithm: &str) -> EvoResult<PathBuf> {
        self.ensure(self.root.join(algorithm))
    }

    /// Directory holding one algorithm's per-trial results
    pub fn trials_dir(&self, algorithm: &str) -> EvoResult<PathBuf> {
        self.ensure(self.root.join(algorithm).join("trials"))
    }

    /// Directory holding one algorithm's cached seed pools
    pub fn seeds_dir(&self, algorithm: &str) -> EvoResult<PathBuf> {
        self.ensure(self.root.join(algorithm).join("population_seeds"))
    }

    /// Path of the best solution an algorithm has found
    pub fn solution_path(&self, algorithm: &str) -> PathBuf {
        self.root.join(algorithm).join("solution.json")
    }

    /// Path of a cached seed pool
    pub fn seed_path(&self, algorithm: &str, pool_size: usize, population_size: usize) -> EvoResult<PathBuf> {
        Ok(self
            .seeds_dir(algorithm)?
            .join(format!("seed_{}_{}.json", pool_size, population_size)))
    }

    fn ensure(&self, dir: PathBuf) -> EvoResult<PathBuf> {
        fs::create_dir_all(&dir).map_err(|e| {
            EvolutionError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }
}

/// Write a value as JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> EvoResult<()> {
    let file = File::create(path)
        .map_err(|e| EvolutionError::Storage(format!("cannot write {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .map_err(|e| EvolutionError::Storage(format!("cannot encode {}: {}", path.display(), e)))?;
    writer
        .flush()
        .map_err(|e| EvolutionError::Storage(format!("cannot write {}: {}", path.display(), e)))
}

/// Read a JSON value
pub fn read_json<T: DeserializeOwned>(path: &Path) -> EvoResult<T> {
    let file = File::open(path)
        .map_err(|e| EvolutionError::Storage(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| EvolutionError::Storage(format!("cannot decode {}: {}", path.display(), e)))
}
