//! Error types for totter
//!
//! This module defines all error types used throughout the library.
//! Configuration and representation errors surface to the caller and end the
//! trial they occur in; sensor and environment hiccups are absorbed by the
//! evaluation harness and never show up here.

use thiserror::Error;

/// Error type for genome decoding and validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// The genome has no genes to decode
    #[error("Genome is empty")]
    Empty,

    /// A gene holds a value that cannot be turned into an action
    #[error("Invalid gene at position {index}: {reason}")]
    InvalidGene { index: usize, reason: String },

    /// A serialized gene code is not part of the alphabet
    #[error("Unknown gene code: {0:?}")]
    UnknownCode(char),
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Mutation operation failed
    #[error("Mutation failed: {0}")]
    MutationFailed(String),

    /// Selection operation failed
    #[error("Selection failed: {0}")]
    SelectionFailed(String),

    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Error type for checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// IO error during checkpoint
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Checkpoint was written by a newer format version
    #[error("Version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// Checkpoint file not found
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    /// Corrupted checkpoint data
    #[error("Corrupted checkpoint: {0}")]
    Corrupted(String),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Checkpoint error
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The population cannot be laid out on the requested grid
    #[error("Population of {size} cannot be arranged as a {rows}x{cols} grid")]
    GridShape {
        size: usize,
        rows: usize,
        cols: usize,
    },

    /// Population slot index out of range
    #[error("Index {index} out of range for population of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Evaluation could not produce a result
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// Results could not be read from or written to storage
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Result type alias for operator applications
pub type OperatorResult<T> = Result<T, OperatorError>;
