//! Core genome traits
//!
//! This module defines the `Genome` and `Allele` traits. A genome is an opaque,
//! copyable candidate; the only thing the search engine asks of it beyond
//! identity is that it can be decoded into an actuation program.

use std::fmt::Debug;

use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::GenomeError;
use crate::evaluation::program::ActuationProgram;

/// Core genome abstraction for the search engines.
///
/// Genomes must be cloneable (operators always work on deep copies),
/// serializable (results and checkpoints persist them) and thread-safe.
pub trait Genome: Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Number of genes
    fn len(&self) -> usize;

    /// Check whether the genome has no genes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the genome into the program that drives the environment
    fn decode(&self) -> Result<ActuationProgram, GenomeError>;
}

/// A single gene of a sequence genome
pub trait Allele:
    Copy + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Draw a uniformly random gene
    fn random<R: Rng>(rng: &mut R) -> Self;

    /// Append the steps this gene stands for.
    ///
    /// `index` is the gene's position, used only for error reporting.
    fn append_steps(&self, index: usize, program: &mut ActuationProgram)
        -> Result<(), GenomeError>;
}
