//! Variable-length sequence genome
//!
//! Every representation in this crate is an ordered list of genes drawn from
//! some alphabet. `Sequence<A>` carries the list; the allele type decides what
//! each gene means once decoded.

use std::ops::{Index, RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::evaluation::program::ActuationProgram;
use crate::genome::traits::{Allele, Genome};

/// Ordered, variable-length list of genes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound = "")]
pub struct Sequence<A: Allele> {
    genes: Vec<A>,
}

impl<A: Allele> Sequence<A> {
    /// Create a sequence from genes
    pub fn new(genes: Vec<A>) -> Self {
        Self { genes }
    }

    /// Generate a random sequence whose length is drawn from `length`
    pub fn random<R: Rng>(rng: &mut R, length: RangeInclusive<usize>) -> Self {
        let len = rng.gen_range(length);
        let genes = (0..len).map(|_| A::random(rng)).collect();
        Self { genes }
    }

    /// The genes of this sequence
    pub fn genes(&self) -> &[A] {
        &self.genes
    }

    /// Mutable access to the genes
    pub fn genes_mut(&mut self) -> &mut Vec<A> {
        &mut self.genes
    }

    /// Take the genes out of this sequence
    pub fn into_genes(self) -> Vec<A> {
        self.genes
    }

    /// Get an iterator over the genes
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.genes.iter()
    }
}

impl<A: Allele> Genome for Sequence<A> {
    fn len(&self) -> usize {
        self.genes.len()
    }

    fn decode(&self) -> Result<ActuationProgram, GenomeError> {
        if self.genes.is_empty() {
            return Err(GenomeError::Empty);
        }
        let mut program = ActuationProgram::new();
        for (index, gene) in self.genes.iter().enumerate() {
            gene.append_steps(index, &mut program)?;
        }
        Ok(program)
    }
}

impl<A: Allele> Index<usize> for Sequence<A> {
    type Output = A;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genes[index]
    }
}

impl<A: Allele> From<Vec<A>> for Sequence<A> {
    fn from(genes: Vec<A>) -> Self {
        Self::new(genes)
    }
}

impl<A: Allele> FromIterator<A> for Sequence<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::program::Key;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_length_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let seq: Sequence<Key> = Sequence::random(&mut rng, 15..=30);
            assert!((15..=30).contains(&seq.len()));
        }
    }

    #[test]
    fn test_decode_empty_is_error() {
        let seq: Sequence<Key> = Sequence::new(vec![]);
        assert_eq!(seq.decode(), Err(GenomeError::Empty));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let seq = Sequence::new(vec![Key::Q, Key::P]);
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, r#"["q","p"]"#);
        let back: Sequence<Key> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }
}
