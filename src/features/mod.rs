//! Context window → weighted feature vector over a fitted vocabulary.

pub mod vocabulary;

use serde::{Deserialize, Serialize};

pub use vocabulary::{extract_terms, Vocabulary};

/// Sparse vector as `(index, value)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Dot product with a dense row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(i, v)| v * dense.get(i).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
