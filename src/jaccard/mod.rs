//! Jaccard distances between presence/absence profiles.
//!
//! Each sample is a row of booleans over M accessory-genome features. For two
//! samples with present-feature sets A and B:
//!
//! ```text
//! d(A, B) = 1 - |A ∩ B| / |A ∪ B|
//! ```
//!
//! ## Empty profiles
//!
//! Two samples with no present features have an empty union. They are treated
//! as identical: `d = 0`. An empty sample against a non-empty one has an empty
//! intersection and a non-empty union, so `d = 1` by the formula.
//!
//! ## Strategies
//!
//! | Strategy | Work | Good for |
//! |----------|------|----------|
//! | [`DenseJaccard`] | O(N²·M) | few features, dense rows |
//! | [`SparseJaccard`] | O(nnz(A·Aᵀ)) after a sparse product | population data where accessory genomes are sparse |
//!
//! Both produce exactly the same condensed vector.

mod dense;
mod io;
mod sparse;

pub use dense::DenseJaccard;
pub use io::{read_presence_absence, PresenceAbsence};
pub use sparse::SparseJaccard;

use crate::error::{Error, Result};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Pairwise distance over boolean sample profiles (rows).
pub trait PairwiseDistance {
    /// Condensed distance vector of length N(N-1)/2 for the N rows of `data`.
    fn condensed(&self, data: ArrayView2<'_, bool>) -> Result<Vec<f64>>;
}

/// Selects a Jaccard implementation from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JaccardStrategy {
    /// All-pairs counting.
    #[default]
    Dense,
    /// Sparse product that only visits overlapping pairs.
    Sparse,
}

impl JaccardStrategy {
    /// Compute condensed Jaccard distances with the selected strategy.
    pub fn distances(&self, data: ArrayView2<'_, bool>) -> Result<Vec<f64>> {
        match self {
            JaccardStrategy::Dense => DenseJaccard.condensed(data),
            JaccardStrategy::Sparse => SparseJaccard.condensed(data),
        }
    }
}

#[inline]
pub(crate) fn jaccard_from_counts(intersection: usize, union: usize) -> f64 {
    if union == 0 {
        0.0
    } else {
        1.0 - intersection as f64 / union as f64
    }
}

fn check_samples(data: &ArrayView2<'_, bool>) -> Result<()> {
    if data.nrows() == 0 {
        return Err(Error::invalid("matrix", "presence/absence matrix has no samples"));
    }
    Ok(())
}
