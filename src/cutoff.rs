//! Thresholded edge selection over condensed distances.
//!
//! The all-pairs graph has N(N-1)/2 edges, which stops being practical at a
//! few tens of thousands of samples. When only a close distance band matters,
//! keeping pairs with `d <= threshold` shrinks the graph before any weighting
//! happens.

use crate::condensed::{check_len, index_pairs};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Pairs that survived a distance cutoff, in condensed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CutoffEdges {
    /// Row index of each kept pair.
    pub i: Vec<usize>,
    /// Column index of each kept pair (always greater than `i`).
    pub j: Vec<usize>,
    /// Distance of each kept pair.
    pub distances: Vec<f64>,
}

impl CutoffEdges {
    /// Number of kept pairs.
    pub fn len(&self) -> usize {
        self.i.len()
    }

    /// True when nothing was kept.
    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }
}

/// Keep only the pairs whose distance is at or below `threshold`.
///
/// Output keeps the relative condensed order of the input. A threshold below
/// every distance (e.g. `-1.0`) returns empty arrays; `f64::INFINITY` keeps
/// everything.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] if `distances.len() != n(n-1)/2`.
pub fn index_pairs_with_cutoff(distances: &[f64], n: usize, threshold: f64) -> Result<CutoffEdges> {
    check_len(distances, n)?;

    let mut out = CutoffEdges::default();
    let mut k = 0;
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            let d = distances[k];
            if d <= threshold {
                out.i.push(i);
                out.j.push(j);
                out.distances.push(d);
            }
            k += 1;
        }
    }
    Ok(out)
}

/// Which pairs enter the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DistanceMode {
    /// Every unordered pair.
    #[default]
    Full,
    /// Only pairs with distance at or below `threshold`.
    Cutoff {
        /// Maximum distance kept (inclusive).
        threshold: f64,
    },
}

impl DistanceMode {
    /// Cutoff mode, rejecting negative or NaN thresholds.
    pub fn cutoff(threshold: f64) -> Result<Self> {
        let mode = DistanceMode::Cutoff { threshold };
        mode.validate()?;
        Ok(mode)
    }

    /// Check the threshold, if any.
    pub fn validate(&self) -> Result<()> {
        match *self {
            DistanceMode::Full => Ok(()),
            DistanceMode::Cutoff { threshold } if threshold.is_nan() || threshold < 0.0 => Err(
                Error::invalid("threshold", format!("{threshold} must be non-negative")),
            ),
            DistanceMode::Cutoff { .. } => Ok(()),
        }
    }

    /// Apply the mode to a condensed distance vector.
    pub fn select(&self, distances: &[f64], n: usize) -> Result<CutoffEdges> {
        match *self {
            DistanceMode::Full => {
                check_len(distances, n)?;
                let (i, j) = index_pairs(n);
                Ok(CutoffEdges {
                    i,
                    j,
                    distances: distances.to_vec(),
                })
            }
            DistanceMode::Cutoff { threshold } => index_pairs_with_cutoff(distances, n, threshold),
        }
    }
}
