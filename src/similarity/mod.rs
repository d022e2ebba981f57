//! Distance-to-similarity conversion.
//!
//! Two modes:
//!
//! - **Linear**: `w = 1 - d / max(d)`. Cheap, no neighborhood structure.
//! - **Entropy**: per-point Gaussian bandwidths calibrated to a target
//!   perplexity, then symmetrized into joint probabilities. This is the input
//!   a stochastic neighbor-embedding optimizer expects.
//!
//! Both return one weight per input distance, in the same order.

mod entropy;
mod linear;

pub use entropy::{
    EntropyCalibrator, JointProbabilities, RowCalibration, DEFAULT_BETA, DEFAULT_MAX_STEPS,
    DEFAULT_TOLERANCE,
};
pub use linear::{linear_similarity, max_distance};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default target perplexity.
pub const DEFAULT_PERPLEXITY: f64 = 15.0;

/// How distances become weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Calibration {
    /// `1 - d / max(d)`.
    Linear,
    /// Perplexity-calibrated joint probabilities.
    Entropy {
        /// Target effective number of neighbors.
        perplexity: f64,
    },
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::Entropy {
            perplexity: DEFAULT_PERPLEXITY,
        }
    }
}

impl Calibration {
    /// Entropy mode, rejecting non-positive perplexity.
    pub fn entropy(perplexity: f64) -> Result<Self> {
        let c = Calibration::Entropy { perplexity };
        c.validate()?;
        Ok(c)
    }

    /// Check the perplexity, if any.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Calibration::Linear => Ok(()),
            Calibration::Entropy { perplexity }
                if !(perplexity.is_finite() && perplexity > 0.0) =>
            {
                Err(Error::invalid("perplexity", format!("{perplexity} must be finite and > 0")))
            }
            Calibration::Entropy { .. } => Ok(()),
        }
    }

    /// Convert a condensed distance vector for `n` samples into weights.
    ///
    /// Linear mode accepts any slice (including a cutoff subset); `n` is only
    /// used by entropy mode, which needs the full condensed vector.
    pub fn calibrate(&self, distances: &[f64], n: usize) -> Result<Vec<f64>> {
        self.validate()?;
        match *self {
            Calibration::Linear => Ok(linear_similarity(distances)),
            Calibration::Entropy { perplexity } => Ok(EntropyCalibrator::new(perplexity)
                .joint(distances, n)?
                .weights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perplexity_must_be_positive() {
        assert!(Calibration::entropy(0.0).is_err());
        assert!(Calibration::entropy(-3.0).is_err());
        assert!(Calibration::entropy(f64::NAN).is_err());
        assert!(Calibration::entropy(30.0).is_ok());
        assert!(Calibration::Entropy { perplexity: 0.0 }
            .calibrate(&[1.0], 2)
            .is_err());
    }

    #[test]
    fn default_is_entropy_15() {
        assert_eq!(
            Calibration::default(),
            Calibration::Entropy { perplexity: 15.0 }
        );
    }

    #[test]
    fn calibrate_preserves_length() {
        let d = [0.1, 0.4, 0.2, 0.9, 0.3, 0.5];
        for c in [Calibration::Linear, Calibration::Entropy { perplexity: 2.0 }] {
            assert_eq!(c.calibrate(&d, 4).unwrap().len(), d.len());
        }
    }

    #[test]
    fn entropy_rejects_cutoff_subset() {
        // 3 values cannot be the full condensed vector for 4 samples
        let err = Calibration::Entropy { perplexity: 2.0 }
            .calibrate(&[0.1, 0.2, 0.3], 4)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
