//! Pipeline configuration.
//!
//! Argument parsing lives outside this crate; a front end fills a
//! [`PipelineConfig`] either directly, through [`PipelineConfig::from_options`]
//! with the familiar flag set, or by deserializing it.

use crate::cutoff::DistanceMode;
use crate::error::Result;
use crate::jaccard::JaccardStrategy;
use crate::similarity::Calibration;
use serde::{Deserialize, Serialize};

/// Everything the distance-to-graph pipeline needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// All pairs, or only pairs within a distance threshold.
    pub distance_mode: DistanceMode,
    /// Distance-to-weight conversion.
    pub calibration: Calibration,
    /// Jaccard implementation for presence/absence input.
    pub jaccard: JaccardStrategy,
}

impl PipelineConfig {
    /// Defaults: all pairs, entropy calibration at
    /// [`DEFAULT_PERPLEXITY`](crate::similarity::DEFAULT_PERPLEXITY), dense Jaccard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flag-style options.
    ///
    /// * `threshold` - maximum distance to keep; `None` keeps every pair.
    /// * `perplexity` - target perplexity for entropy calibration.
    /// * `no_preprocessing` - use linear rescaling instead of entropy calibration.
    /// * `sparse` - use the sparse Jaccard strategy.
    pub fn from_options(
        threshold: Option<f64>,
        perplexity: f64,
        no_preprocessing: bool,
        sparse: bool,
    ) -> Result<Self> {
        let distance_mode = match threshold {
            Some(t) => DistanceMode::cutoff(t)?,
            None => DistanceMode::Full,
        };
        let calibration = if no_preprocessing {
            Calibration::Linear
        } else {
            Calibration::entropy(perplexity)?
        };
        let jaccard = if sparse {
            JaccardStrategy::Sparse
        } else {
            JaccardStrategy::Dense
        };
        Ok(Self {
            distance_mode,
            calibration,
            jaccard,
        })
    }

    /// Set the distance mode.
    pub fn with_distance_mode(mut self, distance_mode: DistanceMode) -> Self {
        self.distance_mode = distance_mode;
        self
    }

    /// Set the calibration.
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the Jaccard strategy.
    pub fn with_jaccard(mut self, jaccard: JaccardStrategy) -> Self {
        self.jaccard = jaccard;
        self
    }

    /// Reject negative thresholds and non-positive perplexity.
    pub fn validate(&self) -> Result<()> {
        self.distance_mode.validate()?;
        self.calibration.validate()
    }

    /// True when a cutoff is combined with entropy calibration; the pipeline
    /// then calibrates on all pairs and applies the cutoff afterwards.
    pub fn calibrates_before_cutoff(&self) -> bool {
        matches!(self.distance_mode, DistanceMode::Cutoff { .. })
            && matches!(self.calibration, Calibration::Entropy { .. })
    }
}
