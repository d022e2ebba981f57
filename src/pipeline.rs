//! End-to-end distance-to-graph pipeline.
//!
//! ```text
//! names + distances ─┐
//! names + presence ──┼─► (cutoff) ─► calibration ─► symmetrize ─► bundle
//! saved bundle ──────┘                                   │
//!                                                        └─► + sample weights ─► embedding
//! ```
//!
//! When a cutoff is combined with entropy calibration, calibration runs on
//! every pair first (it needs whole rows) and the cutoff then drops edges,
//! keeping the joint weights of the pairs that remain.

use crate::bundle::{load_bundle, save_bundle, BUNDLE_EXTENSION};
use crate::condensed::{condensed_len, first_invalid, offset, pair_at, sample_count};
use crate::config::PipelineConfig;
use crate::cutoff::DistanceMode;
use crate::edges::EdgeList;
use crate::error::{Error, Result};
use crate::samples::{SampleSet, SampleWeights, MIN_SAMPLES};
use ndarray::Array2;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where the pairwise distances come from.
#[derive(Debug, Clone)]
pub enum DistanceSource {
    /// A condensed distance vector, N(N-1)/2 long.
    Condensed(Vec<f64>),
    /// A samples × features presence/absence matrix; Jaccard distances are
    /// computed with the configured strategy.
    PresenceAbsence(Array2<bool>),
    /// A previously saved bundle; distances are not recomputed or recalibrated.
    Bundle(PathBuf),
}

/// What the embedding step receives.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Symmetrized (I, J, P).
    pub edges: EdgeList,
    /// One weight per sample.
    pub weights: SampleWeights,
    /// False when there are fewer than [`MIN_SAMPLES`] samples: the graph is
    /// complete and can be saved, but should not be embedded.
    pub embedding_ready: bool,
}

/// Files written by [`Pipeline::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaths {
    /// The (I, J, P) bundle.
    pub bundle: PathBuf,
    /// One sample name per line, in index order.
    pub names: PathBuf,
}

impl PersistedPaths {
    /// Paths derived from an output prefix: `<prefix>.bundle`, `<prefix>.names.txt`.
    pub fn for_prefix(prefix: &Path) -> Self {
        Self {
            bundle: with_suffix(prefix, &format!(".{BUNDLE_EXTENSION}")),
            names: with_suffix(prefix, ".names.txt"),
        }
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = prefix.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Configured pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    weight_table: Option<PathBuf>,
}

impl Pipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            weight_table: None,
        })
    }

    /// Read per-sample weights from a `name<TAB>weight` table.
    pub fn with_weight_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.weight_table = Some(path.into());
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn a condensed distance vector into the symmetrized, weighted edge list.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when `distances` is not N(N-1)/2 long (the
    /// message says how many samples it does describe, if any), and
    /// [`Error::InvalidInput`] naming the first pair whose distance is
    /// negative or non-finite.
    pub fn build_graph(&self, distances: &[f64], n: usize) -> Result<EdgeList> {
        if distances.len() != condensed_len(n) {
            let actual = match sample_count(distances.len()) {
                Ok(m) => format!("{} distances, which describe {m} samples", distances.len()),
                Err(_) => format!("{} distances, not a triangular number", distances.len()),
            };
            let expected = format!("{} distances for {n} samples", condensed_len(n));
            return Err(Error::shape(expected, actual));
        }
        if let Some((k, d)) = first_invalid(distances) {
            let (i, j) = pair_at(k, n)?;
            return Err(Error::invalid(
                "distances",
                format!("samples {i} and {j} are {d} apart; distances must be finite and >= 0"),
            ));
        }

        let edges = if self.config.calibrates_before_cutoff() {
            log::info!("entropy calibration with a cutoff: calibrating all pairs, then filtering");
            let joint = self.config.calibration.calibrate(distances, n)?;
            let kept = self.config.distance_mode.select(distances, n)?;
            let p = kept
                .i
                .iter()
                .zip(kept.j.iter())
                .map(|(&i, &j)| joint[offset(i, j, n)])
                .collect();
            EdgeList::new(kept.i, kept.j, p)?
        } else {
            let kept = self.config.distance_mode.select(distances, n)?;
            let p = self.config.calibration.calibrate(&kept.distances, n)?;
            EdgeList::new(kept.i, kept.j, p)?
        };

        if let DistanceMode::Cutoff { threshold } = self.config.distance_mode {
            log::info!(
                "kept {} of {} pairs at distance <= {threshold}",
                edges.len(),
                distances.len()
            );
        }
        Ok(edges.symmetrize())
    }

    /// Run the pipeline for `samples` on `source`.
    ///
    /// # Errors
    ///
    /// Fewer than two samples, a distance source whose size does not match the
    /// sample count, invalid distances, or I/O failures. Too few samples to
    /// embed is not an error; see [`PipelineOutput::embedding_ready`].
    pub fn run(&self, samples: &SampleSet, source: DistanceSource) -> Result<PipelineOutput> {
        let n = samples.len();
        if n < 2 {
            return Err(Error::invalid(
                "samples",
                format!("need at least 2 samples to form pairs, got {n}"),
            ));
        }

        let edges = match source {
            DistanceSource::Condensed(distances) => {
                log::info!("building graph from {} precomputed distances", distances.len());
                self.build_graph(&distances, n)?
            }
            DistanceSource::PresenceAbsence(matrix) => {
                if matrix.nrows() != n {
                    return Err(Error::shape(
                        format!("{n} presence/absence rows"),
                        format!("{} rows", matrix.nrows()),
                    ));
                }
                log::info!("calculating {:?} jaccard distances", self.config.jaccard);
                let distances = self.config.jaccard.distances(matrix.view())?;
                self.build_graph(&distances, n)?
            }
            DistanceSource::Bundle(path) => {
                log::info!("loading distances from {}", path.display());
                let edges = load_bundle(&path)?;
                edges.check_indices(n)?;
                edges
            }
        };

        let weights = match &self.weight_table {
            Some(path) => SampleWeights::from_table(path, samples)?,
            None => SampleWeights::uniform(n),
        };

        let embedding_ready = samples.is_embeddable();
        if !embedding_ready {
            log::warn!(
                "{n} samples is below the minimum of {MIN_SAMPLES}; distances calculated, but not embedding"
            );
        }

        Ok(PipelineOutput {
            edges,
            weights,
            embedding_ready,
        })
    }

    /// Save the edge bundle and the names list under `prefix`.
    pub fn persist(
        output: &PipelineOutput,
        samples: &SampleSet,
        prefix: &Path,
    ) -> Result<PersistedPaths> {
        let paths = PersistedPaths::for_prefix(prefix);
        samples.write_names(&paths.names)?;
        save_bundle(&paths.bundle, &output.edges)?;
        Ok(paths)
    }

    /// Reload the names and edges written by [`Pipeline::persist`].
    pub fn load_persisted(prefix: &Path) -> Result<(SampleSet, EdgeList)> {
        let paths = PersistedPaths::for_prefix(prefix);
        let samples = SampleSet::read_names(&paths.names)?;
        let edges = load_bundle(&paths.bundle)?;
        edges.check_indices(samples.len())?;
        Ok((samples, edges))
    }
}
