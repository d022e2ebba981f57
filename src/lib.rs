//! # pathograph
//!
//! Pairwise genomic distances to the symmetric, probability-weighted neighbor
//! graph consumed by stochastic cluster embedding.
//!
//! ```text
//! distances ─► condensed pairs ─► (cutoff) ─► similarity ─► symmetrize ─► (I, J, P)
//! ```
//!
//! Sketching, alignment, the embedding optimizer, clustering and plotting are
//! external; this crate covers the distance bookkeeping and weighting between
//! them.
//!
//! **Default build** is single-threaded. `parallel` spreads the dense Jaccard
//! pass and the bandwidth searches over rayon; `graph` adds petgraph export.

pub mod bundle;
pub mod condensed;
pub mod config;
pub mod cutoff;
pub mod edges;
/// Error types used across `pathograph`.
pub mod error;
pub mod jaccard;
pub mod pipeline;
pub mod samples;
pub mod similarity;

#[cfg(test)]
mod pipeline_tests;

pub use bundle::{load_bundle, save_bundle};
pub use condensed::{condensed_index, condensed_len, index_pairs, square_from_condensed};
pub use config::PipelineConfig;
pub use cutoff::{index_pairs_with_cutoff, CutoffEdges, DistanceMode};
pub use edges::EdgeList;
pub use error::{Error, Result};
pub use jaccard::{DenseJaccard, JaccardStrategy, PairwiseDistance, SparseJaccard};
pub use pipeline::{DistanceSource, Pipeline, PipelineOutput};
pub use samples::{SampleSet, SampleWeights, MIN_SAMPLES};
pub use similarity::{linear_similarity, Calibration, EntropyCalibrator};
