use super::{check_samples, jaccard_from_counts, PairwiseDistance};
use crate::condensed::{condensed_len, offset};
use crate::error::Result;
use ndarray::ArrayView2;
use sprs::{CsMat, TriMat};

/// Sparse Jaccard over the present-feature sets.
///
/// Samples become rows of a CSR indicator matrix A. The product A·Aᵀ holds
/// `|A_i ∩ A_j|` and only stores pairs that share at least one feature, so
/// disjoint pairs are never visited. They keep the default distance: 1, or 0
/// when both samples are empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseJaccard;

impl PairwiseDistance for SparseJaccard {
    fn condensed(&self, data: ArrayView2<'_, bool>) -> Result<Vec<f64>> {
        check_samples(&data)?;
        let (n, m) = data.dim();

        let mut triplets = TriMat::new((n, m));
        let mut sizes = vec![0usize; n];
        for ((row, col), present) in data.indexed_iter() {
            if *present {
                triplets.add_triplet(row, col, 1.0f64);
                sizes[row] += 1;
            }
        }
        let indicator: CsMat<f64> = triplets.to_csr();
        let overlap: CsMat<f64> = &indicator * &indicator.transpose_view();

        // Disjoint defaults first, then overwrite the overlapping pairs.
        let mut out = Vec::with_capacity(condensed_len(n));
        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                let both_empty = sizes[i] == 0 && sizes[j] == 0;
                out.push(if both_empty { 0.0 } else { 1.0 });
            }
        }

        let mut visited = 0usize;
        for (i, row) in overlap.outer_iterator().enumerate() {
            for (j, count) in row.iter() {
                if j <= i {
                    continue;
                }
                let intersection = count.round() as usize;
                let union = sizes[i] + sizes[j] - intersection;
                out[offset(i, j, n)] = jaccard_from_counts(intersection, union);
                visited += 1;
            }
        }

        log::debug!(
            "sparse jaccard: {} samples, {} present entries, {} of {} pairs overlap",
            n,
            indicator.nnz(),
            visited,
            out.len()
        );
        Ok(out)
    }
}
