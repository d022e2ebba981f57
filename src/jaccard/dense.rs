use super::{check_samples, jaccard_from_counts, PairwiseDistance};
use crate::condensed::condensed_len;
use crate::error::Result;
use ndarray::{ArrayView1, ArrayView2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// All-pairs Jaccard: every pair counts intersection and union over every feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseJaccard;

impl DenseJaccard {
    /// Jaccard distance between two profiles of equal length.
    #[inline]
    pub fn pair(a: ArrayView1<'_, bool>, b: ArrayView1<'_, bool>) -> f64 {
        let mut intersection = 0usize;
        let mut union = 0usize;
        for (x, y) in a.iter().zip(b.iter()) {
            intersection += usize::from(*x && *y);
            union += usize::from(*x || *y);
        }
        jaccard_from_counts(intersection, union)
    }

    /// Distances from row `i` to every later row.
    fn row_tail(data: &ArrayView2<'_, bool>, i: usize) -> Vec<f64> {
        let a = data.row(i);
        ((i + 1)..data.nrows())
            .map(|j| Self::pair(a, data.row(j)))
            .collect()
    }
}

impl PairwiseDistance for DenseJaccard {
    fn condensed(&self, data: ArrayView2<'_, bool>) -> Result<Vec<f64>> {
        check_samples(&data)?;
        let n = data.nrows();

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = (0..n - 1)
            .into_par_iter()
            .map(|i| Self::row_tail(&data, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..n - 1).map(|i| Self::row_tail(&data, i)).collect();

        let mut out = Vec::with_capacity(condensed_len(n));
        for row in rows {
            out.extend(row);
        }
        log::debug!(
            "dense jaccard: {} samples x {} features -> {} pairs",
            n,
            data.ncols(),
            out.len()
        );
        Ok(out)
    }
}
