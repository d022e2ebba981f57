//! Condensed pairwise-distance bookkeeping.
//!
//! A condensed vector stores the strict upper triangle of an N×N symmetric
//! distance matrix, row-major, without the diagonal:
//!
//! ```text
//!        0    1    2    3
//!   0    .   d0   d1   d2
//!   1         .   d3   d4        condensed = [d0, d1, d2, d3, d4, d5]
//!   2              .   d5
//!   3                   .
//! ```
//!
//! Pair (i, j) with i < j lives at `n*i - i*(i+1)/2 + (j - i - 1)`.
//! This is the layout SciPy's `squareform` uses, so vectors produced by
//! external distance tools can be passed in unchanged.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};

/// Number of unordered pairs for `n` samples: n(n-1)/2.
#[inline]
pub fn condensed_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Recover the sample count from a condensed vector length.
///
/// Errors with [`Error::ShapeMismatch`] when `len` is not a triangular number.
pub fn sample_count(len: usize) -> Result<usize> {
    // n = (1 + sqrt(1 + 8 len)) / 2, then verify exactly.
    let approx = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    let n = approx.max(1);
    if condensed_len(n) == len {
        return Ok(n);
    }
    Err(Error::shape("a triangular length n(n-1)/2", format!("length {len}")))
}

/// Position of the pair {i, j} in a condensed vector for `n` samples.
///
/// Order of `i` and `j` does not matter.
pub fn condensed_index(i: usize, j: usize, n: usize) -> Result<usize> {
    if i == j {
        return Err(Error::invalid("pair", format!("({i}, {j}) is on the diagonal")));
    }
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    if b >= n {
        return Err(Error::invalid(
            "pair",
            format!("index {b} out of range for {n} samples"),
        ));
    }
    Ok(offset(a, b, n))
}

#[inline]
pub(crate) fn offset(i: usize, j: usize, n: usize) -> usize {
    n * i - i * (i + 1) / 2 + (j - i - 1)
}

/// Inverse of [`condensed_index`]: the (i, j) pair, i < j, stored at `k`.
pub fn pair_at(k: usize, n: usize) -> Result<(usize, usize)> {
    let len = condensed_len(n);
    if k >= len {
        return Err(Error::invalid(
            "k",
            format!("position {k} out of range for {len} pairs"),
        ));
    }
    // Walk rows; each row i holds n - i - 1 pairs.
    let mut row_start = 0;
    for i in 0..n - 1 {
        let row_len = n - i - 1;
        if k < row_start + row_len {
            return Ok((i, i + 1 + (k - row_start)));
        }
        row_start += row_len;
    }
    unreachable!("k < condensed_len(n) always lands in a row")
}

/// Enumerate all unordered pairs in condensed order.
///
/// Returns `(I, J)` with `I[k] < J[k]`, ready to zip element-wise with a
/// condensed distance vector. Fewer than two samples yields empty vectors.
pub fn index_pairs(n: usize) -> (Vec<usize>, Vec<usize>) {
    let len = condensed_len(n);
    let mut rows = Vec::with_capacity(len);
    let mut cols = Vec::with_capacity(len);
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            rows.push(i);
            cols.push(j);
        }
    }
    (rows, cols)
}

/// Check that a condensed vector matches `n` samples.
pub fn check_len(distances: &[f64], n: usize) -> Result<()> {
    let expected = condensed_len(n);
    if distances.len() != expected {
        return Err(Error::shape(
            format!("{expected} condensed distances for {n} samples"),
            format!("{} distances", distances.len()),
        ));
    }
    Ok(())
}

/// Position and value of the first negative or non-finite distance.
pub(crate) fn first_invalid(distances: &[f64]) -> Option<(usize, f64)> {
    distances
        .iter()
        .copied()
        .enumerate()
        .find(|(_, d)| !d.is_finite() || *d < 0.0)
}

/// Check that every distance is finite and non-negative.
pub fn check_values(distances: &[f64]) -> Result<()> {
    if let Some((k, d)) = first_invalid(distances) {
        return Err(Error::invalid(
            "distances",
            format!("entry {k} is {d}; distances must be finite and non-negative"),
        ));
    }
    Ok(())
}

/// Expand a condensed vector into a symmetric N×N matrix with zero diagonal.
pub fn square_from_condensed(distances: &[f64], n: usize) -> Result<Array2<f64>> {
    check_len(distances, n)?;
    let mut square = Array2::<f64>::zeros((n, n));
    let mut k = 0;
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            square[(i, j)] = distances[k];
            square[(j, i)] = distances[k];
            k += 1;
        }
    }
    Ok(square)
}

/// Collapse a square matrix back to condensed form (upper triangle only).
///
/// The lower triangle and diagonal are ignored, matching `squareform` with
/// checks disabled.
pub fn condensed_from_square(square: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
    let (rows, cols) = square.dim();
    if rows != cols {
        return Err(Error::shape("a square matrix", format!("{rows}x{cols}")));
    }
    let mut out = Vec::with_capacity(condensed_len(rows));
    for i in 0..rows.saturating_sub(1) {
        for j in (i + 1)..rows {
            out.push(square[(i, j)]);
        }
    }
    Ok(out)
}
