//! Perplexity-calibrated joint probabilities.
//!
//! # Conditional probabilities
//!
//! For each point i a Gaussian precision β_i = 1 / (2σ_i²) is chosen so the
//! row distribution
//!
//! ```text
//! p(j|i) = exp(-β_i d(i,j)²) / Σ_{k≠i} exp(-β_i d(i,k)²)
//! ```
//!
//! has Shannon entropy H_i = ln(perplexity) (natural log, so the effective
//! neighbor count is exp(H_i)). H_i decreases monotonically in β_i, so a
//! bisection finds it: double β while the entropy is too high and no upper
//! bound is known, otherwise halve the bracket.
//!
//! Row entropies are computed on distances shifted by the row minimum, which
//! leaves p(·|i) unchanged but keeps the largest term at exp(0) = 1 so the
//! normalizer never underflows.
//!
//! # Joint probabilities
//!
//! ```text
//! P(i,j) = (p(j|i) + p(i|j)) / (2N)
//! ```
//!
//! Summed over both directions this is 1; the condensed (one direction)
//! vector sums to 1/2. Values are floored at machine epsilon so every pair
//! keeps a strictly positive weight.
//!
//! # Degenerate rows
//!
//! A target the row cannot reach (perplexity above N-1, or all distances
//! equal) simply exhausts the search budget; the row keeps the closest β
//! found and is reported as unconverged. A row whose squared distances
//! overflow f64, or a β that stops being finite, falls back to
//! [`DEFAULT_BETA`] with a uniform p(·|i). Nothing here fails on numeric
//! grounds.

use crate::condensed::{check_values, condensed_from_square, square_from_condensed};
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bisection steps per point.
pub const DEFAULT_MAX_STEPS: usize = 100;
/// Allowed |H - ln(perplexity)|.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;
/// Starting (and fallback) precision β.
pub const DEFAULT_BETA: f64 = 1.0;

/// Outcome of the bandwidth search for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowCalibration {
    /// Precision β = 1 / (2σ²) used for the row.
    pub beta: f64,
    /// Natural-log entropy of the row distribution.
    pub entropy: f64,
    /// Whether the entropy landed within tolerance of the target.
    pub converged: bool,
}

impl RowCalibration {
    /// Gaussian bandwidth σ.
    pub fn sigma(&self) -> f64 {
        (1.0 / (2.0 * self.beta)).sqrt()
    }

    /// Effective number of neighbors, exp(H).
    pub fn perplexity(&self) -> f64 {
        self.entropy.exp()
    }
}

/// Joint probabilities in condensed order plus per-point diagnostics.
#[derive(Debug, Clone)]
pub struct JointProbabilities {
    /// One weight per condensed pair.
    pub weights: Vec<f64>,
    /// Bandwidth search result for each point.
    pub rows: Vec<RowCalibration>,
}

/// Per-point bandwidth search targeting a perplexity.
#[derive(Debug, Clone)]
pub struct EntropyCalibrator {
    perplexity: f64,
    max_steps: usize,
    tolerance: f64,
}

impl EntropyCalibrator {
    /// Create a calibrator for the given target perplexity.
    pub fn new(perplexity: f64) -> Self {
        Self {
            perplexity,
            max_steps: DEFAULT_MAX_STEPS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Set the bisection budget per point.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the entropy tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Target perplexity.
    pub fn perplexity(&self) -> f64 {
        self.perplexity
    }

    fn validate(&self) -> Result<()> {
        if !(self.perplexity.is_finite() && self.perplexity > 0.0) {
            return Err(Error::invalid(
                "perplexity",
                format!("{} must be finite and > 0", self.perplexity),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::invalid("tolerance", "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Row-stochastic conditional probabilities from a square distance matrix.
    ///
    /// Entry (i, j) is p(j|i); the diagonal is zero.
    pub fn conditional(
        &self,
        distances: ArrayView2<'_, f64>,
    ) -> Result<(Array2<f64>, Vec<RowCalibration>)> {
        self.validate()?;
        let (n, cols) = distances.dim();
        if n != cols {
            return Err(Error::shape("a square distance matrix", format!("{n}x{cols}")));
        }
        if n < 2 {
            return Err(Error::invalid("samples", "need at least 2 points to calibrate"));
        }

        let mut probabilities = Array2::<f64>::zeros((n, n));

        #[cfg(feature = "parallel")]
        let diagnostics: Vec<RowCalibration> = probabilities
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(i, p)| self.search_row(distances.row(i), i, p))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let diagnostics: Vec<RowCalibration> = probabilities
            .axis_iter_mut(Axis(0))
            .enumerate()
            .map(|(i, p)| self.search_row(distances.row(i), i, p))
            .collect();

        let unconverged = diagnostics.iter().filter(|r| !r.converged).count();
        if unconverged > 0 {
            log::warn!(
                "perplexity {} not reached for {} of {} points within {} steps; using closest bandwidth",
                self.perplexity,
                unconverged,
                n,
                self.max_steps
            );
        }
        let mean_sigma = diagnostics.iter().map(RowCalibration::sigma).sum::<f64>() / n as f64;
        log::debug!("mean sigma: {mean_sigma:.6}");

        Ok((probabilities, diagnostics))
    }

    /// Joint probabilities for a full condensed distance vector of `n` samples.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if `distances` is not the full condensed vector
    /// (a cutoff subset cannot be calibrated), [`Error::InvalidInput`] for
    /// negative or non-finite distances, fewer than two samples, or a bad
    /// perplexity.
    pub fn joint(&self, distances: &[f64], n: usize) -> Result<JointProbabilities> {
        check_values(distances)?;
        let (mut joint, rows) = {
            let square = square_from_condensed(distances, n)?;
            self.conditional(square.view())?
        };

        // Fold p(i|j) into the upper triangle; the lower one is left stale.
        let denom = 2.0 * n as f64;
        for i in 0..n - 1 {
            for j in (i + 1)..n {
                let p = (joint[(i, j)] + joint[(j, i)]) / denom;
                joint[(i, j)] = p.max(f64::EPSILON);
            }
        }
        let weights = condensed_from_square(joint.view())?;
        Ok(JointProbabilities { weights, rows })
    }

    /// Bisection on β for row `i`, writing p(·|i) (with p(i|i) = 0) into `p`.
    fn search_row(
        &self,
        row: ArrayView1<'_, f64>,
        i: usize,
        mut p: ArrayViewMut1<'_, f64>,
    ) -> RowCalibration {
        let min = row
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != i)
            .map(|(_, d)| *d)
            .fold(f64::INFINITY, f64::min);
        // d² - min² without squaring the large terms first
        let shifted: Vec<f64> = row
            .iter()
            .enumerate()
            .map(|(k, d)| if k == i { 0.0 } else { (d - min) * (d + min) })
            .collect();

        let target = self.perplexity.ln();
        let mut beta = DEFAULT_BETA;
        let mut lo = 0.0;
        let mut hi = f64::INFINITY;
        let mut used = DEFAULT_BETA;
        let mut entropy = f64::NAN;
        let mut converged = false;

        for _ in 0..self.max_steps {
            used = beta;
            match row_entropy(&shifted, i, beta, p.view_mut()) {
                Some(h) => entropy = h,
                None => {
                    entropy = f64::NAN;
                    break;
                }
            }
            let diff = entropy - target;
            if diff.abs() <= self.tolerance {
                converged = true;
                break;
            }
            if diff > 0.0 {
                // too flat: sharpen
                lo = beta;
                beta = if hi.is_infinite() { beta * 2.0 } else { (beta + hi) / 2.0 };
            } else {
                hi = beta;
                beta = (beta + lo) / 2.0;
            }
        }

        if !entropy.is_finite() || !used.is_finite() || used <= 0.0 {
            used = DEFAULT_BETA;
            entropy = row_entropy(&shifted, i, used, p.view_mut())
                .unwrap_or_else(|| ((shifted.len() - 1) as f64).ln());
            converged = false;
        }

        RowCalibration {
            beta: used,
            entropy,
            converged,
        }
    }
}

/// Fill `p` with the normalized row distribution at precision `beta` and
/// return its entropy.
///
/// A row with no usable mass, or one whose squared distances overflowed,
/// gets the uniform distribution over the other points and `None`.
fn row_entropy(
    shifted_sq: &[f64],
    skip: usize,
    beta: f64,
    mut p: ArrayViewMut1<'_, f64>,
) -> Option<f64> {
    let mut mass = 0.0;
    for (k, (s, out)) in shifted_sq.iter().zip(p.iter_mut()).enumerate() {
        *out = if k == skip { 0.0 } else { (-s * beta).exp() };
        mass += *out;
    }
    if mass.is_finite() && mass > 0.0 {
        let mut weighted = 0.0;
        for (s, out) in shifted_sq.iter().zip(p.iter_mut()) {
            *out /= mass;
            weighted += s * *out;
        }
        let entropy = mass.ln() + beta * weighted;
        if entropy.is_finite() {
            return Some(entropy);
        }
    }

    let uniform = 1.0 / (shifted_sq.len() - 1) as f64;
    for (k, out) in p.iter_mut().enumerate() {
        *out = if k == skip { 0.0 } else { uniform };
    }
    None
}
