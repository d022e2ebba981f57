use crate::error::{Error, Result};

/// Largest distance, or [`Error::DegenerateDistance`] when there is no spread
/// to rescale by (empty input or every distance zero).
pub fn max_distance(distances: &[f64]) -> Result<f64> {
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if distances.is_empty() {
        return Err(Error::DegenerateDistance {
            reason: "no distances".to_owned(),
        });
    }
    if max <= 0.0 {
        return Err(Error::DegenerateDistance {
            reason: format!("all {} distances are zero", distances.len()),
        });
    }
    Ok(max)
}

/// `w = 1 - d / max(d)`.
///
/// When every distance is zero there is nothing to rescale by and every
/// weight is 1.
pub fn linear_similarity(distances: &[f64]) -> Vec<f64> {
    match max_distance(distances) {
        Ok(max) => distances.iter().map(|d| 1.0 - d / max).collect(),
        Err(err) => {
            if !distances.is_empty() {
                log::warn!("{err}; using weight 1 for every pair");
            }
            vec![1.0; distances.len()]
        }
    }
}
