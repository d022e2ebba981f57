use core::fmt;
use std::path::{Path, PathBuf};

/// Result alias for `pathograph`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the distance-to-graph pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Array length or matrix shape does not match the sample count.
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid configuration or input value.
    InvalidInput {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Distances carry no usable spread (all equal or all zero).
    ///
    /// Calibration recovers from this locally; it only escapes to callers of
    /// the strict helpers.
    DegenerateDistance {
        /// What made the distances degenerate.
        reason: String,
    },

    /// Filesystem failure while reading or writing a bundle, names or table.
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// A persisted bundle could not be decoded.
    Decode(String),
}

impl Error {
    pub(crate) fn shape(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            name,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidInput { name, message } => {
                write!(f, "invalid input '{name}': {message}")
            }
            Error::DegenerateDistance { reason } => {
                write!(f, "degenerate distances: {reason}")
            }
            Error::Io { path, message } => {
                write!(f, "i/o error on {}: {message}", path.display())
            }
            Error::Decode(msg) => write!(f, "cannot decode distance bundle: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_parameter() {
        let err = Error::invalid("perplexity", "must be > 0");
        assert_eq!(err.to_string(), "invalid input 'perplexity': must be > 0");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = Error::io(
            Path::new("/tmp/missing.bundle"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.bundle"));
        assert!(matches!(err, Error::Io { .. }));
    }
}
