//! Error types shared by ingestion, training, inference and checkpointing.

use std::io;

/// Errors surfaced by every public entry point of the crate.
///
/// None of these are retried internally: a failing batch aborts the whole fit.
#[derive(Debug, thiserror::Error)]
pub enum LinRegError {
    /// Feature rows and targets disagree in length.
    #[error("dimension mismatch: {features} feature rows vs {targets} targets")]
    DimensionMismatch { features: usize, targets: usize },

    /// A row's column count does not match the model or the other rows.
    #[error("shape mismatch: expected {expected} columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Coefficients or predictions requested before `fit` completed.
    #[error("model is not fitted; call fit() first")]
    NotFitted,

    /// Non-positive batch size, learning rate or epoch count (or similar).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("batch {start}..{end} is out of range for {len} examples")]
    BatchOutOfRange { start: usize, end: usize, len: usize },

    /// `fit` was called before any data was ingested.
    #[error("no training data; call ingest() first")]
    MissingData,

    /// A graph evaluation needed a placeholder that was not fed.
    #[error("placeholder `{0}` was not fed")]
    UnfedPlaceholder(String),

    /// Unknown node id, wrong operand count, or a value missing during a
    /// backward sweep.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinRegError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimension_mismatch() {
        let err = LinRegError::DimensionMismatch {
            features: 3,
            targets: 2,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: 3 feature rows vs 2 targets"
        );
    }

    #[test]
    fn test_display_shape_mismatch() {
        let err = LinRegError::ShapeMismatch {
            expected: 8,
            got: 7,
        };
        assert_eq!(err.to_string(), "shape mismatch: expected 8 columns, got 7");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: LinRegError = io_err.into();
        assert!(matches!(err, LinRegError::Io(_)));
    }
}
