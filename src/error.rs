/// Error types for course ingestion and analysis.
///
/// Only the ingestion step is allowed to fail. Per-point anomalies are counted
/// and folded into quality scores instead of being raised.

use thiserror::Error;

/// Fatal errors raised while turning a track into a course profile.
#[derive(Debug, Error)]
pub enum CourseError {
    /// The track contained no usable points.
    #[error("track contains no points")]
    EmptyTrack,

    /// The track container was malformed or had no track segments.
    #[error("failed to parse track: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CourseError>;

/// A data-quality check that could not be evaluated at all.
///
/// The validator turns these into a synthetic critical failure for the check
/// that produced it, so one broken check never hides the others.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckError {
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("inconsistent course data: {0}")]
    Inconsistent(String),
}

impl CheckError {
    /// Fail with [`CheckError::NonFinite`] unless `value` is finite.
    pub fn ensure_finite(field: &'static str, value: f64) -> std::result::Result<f64, CheckError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CheckError::NonFinite { field, value })
        }
    }
}
