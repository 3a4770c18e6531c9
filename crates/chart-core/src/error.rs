//! Error types for the chart cache.

use thiserror::Error;

use crate::types::Resolution;

/// Top-level chart error.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: i64, end: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Contract violations raised by the stores and the synthesizer.
///
/// A cache miss is not an error; reads report it as a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error(
        "Invalid range [{start}, {end}) at {resolution}: expected {expected} samples, got {actual}"
    )]
    InvalidRange {
        start: i64,
        end: i64,
        resolution: Resolution,
        expected: usize,
        actual: usize,
    },

    #[error("Range [{start}, {end}) is not aligned to {granularity}")]
    MisalignedRange {
        start: i64,
        end: i64,
        granularity: Resolution,
    },

    #[error("Cannot convert {from} data to {to}")]
    InvalidConversion { from: Resolution, to: Resolution },
}

/// Result type alias for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_converts() {
        let err: ChartError = CacheError::MisalignedRange {
            start: 30,
            end: 600,
            granularity: Resolution::Minute1,
        }
        .into();

        assert!(matches!(err, ChartError::Cache(_)));
        assert_eq!(
            err.to_string(),
            "Cache error: Range [30, 600) is not aligned to 1m"
        );
    }
}
