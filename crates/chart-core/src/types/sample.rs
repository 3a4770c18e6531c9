//! Samples, visible windows and backend request/response types.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Resolution;
use crate::error::{ChartError, ChartResult};

/// One slot value: `Some` for a reported value, `None` for an explicit absence.
///
/// A slot that was never written has no entry at all in a store.
pub type Sample = Option<f64>;

/// Format an epoch-seconds timestamp for logs.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Check whether `samples` carries no present value.
pub fn all_absent(samples: &[Sample]) -> bool {
    samples.iter().all(Option::is_none)
}

/// The range currently shown by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// First slot, inclusive (epoch seconds)
    pub start: i64,
    /// Last slot, exclusive (epoch seconds)
    pub end: i64,
    /// Resolution chosen for the span
    pub resolution: Resolution,
}

impl Window {
    /// Create a window, choosing its resolution from the span.
    ///
    /// Fails for empty or reversed ranges and for spans too long to measure.
    pub fn new(start: i64, end: i64) -> ChartResult<Self> {
        if start >= end || end.checked_sub(start).is_none() {
            return Err(ChartError::InvalidWindow { start, end });
        }
        Ok(Self {
            start,
            end,
            resolution: Resolution::for_span(start, end),
        })
    }

    /// Number of samples a render of this window carries.
    pub fn slot_count(&self) -> usize {
        self.resolution.slot_count(self.start, self.end)
    }

    /// Check whether `[start, end)` intersects this window (half-open, strict).
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        self.start < end && start < self.end
    }

    /// Check whether a response describes exactly this window.
    pub fn matches(&self, start: i64, end: i64, resolution: Resolution) -> bool {
        self.start == start && self.end == end && self.resolution == resolution
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) @ {}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.resolution
        )
    }
}

/// Identifier of an outstanding backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh request id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetch sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Request identifier
    pub id: RequestId,
    /// First slot, inclusive (epoch seconds)
    pub start: i64,
    /// Last slot, exclusive (epoch seconds)
    pub end: i64,
    /// Requested resolution
    pub resolution: Resolution,
}

impl DataRequest {
    /// Number of samples the response must carry.
    pub fn slot_count(&self) -> usize {
        self.resolution.slot_count(self.start, self.end)
    }
}

/// The backend's single reply to a [`DataRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    /// First slot, inclusive (epoch seconds)
    pub start: i64,
    /// Last slot, exclusive (epoch seconds)
    pub end: i64,
    /// Resolution of `samples`
    pub resolution: Resolution,
    /// One sample per slot
    pub samples: Vec<Sample>,
}

impl DataResponse {
    /// Create a response for `request`.
    pub fn for_request(request: &DataRequest, samples: Vec<Sample>) -> Self {
        Self {
            start: request.start,
            end: request.end,
            resolution: request.resolution,
            samples,
        }
    }

    /// Check whether every sample is an absence.
    pub fn is_all_absent(&self) -> bool {
        all_absent(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_resolution_and_slots() {
        let window = Window::new(0, 7200).unwrap();
        assert_eq!(window.resolution, Resolution::Minute1);
        assert_eq!(window.slot_count(), 120);

        let window = Window::new(0, 10_800).unwrap();
        assert_eq!(window.resolution, Resolution::Minute5);
        assert_eq!(window.slot_count(), 36);

        let window = Window::new(0, 3600).unwrap();
        assert_eq!(window.resolution, Resolution::Minute1);
        assert_eq!(window.slot_count(), 60);
    }

    #[test]
    fn test_window_rejects_empty_span() {
        assert!(matches!(
            Window::new(600, 600),
            Err(ChartError::InvalidWindow { start: 600, end: 600 })
        ));
        assert!(Window::new(600, 0).is_err());
        assert!(matches!(
            Window::new(i64::MIN, i64::MAX),
            Err(ChartError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_window_overlap_is_strict() {
        let window = Window::new(600, 1200).unwrap();
        assert!(window.overlaps(0, 660));
        assert!(window.overlaps(1140, 2000));
        assert!(!window.overlaps(0, 600));
        assert!(!window.overlaps(1200, 1800));
    }

    #[test]
    fn test_all_absent() {
        assert!(all_absent(&[None, None]));
        assert!(!all_absent(&[None, Some(1.0)]));
        assert!(all_absent(&[]));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(3600), "1970-01-01 01:00:00");
    }
}
