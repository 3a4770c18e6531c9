//! Resolution definitions for cached samples.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest visible span rendered at one-minute resolution.
pub const FINE_SPAN_LIMIT_SECS: i64 = 2 * 60 * 60;

/// Spans shorter than this render at five-minute resolution.
pub const MEDIUM_SPAN_LIMIT_SECS: i64 = 7 * 24 * 60 * 60;

/// Sampling period of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 1 minute samples
    #[serde(rename = "1m")]
    Minute1,
    /// 5 minute samples
    #[serde(rename = "5m")]
    Minute5,
    /// 1 hour samples
    #[serde(rename = "1h")]
    Hour1,
}

impl Resolution {
    /// Get the sampling period in seconds.
    pub const fn as_secs(&self) -> i64 {
        match self {
            Resolution::Minute1 => 60,
            Resolution::Minute5 => 300,
            Resolution::Hour1 => 3600,
        }
    }

    /// Get all resolutions, finest first.
    pub fn all() -> &'static [Resolution] {
        &[Resolution::Minute1, Resolution::Minute5, Resolution::Hour1]
    }

    /// Pick the resolution used to display `[start, end)`.
    ///
    /// Up to two hours is fine, under one week is medium, anything longer is
    /// coarse. A two-hour window stays fine and renders 120 one-minute samples.
    pub fn for_span(start: i64, end: i64) -> Resolution {
        let span = end.saturating_sub(start);
        if span <= FINE_SPAN_LIMIT_SECS {
            Resolution::Minute1
        } else if span < MEDIUM_SPAN_LIMIT_SECS {
            Resolution::Minute5
        } else {
            Resolution::Hour1
        }
    }

    /// Check whether `timestamp` lands on a slot boundary.
    #[inline]
    pub fn is_aligned(&self, timestamp: i64) -> bool {
        timestamp.rem_euclid(self.as_secs()) == 0
    }

    /// Round `timestamp` down to the start of its slot.
    #[inline]
    pub fn align_down(&self, timestamp: i64) -> i64 {
        timestamp.div_euclid(self.as_secs()) * self.as_secs()
    }

    /// Round `timestamp` up to the next slot boundary (identity when aligned).
    #[inline]
    pub fn align_up(&self, timestamp: i64) -> i64 {
        let down = self.align_down(timestamp);
        if down == timestamp {
            down
        } else {
            down + self.as_secs()
        }
    }

    /// Number of slots in `[start, end)`; zero for empty or reversed ranges.
    ///
    /// Both bounds are expected to be aligned.
    pub fn slot_count(&self, start: i64, end: i64) -> usize {
        if end <= start {
            0
        } else {
            (end.abs_diff(start) / self.as_secs() as u64) as usize
        }
    }

    /// How many `finer` slots fit in one slot of `self`, if `finer` really is finer.
    pub fn ratio(&self, finer: Resolution) -> Option<usize> {
        if finer < *self {
            Some((self.as_secs() / finer.as_secs()) as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Minute1 => "1m",
            Resolution::Minute5 => "5m",
            Resolution::Hour1 => "1h",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" | "60" => Ok(Resolution::Minute1),
            "5m" | "5min" | "300" => Ok(Resolution::Minute5),
            "1h" | "1hour" | "hour" | "3600" => Ok(Resolution::Hour1),
            _ => Err(format!("Invalid resolution: {}", s)),
        }
    }
}

impl TryFrom<i64> for Resolution {
    type Error = String;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        Resolution::all()
            .iter()
            .copied()
            .find(|r| r.as_secs() == secs)
            .ok_or_else(|| format!("Unsupported resolution: {}s", secs))
    }
}
