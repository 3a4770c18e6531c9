//! Per-resolution sample storage.

use std::collections::BTreeMap;

use chart_core::error::CacheError;
use chart_core::types::{Resolution, Sample};

/// Sparse map from aligned timestamp to sample, one per resolution.
///
/// Keys are always multiples of the store's resolution. A slot with no
/// entry was never written; a slot holding `None` was written as absent.
#[derive(Debug, Clone)]
pub struct ResolutionStore {
    resolution: Resolution,
    slots: BTreeMap<i64, Sample>,
}

impl ResolutionStore {
    /// Create an empty store.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            slots: BTreeMap::new(),
        }
    }

    /// Get the store's resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of written slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a single slot.
    pub fn slot(&self, timestamp: i64) -> Option<Sample> {
        self.slots.get(&timestamp).copied()
    }

    /// Validate that `[start, end)` is ordered and aligned to this store.
    fn check_range(&self, start: i64, end: i64) -> Result<(), CacheError> {
        if start > end {
            return Err(CacheError::InvalidRange {
                start,
                end,
                resolution: self.resolution,
                expected: 0,
                actual: 0,
            });
        }
        if !self.resolution.is_aligned(start) || !self.resolution.is_aligned(end) {
            return Err(CacheError::MisalignedRange {
                start,
                end,
                granularity: self.resolution,
            });
        }
        Ok(())
    }

    /// Write one sample per slot of `[start, end)`.
    pub fn write(&mut self, start: i64, end: i64, samples: &[Sample]) -> Result<(), CacheError> {
        self.check_range(start, end)?;

        let expected = self.resolution.slot_count(start, end);
        if samples.len() != expected {
            return Err(CacheError::InvalidRange {
                start,
                end,
                resolution: self.resolution,
                expected,
                actual: samples.len(),
            });
        }

        let step = self.resolution.as_secs();
        for (i, sample) in samples.iter().enumerate() {
            self.slots.insert(start + i as i64 * step, *sample);
        }
        Ok(())
    }

    /// Read every slot of `[start, end)`.
    ///
    /// Returns `Ok(None)` unless every slot has an entry; partial coverage is
    /// a miss.
    pub fn read(&self, start: i64, end: i64) -> Result<Option<Vec<Sample>>, CacheError> {
        self.check_range(start, end)?;

        let expected = self.resolution.slot_count(start, end);
        // Keys are aligned, so a full count over the range means no holes.
        let samples: Vec<Sample> = self.slots.range(start..end).map(|(_, s)| *s).collect();
        if samples.len() == expected {
            Ok(Some(samples))
        } else {
            Ok(None)
        }
    }

    /// Check whether `[start, end)` is fully written.
    pub fn is_complete(&self, start: i64, end: i64) -> Result<bool, CacheError> {
        self.check_range(start, end)?;
        let expected = self.resolution.slot_count(start, end);
        Ok(self.slots.range(start..end).count() == expected)
    }

    /// Smallest aligned span covering every unwritten slot of `[start, end)`.
    pub fn missing_span(&self, start: i64, end: i64) -> Result<Option<(i64, i64)>, CacheError> {
        self.check_range(start, end)?;

        let step = self.resolution.as_secs();
        let mut first = None;
        let mut last = None;
        let mut ts = start;
        while ts < end {
            if !self.slots.contains_key(&ts) {
                first.get_or_insert(ts);
                last = Some(ts);
            }
            ts += step;
        }

        Ok(first.zip(last).map(|(first, last)| (first, last + step)))
    }
}
