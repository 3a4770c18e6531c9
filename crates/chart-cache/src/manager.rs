//! Cache manager: native reads, cross-resolution fallback, request state.

use chart_core::error::CacheError;
use chart_core::types::{format_timestamp, DataRequest, RequestId, Resolution, Sample};
use tracing::{debug, info, warn};

use crate::interval_tree::{Interval, IntervalTree};
use crate::store::ResolutionStore;
use crate::synth;

/// Fetch state of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Nothing in flight
    #[default]
    Idle,
    /// A fetch was issued and its response has not been written yet
    Pending(RequestId),
}

impl RequestState {
    /// Check if a fetch is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending(_))
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead {
    /// Complete data from the requested resolution's own store
    Native(Vec<Sample>),
    /// Complete data derived from another resolution's store
    Synthesized {
        source: Resolution,
        samples: Vec<Sample>,
    },
    /// No store can answer the full range
    Miss,
}

impl CacheRead {
    /// Get the samples, if any.
    pub fn samples(&self) -> Option<&[Sample]> {
        match self {
            CacheRead::Native(samples) | CacheRead::Synthesized { samples, .. } => Some(samples),
            CacheRead::Miss => None,
        }
    }

    /// Check if nothing could answer.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheRead::Miss)
    }
}

/// Result of [`CacheManager::get_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// What the cache could answer
    pub read: CacheRead,
    /// A fetch the caller must send to the backend, if one was opened
    pub fetch: Option<DataRequest>,
}

/// Stores tried, in order, when the requested resolution's own store misses.
fn fallback_sources(resolution: Resolution) -> &'static [Resolution] {
    match resolution {
        Resolution::Minute1 => &[Resolution::Minute5, Resolution::Hour1],
        Resolution::Minute5 => &[Resolution::Minute1, Resolution::Hour1],
        Resolution::Hour1 => &[Resolution::Minute5],
    }
}

/// Owner of the three resolution stores and the requested-range index.
#[derive(Debug, Clone)]
pub struct CacheManager {
    fine: ResolutionStore,
    medium: ResolutionStore,
    coarse: ResolutionStore,
    fine_state: RequestState,
    medium_state: RequestState,
    coarse_state: RequestState,
    requested: IntervalTree,
}

impl CacheManager {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            fine: ResolutionStore::new(Resolution::Minute1),
            medium: ResolutionStore::new(Resolution::Minute5),
            coarse: ResolutionStore::new(Resolution::Hour1),
            fine_state: RequestState::Idle,
            medium_state: RequestState::Idle,
            coarse_state: RequestState::Idle,
            requested: IntervalTree::new(),
        }
    }

    /// Get the store for a resolution.
    pub fn store(&self, resolution: Resolution) -> &ResolutionStore {
        match resolution {
            Resolution::Minute1 => &self.fine,
            Resolution::Minute5 => &self.medium,
            Resolution::Hour1 => &self.coarse,
        }
    }

    fn store_mut(&mut self, resolution: Resolution) -> &mut ResolutionStore {
        match resolution {
            Resolution::Minute1 => &mut self.fine,
            Resolution::Minute5 => &mut self.medium,
            Resolution::Hour1 => &mut self.coarse,
        }
    }

    /// Get the fetch state of a resolution.
    pub fn request_state(&self, resolution: Resolution) -> RequestState {
        match resolution {
            Resolution::Minute1 => self.fine_state,
            Resolution::Minute5 => self.medium_state,
            Resolution::Hour1 => self.coarse_state,
        }
    }

    fn request_state_mut(&mut self, resolution: Resolution) -> &mut RequestState {
        match resolution {
            Resolution::Minute1 => &mut self.fine_state,
            Resolution::Minute5 => &mut self.medium_state,
            Resolution::Hour1 => &mut self.coarse_state,
        }
    }

    /// Check if a fetch is in flight at `resolution`.
    pub fn is_pending(&self, resolution: Resolution) -> bool {
        self.request_state(resolution).is_pending()
    }

    /// Get the index of every range ever requested.
    pub fn requested(&self) -> &IntervalTree {
        &self.requested
    }

    /// Read `[start, end)` at `resolution`, marking a fetch when the native
    /// store misses.
    ///
    /// On a native miss the resolution moves to pending (opening a fetch for
    /// the missing span if it was idle), then the other stores are tried in
    /// a fixed order. A synthesized answer leaves the fetch pending.
    pub fn get_data(
        &mut self,
        start: i64,
        end: i64,
        resolution: Resolution,
    ) -> Result<Lookup, CacheError> {
        if let Some(samples) = self.store(resolution).read(start, end)? {
            debug!(
                "native hit at {} for [{}, {})",
                resolution,
                format_timestamp(start),
                format_timestamp(end)
            );
            return Ok(Lookup {
                read: CacheRead::Native(samples),
                fetch: None,
            });
        }

        let fetch = self.request_missing(start, end, resolution)?;
        let read = self.synthesize(start, end, resolution)?;
        Ok(Lookup { read, fetch })
    }

    /// Read `[start, end)` at `resolution` without touching request state.
    pub fn peek(
        &self,
        start: i64,
        end: i64,
        resolution: Resolution,
    ) -> Result<CacheRead, CacheError> {
        match self.store(resolution).read(start, end)? {
            Some(samples) => Ok(CacheRead::Native(samples)),
            None => self.synthesize(start, end, resolution),
        }
    }

    fn synthesize(
        &self,
        start: i64,
        end: i64,
        resolution: Resolution,
    ) -> Result<CacheRead, CacheError> {
        for &source in fallback_sources(resolution) {
            if let Some(samples) = synth::synthesize(self.store(source), start, end, resolution)? {
                debug!("synthesized {} samples from {}", resolution, source);
                return Ok(CacheRead::Synthesized { source, samples });
            }
        }
        debug!(
            "miss at {} for [{}, {})",
            resolution,
            format_timestamp(start),
            format_timestamp(end)
        );
        Ok(CacheRead::Miss)
    }

    /// Open a fetch for the unwritten part of `[start, end)` at `resolution`.
    ///
    /// Returns `None` when a fetch at that resolution is already in flight or
    /// nothing is missing. The opened range is recorded in the interval index.
    pub fn request_missing(
        &mut self,
        start: i64,
        end: i64,
        resolution: Resolution,
    ) -> Result<Option<DataRequest>, CacheError> {
        if let RequestState::Pending(id) = self.request_state(resolution) {
            debug!("fetch {} already in flight at {}", id, resolution);
            return Ok(None);
        }
        let Some((gap_start, gap_end)) = self.store(resolution).missing_span(start, end)? else {
            return Ok(None);
        };

        let request = DataRequest {
            id: RequestId::new(),
            start: gap_start,
            end: gap_end,
            resolution,
        };
        *self.request_state_mut(resolution) = RequestState::Pending(request.id);
        self.requested
            .insert(Interval::tagged(gap_start, gap_end, resolution));

        info!(
            "opened fetch {} at {} for [{}, {})",
            request.id,
            resolution,
            format_timestamp(gap_start),
            format_timestamp(gap_end)
        );
        Ok(Some(request))
    }

    /// Write backend data into the matching store and resolve that
    /// resolution's outstanding fetch.
    ///
    /// Nothing is derived for other resolutions; they are recomputed on read.
    pub fn save_data(
        &mut self,
        start: i64,
        end: i64,
        resolution: Resolution,
        samples: &[Sample],
    ) -> Result<(), CacheError> {
        self.store_mut(resolution).write(start, end, samples)?;
        debug!("stored {} samples at {}", samples.len(), resolution);
        self.resolve(resolution);
        Ok(())
    }

    /// Return `resolution` to idle, yielding the request it was waiting on.
    pub fn resolve(&mut self, resolution: Resolution) -> Option<RequestId> {
        match std::mem::take(self.request_state_mut(resolution)) {
            RequestState::Pending(id) => {
                debug!("fetch {} at {} resolved", id, resolution);
                Some(id)
            }
            RequestState::Idle => {
                warn!("response at {} with no fetch in flight", resolution);
                None
            }
        }
    }

    /// Smallest aligned span of `[start, end)` still unwritten at `resolution`.
    pub fn missing_span(
        &self,
        start: i64,
        end: i64,
        resolution: Resolution,
    ) -> Result<Option<(i64, i64)>, CacheError> {
        self.store(resolution).missing_span(start, end)
    }

    /// Check whether fetches at `resolution` have already covered `[start, end)`.
    pub fn already_requested(&self, start: i64, end: i64, resolution: Resolution) -> bool {
        self.requested
            .covers(start, end, |i| i.resolution == Some(resolution))
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}
