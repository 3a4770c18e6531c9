//! Multi-resolution sample cache.
//!
//! This crate answers "samples for `[start, end)` at resolution R" from
//! memory:
//! - `ResolutionStore`: one sparse, aligned store per resolution
//! - `synth`: downsampling and upsampling between resolutions
//! - `IntervalTree`: index of ranges already requested from the backend
//! - `CacheManager`: native reads, fixed-order fallback, fetch bookkeeping

pub mod interval_tree;
pub mod manager;
pub mod store;
pub mod synth;

pub use interval_tree::{Interval, IntervalTree};
pub use manager::{CacheManager, CacheRead, Lookup, RequestState};
pub use store::ResolutionStore;
