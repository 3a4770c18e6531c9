//! Core data types for the chart cache.

mod resolution;
mod sample;

pub use resolution::{Resolution, FINE_SPAN_LIMIT_SECS, MEDIUM_SPAN_LIMIT_SECS};
pub use sample::{
    all_absent, format_timestamp, DataRequest, DataResponse, RequestId, Sample, Window,
};
