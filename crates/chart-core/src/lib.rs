//! Core types and traits for the chart cache.
//!
//! This crate provides the foundational building blocks including:
//! - Resolution and sample types (Resolution, Sample, Window)
//! - Backend request/response types (DataRequest, DataResponse, RequestId)
//! - Error taxonomy shared by the cache and the controller
//! - Boundary traits for the remote backend and the chart surface

pub mod types;
pub mod traits;
pub mod error;

pub use error::{CacheError, ChartError, ChartResult};
pub use types::*;
pub use traits::*;
