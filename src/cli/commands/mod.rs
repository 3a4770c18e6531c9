//! CLI command implementations.

pub mod resolution;
pub mod simulate;
pub mod validate;
