//! Chart controller.

mod controller;

pub use controller::{resolution_for, ChartController, ControllerConfig};
