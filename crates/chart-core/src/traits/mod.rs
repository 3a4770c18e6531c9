//! Boundary traits for the chart cache's external collaborators.

mod backend;
mod surface;

pub use backend::Backend;
pub use surface::ChartSurface;
