//! Chart surface trait definition.

use crate::types::Sample;

/// Trait for the component that draws the chart.
pub trait ChartSurface {
    /// Replace the chart contents with `samples`.
    ///
    /// The slice always has one entry per slot of the visible window; absences
    /// are drawn as gaps. Calling twice with the same data is harmless.
    fn render(&mut self, samples: &[Sample]);
}
