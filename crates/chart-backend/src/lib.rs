//! Simulated backend and recording chart surface.

mod recording;
mod simulated;

pub use recording::{Frame, RecordingSurface};
pub use simulated::{generate_response, sample_at, SimulatedBackend, SimulationConfig};
