//! Simulated backend for local runs and tests.

use chart_core::traits::Backend;
use chart_core::types::{DataRequest, DataResponse, Resolution, Sample};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Shape and timing of simulated data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Delay before each response is delivered
    pub latency_ms: u64,
    /// Every n-th slot is reported absent (0 = never)
    pub absent_every: usize,
    /// Centre of the simulated curve
    pub base_value: f64,
    /// Swing around the centre
    pub amplitude: f64,
    /// Period of the curve in seconds
    pub period_secs: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 50,
            absent_every: 0,
            base_value: 20.0,
            amplitude: 5.0,
            period_secs: 86_400,
        }
    }
}

/// Simulated value of the slot starting at `timestamp`.
pub fn sample_at(config: &SimulationConfig, timestamp: i64, resolution: Resolution) -> Sample {
    let slot = timestamp.div_euclid(resolution.as_secs());
    if config.absent_every > 0 && slot.rem_euclid(config.absent_every as i64) == 0 {
        return None;
    }
    let period = config.period_secs.max(1);
    let phase = timestamp.rem_euclid(period) as f64 / period as f64;
    Some(config.base_value + config.amplitude * (phase * TAU).sin())
}

/// Build the response the simulated backend sends for `request`.
pub fn generate_response(config: &SimulationConfig, request: &DataRequest) -> DataResponse {
    let step = request.resolution.as_secs();
    let samples = (0..request.slot_count())
        .map(|i| sample_at(config, request.start + i as i64 * step, request.resolution))
        .collect();
    DataResponse::for_request(request, samples)
}

/// Backend answering every request once, after a delay, from a spawned task.
///
/// Must be created inside a tokio runtime.
pub struct SimulatedBackend {
    requests: mpsc::UnboundedSender<DataRequest>,
    issued: usize,
}

impl SimulatedBackend {
    /// Start the backend task; responses arrive on the returned receiver.
    pub fn spawn(config: SimulationConfig) -> (Self, mpsc::UnboundedReceiver<DataResponse>) {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<DataRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let tx = response_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(config.latency_ms)).await;
                    let response = generate_response(&config, &request);
                    debug!("simulated response for request {}", request.id);
                    if tx.send(response).is_err() {
                        debug!("response receiver dropped");
                    }
                });
            }
        });

        (
            Self {
                requests: request_tx,
                issued: 0,
            },
            response_rx,
        )
    }

    /// Number of requests issued so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

impl Backend for SimulatedBackend {
    fn request_data(&mut self, request: DataRequest) {
        self.issued += 1;
        if self.requests.send(request).is_err() {
            warn!("simulated backend stopped; request {} lost", request.id);
        }
    }

    fn name(&self) -> &str {
        "Simulated Backend"
    }
}
