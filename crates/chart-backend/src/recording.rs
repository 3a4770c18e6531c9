//! Chart surface that records every render.

use chart_core::error::{ChartError, ChartResult};
use chart_core::traits::ChartSurface;
use chart_core::types::Sample;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

/// One render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Position in render order, starting at 0
    pub index: usize,
    /// Rendered samples
    pub samples: Vec<Sample>,
}

impl Frame {
    /// Number of slots drawn as gaps.
    pub fn gaps(&self) -> usize {
        self.samples.iter().filter(|s| s.is_none()).count()
    }
}

#[derive(Debug, Serialize)]
struct CsvRow {
    frame: usize,
    slot: usize,
    value: Option<f64>,
}

/// Surface keeping every frame it was asked to draw.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    frames: Vec<Frame>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded frames, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Serialize the frames as JSON.
    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.frames)
            .map_err(|e| ChartError::Serialization(e.to_string()))
    }

    /// Write one `frame,slot,value` row per rendered sample.
    pub fn write_csv<W: Write>(&self, writer: W) -> ChartResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for frame in &self.frames {
            for (slot, value) in frame.samples.iter().enumerate() {
                csv.serialize(CsvRow {
                    frame: frame.index,
                    slot,
                    value: *value,
                })
                .map_err(|e| ChartError::Serialization(e.to_string()))?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}

impl ChartSurface for RecordingSurface {
    fn render(&mut self, samples: &[Sample]) {
        let frame = Frame {
            index: self.frames.len(),
            samples: samples.to_vec(),
        };
        debug!("frame {}: {} samples, {} gaps", frame.index, samples.len(), frame.gaps());
        self.frames.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_frames_in_order() {
        let mut surface = RecordingSurface::new();
        surface.render(&[None, None]);
        surface.render(&[Some(1.0), None]);

        assert_eq!(surface.frames().len(), 2);
        assert_eq!(surface.frames()[0].gaps(), 2);
        assert_eq!(surface.last().unwrap().index, 1);
        assert_eq!(surface.last().unwrap().samples, vec![Some(1.0), None]);
    }

    #[test]
    fn test_csv_export() {
        let mut surface = RecordingSurface::new();
        surface.render(&[Some(1.5), None]);

        let mut out = Vec::new();
        surface.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "frame,slot,value\n0,0,1.5\n0,1,\n");
    }

    #[test]
    fn test_json_export() {
        let mut surface = RecordingSurface::new();
        surface.render(&[Some(2.0), None]);

        let json: serde_json::Value = serde_json::from_str(&surface.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["index"], 0);
        assert_eq!(json[0]["samples"][0], 2.0);
        assert!(json[0]["samples"][1].is_null());
    }
}
