use crate::service_interface::detection::DetectionFrame;
use serde::{Deserialize, Serialize};

/// Success body returned by the detection service for one uploaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub results: Vec<DetectionFrame>,
    pub accuracy: f64,
    pub false_positives: u64,
    pub accuracy_gain: f64,
}

impl DetectionResponse {
    pub fn new(results: Vec<DetectionFrame>, accuracy: f64) -> Self {
        Self {
            results,
            accuracy,
            false_positives: 0,
            accuracy_gain: 0.0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.results.len()
    }

    pub fn accuracy_metrics(&self) -> AccuracyMetrics {
        AccuracyMetrics {
            accuracy: self.accuracy,
            false_positives: self.false_positives,
            accuracy_gain: self.accuracy_gain,
        }
    }
}

/// Aggregate quality figures reported alongside the detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub accuracy: f64,
    pub false_positives: u64,
    pub accuracy_gain: f64,
}
