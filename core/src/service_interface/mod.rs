pub mod detection;
pub mod response;

pub use detection::{BoundingBoxDetection, DetectionFormatError, DetectionFrame};
pub use response::{AccuracyMetrics, DetectionResponse};
