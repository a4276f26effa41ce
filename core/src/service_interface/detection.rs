use serde::{Deserialize, Serialize};

/// One bounding box as reported by the detection service.
///
/// On the wire this is the 6-element array
/// `[x1, y1, x2, y2, confidence, class_index]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 6]")]
pub struct BoundingBoxDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: f64,
    /// Not range-checked; ids outside the label table render as `class-<n>`.
    pub class_index: i64,
}

impl BoundingBoxDetection {
    pub fn new(
        bbox: (f64, f64, f64, f64),
        confidence: f64,
        class_index: i64,
    ) -> Result<Self, DetectionFormatError> {
        let (x1, y1, x2, y2) = bbox;
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(DetectionFormatError::NonFiniteCoordinate);
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DetectionFormatError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_index,
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectionFormatError {
    #[error("expected 6 values per detection, found {0}")]
    WrongArity(usize),
    #[error("box coordinates must be finite")]
    NonFiniteCoordinate,
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("class index {0} is not a finite number")]
    InvalidClassIndex(f64),
}

impl TryFrom<Vec<f64>> for BoundingBoxDetection {
    type Error = DetectionFormatError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let [x1, y1, x2, y2, confidence, class_value]: [f64; 6] = values
            .as_slice()
            .try_into()
            .map_err(|_| DetectionFormatError::WrongArity(values.len()))?;

        // the service emits class ids as floats straight out of the model tensor
        let class_index = class_value.round();
        if !class_index.is_finite() || class_index.abs() > i64::MAX as f64 {
            return Err(DetectionFormatError::InvalidClassIndex(class_value));
        }

        Self::new((x1, y1, x2, y2), confidence, class_index as i64)
    }
}

impl From<BoundingBoxDetection> for [f64; 6] {
    fn from(det: BoundingBoxDetection) -> Self {
        [
            det.x1,
            det.y1,
            det.x2,
            det.y2,
            det.confidence,
            det.class_index as f64,
        ]
    }
}

/// Detections for a single sampled video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub frame: String,
    pub detections: Vec<BoundingBoxDetection>,
    pub url: String,
}

impl DetectionFrame {
    pub fn new(
        frame: impl Into<String>,
        detections: Vec<BoundingBoxDetection>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            frame: frame.into(),
            detections,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_decodes_from_six_tuple() {
        let det: BoundingBoxDetection =
            serde_json::from_str("[10.0, 20.0, 110.5, 220.0, 0.87, 6.0]").unwrap();
        assert_eq!(det.class_index, 6);
        assert_eq!(det.confidence, 0.87);
        assert_eq!(det.x2, 110.5);
    }

    #[test]
    fn class_index_is_rounded() {
        let det: BoundingBoxDetection =
            serde_json::from_str("[0, 0, 1, 1, 0.5, 2.9999]").unwrap();
        assert_eq!(det.class_index, 3);
    }

    #[test]
    fn detection_rejects_wrong_arity_and_bad_values() {
        assert!(serde_json::from_str::<BoundingBoxDetection>("[0, 0, 1, 1, 0.5]").is_err());
        assert!(serde_json::from_str::<BoundingBoxDetection>("[0, 0, 1, 1, 1.5, 0]").is_err());
        assert_eq!(
            BoundingBoxDetection::try_from(vec![1.0; 7]),
            Err(DetectionFormatError::WrongArity(7))
        );
    }

    #[test]
    fn negative_class_index_is_kept() {
        let frame: DetectionFrame = serde_json::from_str(
            r#"{"frame": "f", "detections": [[0, 0, 1, 1, 0.9, 0], [0, 0, 1, 1, 0.8, -1]], "url": "u"}"#,
        )
        .unwrap();
        assert_eq!(frame.detections.len(), 2);
        assert_eq!(frame.detections[1].class_index, -1);
    }

    #[test]
    fn detection_serializes_back_to_array() {
        let det = BoundingBoxDetection::new((0.0, 1.0, 2.0, 3.0), 0.25, 14).unwrap();
        let json = serde_json::to_string(&det).unwrap();
        assert_eq!(json, "[0.0,1.0,2.0,3.0,0.25,14.0]");
    }

    #[test]
    fn frame_decodes_with_nested_detections() {
        let frame: DetectionFrame = serde_json::from_str(
            r#"{"frame": "frame_0001.jpg", "detections": [[0, 0, 5, 5, 0.9, 0]], "url": "http://host/results/frame_0001.jpg"}"#,
        )
        .unwrap();
        assert_eq!(frame.frame, "frame_0001.jpg");
        assert_eq!(frame.detections.len(), 1);
    }
}
