use crate::aggregation::labels::ClassNameTable;
use crate::math::stats::StatsHelper;
use crate::service_interface::DetectionFrame;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Degenerate inputs the engine reports instead of producing numbers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("no detection data available")]
    NoFrames,
}

/// Per-label detection counts kept in first-seen order.
///
/// Chart rendering order follows this order, so it is part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFrequency {
    entries: Vec<(String, usize)>,
}

impl ClassFrequency {
    fn increment(&mut self, label: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label, 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|(_, count)| *count).max().unwrap_or(0)
    }
}

impl Serialize for ClassFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameCount {
    pub frame: String,
    pub count: usize,
}

/// Statistics derived from one result set. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub class_frequency: ClassFrequency,
    pub per_frame_series: Vec<FrameCount>,
    pub total_detections: usize,
    pub frames_analyzed: usize,
    /// `None` when no frame carried a detection.
    pub average_confidence: Option<f64>,
}

impl AggregateStats {
    pub fn peak_frame_count(&self) -> usize {
        self.per_frame_series
            .iter()
            .map(|point| point.count)
            .max()
            .unwrap_or(0)
    }
}

/// Single pass over `frames` producing the histogram, the per-frame series and
/// the summary figures.
pub fn compute_aggregate_stats(
    frames: &[DetectionFrame],
    table: &ClassNameTable,
) -> Result<AggregateStats, AggregationError> {
    if frames.is_empty() {
        return Err(AggregationError::NoFrames);
    }

    let mut class_frequency = ClassFrequency::default();
    let mut per_frame_series = Vec::with_capacity(frames.len());
    let mut confidences = Vec::new();

    for frame in frames {
        per_frame_series.push(FrameCount {
            frame: frame.frame.clone(),
            count: frame.detections.len(),
        });

        for detection in &frame.detections {
            let label = table.resolve(detection.class_index).to_string();
            class_frequency.increment(label);
            confidences.push(detection.confidence);
        }
    }

    Ok(AggregateStats {
        class_frequency,
        per_frame_series,
        total_detections: confidences.len(),
        frames_analyzed: frames.len(),
        average_confidence: StatsHelper::mean(&confidences),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_interface::BoundingBoxDetection;

    fn det(confidence: f64, class_index: i64) -> BoundingBoxDetection {
        BoundingBoxDetection::new((0.0, 0.0, 1.0, 1.0), confidence, class_index).unwrap()
    }

    fn frame(name: &str, detections: Vec<BoundingBoxDetection>) -> DetectionFrame {
        DetectionFrame::new(name, detections, format!("http://localhost/results/{name}"))
    }

    #[test]
    fn single_person_example() {
        let frames = vec![frame("f1", vec![det(0.9, 0)]), frame("f2", vec![])];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();

        assert_eq!(stats.class_frequency.iter().collect::<Vec<_>>(), vec![("person", 1)]);
        assert_eq!(
            stats.per_frame_series,
            vec![
                FrameCount { frame: "f1".into(), count: 1 },
                FrameCount { frame: "f2".into(), count: 0 },
            ]
        );
        assert_eq!(stats.total_detections, 1);
        assert_eq!(stats.average_confidence, Some(0.9));
        assert_eq!(stats.frames_analyzed, 2);
    }

    #[test]
    fn empty_input_reports_no_data() {
        assert_eq!(
            compute_aggregate_stats(&[], &ClassNameTable::default()),
            Err(AggregationError::NoFrames)
        );
    }

    #[test]
    fn frames_without_detections_have_no_average() {
        let frames = vec![frame("a", vec![]), frame("b", vec![])];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();
        assert_eq!(stats.total_detections, 0);
        assert_eq!(stats.average_confidence, None);
        assert!(stats.class_frequency.is_empty());
        assert_eq!(stats.per_frame_series.len(), 2);
    }

    #[test]
    fn class_frequency_keeps_first_seen_order() {
        let frames = vec![
            frame("0", vec![det(0.5, 7), det(0.5, 2)]),
            frame("1", vec![det(0.5, 0), det(0.5, 2), det(0.5, 99)]),
            frame("2", vec![det(0.5, 7)]),
        ];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();
        assert_eq!(
            stats.class_frequency.iter().collect::<Vec<_>>(),
            vec![("truck", 2), ("car", 2), ("person", 1), ("class-99", 1)]
        );
        assert_eq!(stats.class_frequency.get("class-99"), Some(1));
        assert_eq!(stats.class_frequency.max_count(), 2);
    }

    #[test]
    fn totals_agree_across_views() {
        let frames = vec![
            frame("x", vec![det(0.1, 1), det(0.3, 1), det(0.8, 4)]),
            frame("y", vec![det(1.0, 16)]),
            frame("z", vec![]),
        ];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();
        let expected: usize = frames.iter().map(|f| f.detections.len()).sum();

        assert_eq!(stats.class_frequency.total(), expected);
        assert_eq!(stats.total_detections, expected);
        assert_eq!(stats.per_frame_series.len(), frames.len());
        for (point, source) in stats.per_frame_series.iter().zip(&frames) {
            assert_eq!(point.frame, source.frame);
            assert_eq!(point.count, source.detections.len());
        }
        let average = stats.average_confidence.unwrap();
        assert!((0.0..=1.0).contains(&average));
        assert!((average - 0.55).abs() < 1e-9);
        assert_eq!(stats.peak_frame_count(), 3);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let frames = vec![
            frame("p", vec![det(0.4, 3), det(0.6, 30), det(0.9, 3)]),
            frame("q", vec![det(0.2, 30)]),
        ];
        let table = ClassNameTable::default();
        let first = compute_aggregate_stats(&frames, &table).unwrap();
        let second = compute_aggregate_stats(&frames, &table).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.class_frequency).unwrap(),
            r#"{"motorcycle":2,"class-30":2}"#
        );
    }

    #[test]
    fn custom_table_changes_labels_only() {
        let frames = vec![frame("only", vec![det(0.7, 0), det(0.7, 1)])];
        let table = ClassNameTable::from_names(vec!["locomotive".into()]);
        let stats = compute_aggregate_stats(&frames, &table).unwrap();
        assert_eq!(
            stats.class_frequency.iter().collect::<Vec<_>>(),
            vec![("locomotive", 1), ("class-1", 1)]
        );
    }

    #[test]
    fn negative_class_index_is_counted_under_synthesized_label() {
        let frames = vec![frame("f", vec![det(0.9, 0), det(0.8, -1)])];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();
        assert_eq!(
            stats.class_frequency.iter().collect::<Vec<_>>(),
            vec![("person", 1), ("class--1", 1)]
        );
        assert_eq!(stats.total_detections, 2);
    }
}
