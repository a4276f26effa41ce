pub mod labels;
pub mod summary;

pub use labels::{ClassLabel, ClassNameTable, DEFAULT_CLASS_NAMES};
pub use summary::{compute_aggregate_stats, AggregateStats, AggregationError, ClassFrequency, FrameCount};
