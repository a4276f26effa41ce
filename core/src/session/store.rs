use crate::aggregation::{compute_aggregate_stats, AggregateStats, AggregationError, ClassNameTable};
use crate::service_interface::DetectionFrame;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
struct StoreState {
    frames: Arc<Vec<DetectionFrame>>,
    generation: u64,
}

/// Holds the most recent successful result set.
///
/// Only the upload controller owns the writable store; everyone else reads
/// through a [`StoreReader`].
#[derive(Default)]
pub struct DetectionStore {
    inner: Arc<RwLock<StoreState>>,
}

impl DetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a whole result set at once and returns the new generation.
    pub(crate) fn replace(&self, frames: Vec<DetectionFrame>) -> u64 {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.frames = Arc::new(frames);
        state.generation += 1;
        state.generation
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            inner: self.inner.clone(),
        }
    }
}

/// Immutable view of the result set at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub frames: Arc<Vec<DetectionFrame>>,
    /// Bumped on every replacement; 0 until the first success.
    pub generation: u64,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn aggregate(&self, table: &ClassNameTable) -> Result<AggregateStats, AggregationError> {
        compute_aggregate_stats(&self.frames, table)
    }
}

/// Cloneable read-only handle on a [`DetectionStore`].
#[derive(Clone)]
pub struct StoreReader {
    inner: Arc<RwLock<StoreState>>,
}

impl StoreReader {
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        StoreSnapshot {
            frames: state.frames.clone(),
            generation: state.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_empty() {
        let store = DetectionStore::new();
        let snapshot = store.reader().snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation, 0);
        assert_eq!(
            snapshot.aggregate(&ClassNameTable::default()),
            Err(AggregationError::NoFrames)
        );
    }

    #[test]
    fn replace_swaps_whole_set_and_bumps_generation() {
        let store = DetectionStore::new();
        let reader = store.reader();
        store.replace(vec![DetectionFrame::new("a", vec![], "ua")]);
        let before = reader.snapshot();

        let generation = store.replace(vec![
            DetectionFrame::new("b", vec![], "ub"),
            DetectionFrame::new("c", vec![], "uc"),
        ]);

        assert_eq!(generation, 2);
        assert_eq!(reader.generation(), 2);
        assert_eq!(before.frames.len(), 1);
        assert_eq!(reader.snapshot().frames.len(), 2);
        assert_eq!(reader.snapshot().frames[0].frame, "b");
    }
}
