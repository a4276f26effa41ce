use std::sync::Mutex;

/// Counts how every transfer issued by a controller was resolved.
pub struct TransferMetrics {
    inner: Mutex<Counts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub succeeded: usize,
    pub failed: usize,
    pub stale: usize,
}

impl TransferMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counts::default()),
        }
    }

    pub fn record_success(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.succeeded += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.failed += 1;
        }
    }

    pub fn record_stale(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.stale += 1;
        }
    }

    pub fn snapshot(&self) -> Counts {
        if let Ok(counts) = self.inner.lock() {
            *counts
        } else {
            Counts::default()
        }
    }
}

impl Default for TransferMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_count_each_outcome() {
        let metrics = TransferMetrics::new();
        metrics.record_success();
        metrics.record_failure();
        metrics.record_failure();
        metrics.record_stale();
        assert_eq!(
            metrics.snapshot(),
            Counts {
                succeeded: 1,
                failed: 2,
                stale: 1
            }
        );
    }
}
