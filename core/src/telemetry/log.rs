use log::{error, info, warn};

/// Tags upload lifecycle messages with the transfer they belong to.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self { target: "upload" }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }

    pub fn transfer(&self, sequence: u64, message: &str) {
        info!(target: self.target, "[transfer {}] {}", sequence, message);
    }

    pub fn stale(&self, sequence: u64, latest: u64) {
        warn!(
            target: self.target,
            "[transfer {}] discarded, transfer {} supersedes it", sequence, latest
        );
    }

    pub fn failure(&self, sequence: u64, err: &dyn std::error::Error) {
        error!(target: self.target, "[transfer {}] upload error: {}", sequence, err);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
