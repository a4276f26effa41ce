use serde::{Deserialize, Serialize};

/// What the stand-in service has seen so far, served on `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceLedger {
    pub uploads: usize,
    pub rejected: usize,
    pub last_video: Option<String>,
    pub last_frame_count: usize,
}

impl ServiceLedger {
    pub fn record_upload(&mut self, video: &str, frames: usize) {
        self.uploads += 1;
        self.last_video = Some(video.to_string());
        self.last_frame_count = frames;
    }

    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }
}
