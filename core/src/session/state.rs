use crate::service_interface::AccuracyMetrics;
use crate::session::file::VideoFile;
use crate::session::preview::PreviewHandle;
use serde::Serialize;
use std::fmt;

pub const FAILURE_SUMMARY: &str = "Error processing video.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// The selected video and the preview resource bound to it.
#[derive(Debug)]
pub struct SelectedVideo {
    pub file: VideoFile,
    pub preview: PreviewHandle,
}

/// Live state of the single upload session. Mutated only by the controller.
#[derive(Debug, Default)]
pub struct UploadSession {
    pub(crate) selected: Option<SelectedVideo>,
    pub(crate) status: UploadStatus,
    pub(crate) progress_percent: u8,
    pub(crate) result_summary: String,
    pub(crate) metrics: Option<AccuracyMetrics>,
}

impl UploadSession {
    pub fn selected(&self) -> Option<&SelectedVideo> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn result_summary(&self) -> &str {
        &self.result_summary
    }

    pub fn metrics(&self) -> Option<&AccuracyMetrics> {
        self.metrics.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            progress_percent: self.progress_percent,
            result_summary: self.result_summary.clone(),
            metrics: self.metrics,
            video: self.selected.as_ref().map(|selected| VideoInfo {
                name: selected.file.name().to_string(),
                size_label: selected.file.size_label(),
                media_type: selected.file.media_type().to_string(),
                preview_uri: selected.preview.uri().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub name: String,
    pub size_label: String,
    pub media_type: String,
    pub preview_uri: String,
}

/// Read-only copy of the session handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: UploadStatus,
    pub progress_percent: u8,
    pub result_summary: String,
    pub metrics: Option<AccuracyMetrics>,
    pub video: Option<VideoInfo>,
}

impl SessionSnapshot {
    pub fn can_submit(&self) -> bool {
        self.video.is_some() && self.status != UploadStatus::Uploading
    }

    pub fn accuracy_label(&self) -> String {
        self.metrics
            .map(|m| format!("{:.1}%", m.accuracy))
            .unwrap_or_else(|| "N/A".into())
    }

    pub fn false_positives_label(&self) -> String {
        self.metrics
            .map(|m| m.false_positives.to_string())
            .unwrap_or_else(|| "N/A".into())
    }

    pub fn accuracy_gain_label(&self) -> String {
        self.metrics
            .map(|m| format!("{:+.1}%", m.accuracy_gain))
            .unwrap_or_else(|| "N/A".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_idle_without_metrics() {
        let snapshot = UploadSession::default().snapshot();
        assert_eq!(snapshot.status, UploadStatus::Idle);
        assert_eq!(snapshot.progress_percent, 0);
        assert!(!snapshot.can_submit());
        assert_eq!(snapshot.accuracy_label(), "N/A");
        assert_eq!(snapshot.false_positives_label(), "N/A");
    }

    #[test]
    fn metric_labels_format_values() {
        let snapshot = SessionSnapshot {
            status: UploadStatus::Success,
            progress_percent: 100,
            result_summary: String::new(),
            metrics: Some(AccuracyMetrics {
                accuracy: 87.3,
                false_positives: 3,
                accuracy_gain: 1.5,
            }),
            video: None,
        };
        assert_eq!(snapshot.accuracy_label(), "87.3%");
        assert_eq!(snapshot.false_positives_label(), "3");
        assert_eq!(snapshot.accuracy_gain_label(), "+1.5%");
    }
}
