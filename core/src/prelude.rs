use crate::aggregation::labels::{ClassNameTable, DEFAULT_CLASS_NAMES};
use crate::math::stats::StatsHelper;
use crate::service_interface::DetectionResponse;
use crate::transport::ProgressSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/upload";
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Settings shared by every surface that submits videos to the detection service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub chunk_size: usize,
    pub class_names: Vec<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn class_table(&self) -> ClassNameTable {
        ClassNameTable::from_names(self.class_names.clone())
    }
}

/// Errors surfaced to whoever selects or submits a video.
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("please select a video first")]
    NoFileSelected,
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("cannot read video file: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure of a single transfer. The controller absorbs these into the
/// `error` status; they never escape `submit`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("malformed detection payload: {0}")]
    Decode(String),
    #[error("cannot read upload payload: {0}")]
    Io(String),
}

impl From<reqwest::Error> for TransferError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransferError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransferError::Status(status.as_u16())
        } else {
            TransferError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        TransferError::Io(err.to_string())
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
pub type TransferResult<T> = Result<T, TransferError>;

/// Everything a transport needs to ship one video.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

/// Bytes handed to the wire so far, and the expected total when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub sent: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    pub fn new(sent: u64, total: Option<u64>) -> Self {
        Self { sent, total }
    }

    /// `round(100 * sent / total)`, or 0 while the total is unknown.
    pub fn percent(&self) -> u8 {
        match self.total {
            Some(total) => StatsHelper::percent(self.sent, total).unwrap_or(0),
            None => 0,
        }
    }
}

/// Seam between the upload controller and whatever carries the bytes.
#[async_trait]
pub trait DetectionTransport: Send + Sync {
    async fn upload(
        &self,
        request: TransferRequest,
        progress: ProgressSink,
    ) -> TransferResult<DetectionResponse>;
}
