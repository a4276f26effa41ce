use crate::prelude::{TransferRequest, UploadError, UploadResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Container formats the detection service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Avi,
    Mov,
}

impl VideoFormat {
    pub const SUPPORTED: [VideoFormat; 3] = [VideoFormat::Mp4, VideoFormat::Avi, VideoFormat::Mov];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" => Some(VideoFormat::Mp4),
            "avi" => Some(VideoFormat::Avi),
            "mov" => Some(VideoFormat::Mov),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Avi => "avi",
            VideoFormat::Mov => "mov",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Avi => "video/x-msvideo",
            VideoFormat::Mov => "video/quicktime",
        }
    }
}

/// A readable video on disk together with its declared media type.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFile {
    path: PathBuf,
    name: String,
    media_type: String,
    size_bytes: u64,
}

impl VideoFile {
    /// Opens `path` and declares its media type from the extension. The
    /// content itself is never inspected.
    pub fn from_path<P: AsRef<Path>>(path: P) -> UploadResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(VideoFormat::from_extension)
            .ok_or_else(|| UploadError::UnsupportedMediaType(name.clone()))?;

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(UploadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            name,
            media_type: format.media_type().to_string(),
            size_bytes: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size as shown in the video info panel, e.g. `"12.40 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / (1024.0 * 1024.0))
    }

    pub fn to_request(&self) -> TransferRequest {
        TransferRequest {
            path: self.path.clone(),
            file_name: self.name.clone(),
            media_type: self.media_type.clone(),
            size_bytes: self.size_bytes,
        }
    }
}
