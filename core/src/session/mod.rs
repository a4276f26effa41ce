pub mod controller;
pub mod file;
pub mod preview;
pub mod state;
pub mod store;

pub use controller::{Resolution, TransferTicket, UploadController};
pub use file::{VideoFile, VideoFormat};
pub use preview::{PreviewCounts, PreviewHandle, PreviewPool};
pub use state::{SessionSnapshot, UploadSession, UploadStatus, VideoInfo, FAILURE_SUMMARY};
pub use store::{DetectionStore, StoreReader, StoreSnapshot};
