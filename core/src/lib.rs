//! Upload lifecycle and detection aggregation core for framescope.
//!
//! The session module owns the single upload session and the store of the
//! last successful result set; aggregation derives the statistics every
//! surface renders from that store.

pub mod aggregation;
pub mod math;
pub mod prelude;
pub mod service_interface;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use aggregation::{compute_aggregate_stats, AggregateStats, ClassNameTable};
pub use prelude::{ClientConfig, DetectionTransport, TransferError, UploadError};
pub use session::{UploadController, UploadStatus, VideoFile};
