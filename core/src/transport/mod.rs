pub mod http;
pub mod progress;

pub use http::HttpTransport;
pub use progress::ProgressSink;

use crate::prelude::{DetectionTransport, TransferProgress, TransferRequest, TransferResult};
use crate::service_interface::DetectionResponse;

/// Runs one transfer to completion, handing every progress report to
/// `on_progress` on the calling task before the outcome is returned.
pub async fn drive_transfer<T, F>(
    transport: &T,
    request: TransferRequest,
    mut on_progress: F,
) -> TransferResult<DetectionResponse>
where
    T: DetectionTransport + ?Sized,
    F: FnMut(TransferProgress),
{
    let (sink, mut updates) = ProgressSink::channel();
    let transfer = transport.upload(request, sink);
    tokio::pin!(transfer);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(update) = updates.recv() => on_progress(update),
            outcome = &mut transfer => break outcome,
        }
    };
    while let Ok(update) = updates.try_recv() {
        on_progress(update);
    }
    outcome
}
