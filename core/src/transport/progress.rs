use crate::prelude::TransferProgress;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Where a transport reports how far its upload has got.
///
/// Reports are queued and applied by whoever drives the transfer, on its own
/// task, so the transport never touches session state directly.
#[derive(Clone, Debug)]
pub struct ProgressSink {
    tx: UnboundedSender<TransferProgress>,
}

impl ProgressSink {
    pub fn channel() -> (Self, UnboundedReceiver<TransferProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn report(&self, sent: u64, total: Option<u64>) {
        // the driver may already be gone if the caller stopped listening
        let _ = self.tx.send(TransferProgress::new(sent, total));
    }
}
