use crate::prelude::{
    DetectionTransport, TransferProgress, TransferRequest, TransferResult, UploadError,
    UploadResult,
};
use crate::service_interface::DetectionResponse;
use crate::session::file::VideoFile;
use crate::session::preview::PreviewPool;
use crate::session::state::{
    SelectedVideo, SessionSnapshot, UploadSession, UploadStatus, FAILURE_SUMMARY,
};
use crate::session::store::{DetectionStore, StoreReader};
use crate::telemetry::{LogManager, TransferMetrics};
use crate::transport::drive_transfer;

/// Permission to run one transfer, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferTicket {
    pub sequence: u64,
    pub request: TransferRequest,
}

/// What `resolve` did with a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(UploadStatus),
    /// A later submit superseded this transfer; nothing changed.
    Stale,
}

/// Owns the upload session and the detection store and is the only code that
/// mutates either.
///
/// The mutation points are [`select_file`](Self::select_file),
/// [`begin_submit`](Self::begin_submit), [`record_progress`](Self::record_progress)
/// and [`resolve`](Self::resolve). [`submit`](Self::submit) strings the last
/// three together for callers that can await the whole transfer.
pub struct UploadController {
    session: UploadSession,
    store: DetectionStore,
    previews: PreviewPool,
    metrics: TransferMetrics,
    logger: LogManager,
    latest_sequence: u64,
    in_flight: Option<u64>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::with_previews(PreviewPool::new())
    }

    pub fn with_previews(previews: PreviewPool) -> Self {
        Self {
            session: UploadSession::default(),
            store: DetectionStore::new(),
            previews,
            metrics: TransferMetrics::new(),
            logger: LogManager::new(),
            latest_sequence: 0,
            in_flight: None,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn store(&self) -> StoreReader {
        self.store.reader()
    }

    pub fn metrics(&self) -> &TransferMetrics {
        &self.metrics
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Replaces the selected video. The previous preview is released before the
    /// new one is acquired. An in-flight transfer keeps running and still
    /// resolves into the session when it completes.
    pub fn select_file(&mut self, file: VideoFile) {
        drop(self.session.selected.take());
        let preview = self.previews.checkout(&file);
        self.logger.record(&format!(
            "selected {} ({}, {})",
            file.name(),
            file.media_type(),
            file.size_label()
        ));

        self.session.selected = Some(SelectedVideo { file, preview });
        self.session.status = UploadStatus::Idle;
        self.session.progress_percent = 0;
        self.session.result_summary.clear();
        self.session.metrics = None;
    }

    /// Moves the session to `uploading` and issues the ticket for exactly one
    /// transfer of the selected video.
    pub fn begin_submit(&mut self) -> UploadResult<TransferTicket> {
        let request = self
            .session
            .selected
            .as_ref()
            .map(|selected| selected.file.to_request())
            .ok_or(UploadError::NoFileSelected)?;

        self.latest_sequence += 1;
        let sequence = self.latest_sequence;
        self.in_flight = Some(sequence);
        self.session.status = UploadStatus::Uploading;
        self.session.progress_percent = 0;
        self.logger.transfer(
            sequence,
            &format!("uploading {} ({} bytes)", request.file_name, request.size_bytes),
        );

        Ok(TransferTicket { sequence, request })
    }

    /// Applies a progress report. Returns whether it changed the session.
    pub fn record_progress(&mut self, sequence: u64, progress: TransferProgress) -> bool {
        if self.in_flight != Some(sequence) || self.session.status != UploadStatus::Uploading {
            return false;
        }
        let percent = progress.percent();
        if percent <= self.session.progress_percent {
            return false;
        }
        self.session.progress_percent = percent;
        true
    }

    /// Applies the outcome of transfer `sequence`, unless a later submit has
    /// superseded it.
    pub fn resolve(
        &mut self,
        sequence: u64,
        outcome: TransferResult<DetectionResponse>,
    ) -> Resolution {
        if self.in_flight != Some(sequence) {
            self.logger.stale(sequence, self.latest_sequence);
            self.metrics.record_stale();
            return Resolution::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(response) => {
                let metrics = response.accuracy_metrics();
                let frame_count = response.frame_count();
                self.store.replace(response.results);

                self.session.status = UploadStatus::Success;
                self.session.progress_percent = 100;
                self.session.result_summary =
                    format!("Detection complete: {} frames analyzed.", frame_count);
                self.session.metrics = Some(metrics);
                self.metrics.record_success();
                self.logger
                    .transfer(sequence, &format!("received {} frames", frame_count));
            }
            Err(err) => {
                self.logger.failure(sequence, &err);
                self.session.status = UploadStatus::Error;
                self.session.progress_percent = 0;
                self.session.result_summary = FAILURE_SUMMARY.to_string();
                self.session.metrics = None;
                self.metrics.record_failure();
            }
        }
        Resolution::Applied(self.session.status)
    }

    /// Uploads the selected video through `transport` and resolves the outcome.
    ///
    /// Only `NoFileSelected` is returned as an error; transfer failures end up
    /// in the session as the `error` status.
    pub async fn submit<T>(&mut self, transport: &T) -> UploadResult<UploadStatus>
    where
        T: DetectionTransport + ?Sized,
    {
        let ticket = self.begin_submit()?;
        let sequence = ticket.sequence;
        let outcome = drive_transfer(transport, ticket.request, |update| {
            self.record_progress(sequence, update);
        })
        .await;
        self.resolve(sequence, outcome);
        Ok(self.session.status)
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}
