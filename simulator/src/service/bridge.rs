use crate::generator::profile::{build_detection_response_from_config, GeneratorConfig};
use crate::service::model::ServiceLedger;
use anyhow::{Context, Result};
use bytes::Buf;
use framescope::session::VideoFormat;
use framescope::transport::http::VIDEO_FIELD;
use futures_util::{pin_mut, TryStreamExt};
use log::{error, info, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use warp::{http::StatusCode, multipart::FormData, Filter};

const MAX_UPLOAD_BYTES: u64 = 512 * 1024 * 1024;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

type SharedLedger = Arc<RwLock<ServiceLedger>>;

#[derive(Debug)]
struct MalformedUpload;

impl warp::reject::Reject for MalformedUpload {}

struct ReceivedVideo {
    file_name: String,
    size_bytes: u64,
}

/// Stand-in for the remote detection service. Accepts the same multipart
/// upload and answers with fabricated detections.
pub struct DetectionService {
    ledger: SharedLedger,
    generator: Arc<GeneratorConfig>,
}

impl DetectionService {
    pub fn new(generator: GeneratorConfig) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ServiceLedger::default())),
            generator: Arc::new(generator),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static
    {
        let ledger = self.ledger.clone();
        let ledger_filter = warp::any().map(move || ledger.clone());
        let generator = self.generator.clone();
        let generator_filter = warp::any().map(move || generator.clone());

        let upload_route = warp::path("upload")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
            .and(ledger_filter.clone())
            .and(generator_filter)
            .and_then(handle_upload);

        let status_route = warp::path("status")
            .and(warp::get())
            .and(ledger_filter)
            .map(|ledger: SharedLedger| {
                let snapshot = ledger
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                warp::reply::json(&snapshot)
            });

        upload_route.or(status_route)
    }

    /// Binds the service and runs it on the current runtime in the background.
    pub fn spawn(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_ephemeral(addr)
            .with_context(|| format!("binding detection service on {addr}"))?;
        tokio::spawn(server);
        info!("detection service listening on http://{bound}");
        Ok(bound)
    }

    pub fn ledger(&self) -> ServiceLedger {
        self.ledger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

async fn read_video_part(form: FormData) -> Result<Option<ReceivedVideo>, warp::Error> {
    pin_mut!(form);
    while let Some(part) = form.try_next().await? {
        if part.name() != VIDEO_FIELD {
            continue;
        }
        let file_name = part.filename().unwrap_or_default().to_string();
        let data = part.stream();
        pin_mut!(data);
        let mut size_bytes = 0u64;
        while let Some(chunk) = data.try_next().await? {
            size_bytes += chunk.remaining() as u64;
        }
        return Ok(Some(ReceivedVideo {
            file_name,
            size_bytes,
        }));
    }
    Ok(None)
}

fn is_allowed_video(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(VideoFormat::from_extension)
        .is_some()
}

fn bad_request(ledger: &SharedLedger, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    ledger
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .record_rejection();
    warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        StatusCode::BAD_REQUEST,
    )
}

async fn handle_upload(
    form: FormData,
    ledger: SharedLedger,
    generator: Arc<GeneratorConfig>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    let video = match read_video_part(form).await {
        Ok(Some(video)) => video,
        Ok(None) => {
            warn!("upload without a {VIDEO_FIELD} part");
            return Ok(bad_request(&ledger, "No video file uploaded"));
        }
        Err(err) => {
            error!("malformed multipart upload: {err}");
            return Err(warp::reject::custom(MalformedUpload));
        }
    };

    if !is_allowed_video(&video.file_name) {
        warn!("rejected upload {:?}", video.file_name);
        return Ok(bad_request(&ledger, "Invalid file type"));
    }

    match build_detection_response_from_config(&generator, video.size_bytes) {
        Ok(response) => {
            info!(
                "{} ({} bytes) -> {} frames",
                video.file_name,
                video.size_bytes,
                response.frame_count()
            );
            ledger
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .record_upload(&video.file_name, response.frame_count());
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            error!("detection generation failed: {err:#}");
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "error": "Detection failed" })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framescope::prelude::{ClientConfig, DetectionTransport, TransferError};
    use framescope::session::{UploadController, UploadStatus};
    use framescope::transport::{HttpTransport, ProgressSink};
    use framescope::VideoFile;
    use reqwest::multipart::{Form, Part};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn start_service(frames: usize) -> (DetectionService, SocketAddr) {
        let service = DetectionService::new(GeneratorConfig {
            frames,
            seed: 5,
            ..Default::default()
        });
        let addr = service.spawn(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        (service, addr)
    }

    /// Serves `body` with `status` for any POST, after draining the upload.
    fn spawn_fixed_reply(status: StatusCode, body: serde_json::Value) -> SocketAddr {
        let route = warp::post()
            .and(warp::body::bytes())
            .map(move |_upload: bytes::Bytes| {
                warp::reply::with_status(warp::reply::json(&body), status)
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn sample_video() -> NamedTempFile {
        let mut temp = Builder::new().suffix(".mp4").tempfile().unwrap();
        temp.write_all(&vec![3u8; 4096]).unwrap();
        temp
    }

    fn transport_for(url: String) -> HttpTransport {
        HttpTransport::new(&ClientConfig::with_endpoint(url)).unwrap()
    }

    #[tokio::test]
    async fn http_transport_round_trip_reports_progress() {
        let (service, addr) = start_service(6);
        let mut temp = Builder::new().suffix(".mp4").tempfile().unwrap();
        temp.write_all(&vec![1u8; 10_000]).unwrap();
        let video = VideoFile::from_path(temp.path()).unwrap();

        let mut config = ClientConfig::with_endpoint(format!("http://{addr}/upload"));
        config.chunk_size = 1024;
        let transport = HttpTransport::new(&config).unwrap();
        let (sink, mut updates) = ProgressSink::channel();

        let response = transport.upload(video.to_request(), sink).await.unwrap();
        assert_eq!(response.frame_count(), 6);

        let mut reports = Vec::new();
        while let Ok(update) = updates.try_recv() {
            reports.push(update);
        }
        assert!(reports.iter().all(|r| r.total == Some(10_000)));
        assert!(reports.windows(2).all(|w| w[0].sent <= w[1].sent));
        assert_eq!(reports.last().map(|r| r.sent), Some(10_000));

        let ledger = service.ledger();
        assert_eq!(ledger.uploads, 1);
        assert_eq!(ledger.last_frame_count, 6);
        assert!(ledger.last_video.unwrap().ends_with(".mp4"));
    }

    #[tokio::test]
    async fn upload_without_video_part_is_rejected() {
        let (service, addr) = start_service(2);
        let form = Form::new().text("note", "no video here");
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "No video file uploaded");
        assert_eq!(service.ledger().rejected, 1);
    }

    #[tokio::test]
    async fn upload_with_wrong_extension_is_rejected() {
        let (_service, addr) = start_service(2);
        let part = Part::bytes(b"not a video".to_vec()).file_name("notes.txt");
        let form = Form::new().part(VIDEO_FIELD, part);
        let response = reqwest::Client::new()
            .post(format!("http://{addr}/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid file type");
    }

    #[tokio::test]
    async fn status_route_serves_ledger() {
        let (_service, addr) = start_service(2);
        let ledger: ServiceLedger = reqwest::get(format!("http://{addr}/status"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ledger, ServiceLedger::default());
    }

    #[test]
    fn allowed_extensions_match_client_formats() {
        assert!(is_allowed_video("clip.MP4"));
        assert!(is_allowed_video("clip.avi"));
        assert!(!is_allowed_video("clip.mkv"));
        assert!(!is_allowed_video("clip"));
    }

    #[tokio::test]
    async fn unrouted_path_ends_in_error_and_keeps_store() {
        let (_service, addr) = start_service(3);
        let video = sample_video();
        let mut controller = UploadController::new();
        controller.select_file(VideoFile::from_path(video.path()).unwrap());

        let good = transport_for(format!("http://{addr}/upload"));
        assert_eq!(controller.submit(&good).await.unwrap(), UploadStatus::Success);
        let store = controller.store();
        let generation = store.generation();
        assert_eq!(store.snapshot().frames.len(), 3);

        let missing = transport_for(format!("http://{addr}/nope"));
        assert_eq!(controller.submit(&missing).await.unwrap(), UploadStatus::Error);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.progress_percent, 0);
        assert_eq!(snapshot.result_summary, "Error processing video.");
        assert!(snapshot.metrics.is_none());
        assert_eq!(store.generation(), generation);
        assert_eq!(store.snapshot().frames.len(), 3);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_status_error() {
        let addr = spawn_fixed_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "busy" }),
        );
        let temp = sample_video();
        let video = VideoFile::from_path(temp.path()).unwrap();
        let transport = transport_for(format!("http://{addr}/upload"));
        let (sink, _updates) = ProgressSink::channel();

        let outcome = transport.upload(video.to_request(), sink).await;
        assert_eq!(outcome, Err(TransferError::Status(503)));
    }

    #[tokio::test]
    async fn undecodable_success_body_ends_in_error() {
        let addr = spawn_fixed_reply(StatusCode::OK, json!({ "status": "ok" }));
        let temp = sample_video();
        let transport = transport_for(format!("http://{addr}/upload"));

        let (sink, _updates) = ProgressSink::channel();
        let video = VideoFile::from_path(temp.path()).unwrap();
        let outcome = transport.upload(video.to_request(), sink).await;
        assert!(matches!(outcome, Err(TransferError::Decode(_))));

        let mut controller = UploadController::new();
        controller.select_file(video);
        assert_eq!(controller.submit(&transport).await.unwrap(), UploadStatus::Error);
        assert_eq!(controller.snapshot().progress_percent, 0);
        assert_eq!(controller.store().generation(), 0);
        assert_eq!(controller.metrics().snapshot().failed, 1);
    }
}
