use crate::prelude::{
    ClientConfig, DetectionTransport, TransferError, TransferRequest, TransferResult,
};
use crate::service_interface::DetectionResponse;
use crate::transport::progress::ProgressSink;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, Stream};
use reqwest::multipart::{Form, Part};
use std::io;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Multipart form field the detection service reads the video from.
pub const VIDEO_FIELD: &str = "video";

/// Ships videos to the detection service as a multipart POST.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    chunk_size: usize,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> TransferResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            chunk_size: config.chunk_size.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Reads `file` in reads of at most `chunk_size` bytes, reporting each chunk
/// as sent the moment the HTTP client pulls it. Only one chunk is held in
/// memory at a time.
fn file_chunks(
    file: File,
    total: u64,
    chunk_size: usize,
    progress: ProgressSink,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::try_unfold((file, 0u64), move |(mut file, sent)| {
        let progress = progress.clone();
        async move {
            let mut buffer = vec![0u8; chunk_size];
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                return Ok::<_, io::Error>(None);
            }
            buffer.truncate(read);
            let sent = sent + read as u64;
            progress.report(sent, Some(total));
            Ok(Some((Bytes::from(buffer), (file, sent))))
        }
    })
}

#[async_trait]
impl DetectionTransport for HttpTransport {
    async fn upload(
        &self,
        request: TransferRequest,
        progress: ProgressSink,
    ) -> TransferResult<DetectionResponse> {
        let file = File::open(&request.path).await?;
        let total = file.metadata().await?.len();
        progress.report(0, Some(total));

        let body = reqwest::Body::wrap_stream(file_chunks(file, total, self.chunk_size, progress));
        let part = Part::stream_with_length(body, total)
            .file_name(request.file_name)
            .mime_str(&request.media_type)?;
        let form = Form::new().part(VIDEO_FIELD, part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| TransferError::Decode(err.to_string()))
    }
}
