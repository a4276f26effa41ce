use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use framescope::aggregation::AggregateStats;
use framescope::session::{SessionSnapshot, UploadController, VideoFile};
use framescope::telemetry::Counts;
use framescope::transport::HttpTransport;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct WorkflowResult {
    pub session: SessionSnapshot,
    /// `None` when the store holds no frames.
    pub stats: Option<AggregateStats>,
    #[serde(skip)]
    pub transfers: Counts,
}

/// Drives one video through the upload lifecycle without a UI.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, video: &Path) -> anyhow::Result<WorkflowResult> {
        let client_config = self.config.to_client_config();
        let transport =
            HttpTransport::new(&client_config).context("building HTTP transport")?;
        let file = VideoFile::from_path(video)
            .with_context(|| format!("opening video {}", video.display()))?;

        let mut controller = UploadController::new();
        controller.select_file(file);
        controller
            .submit(&transport)
            .await
            .context("submitting video")?;

        let stats = controller
            .store()
            .snapshot()
            .aggregate(&client_config.class_table())
            .ok();

        Ok(WorkflowResult {
            session: controller.snapshot(),
            stats,
            transfers: controller.metrics().snapshot(),
        })
    }
}
