use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use framescope::aggregation::DEFAULT_CLASS_NAMES;
use framescope::prelude::{ClientConfig, DEFAULT_CHUNK_SIZE, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Where the headless client sends videos.
    pub endpoint: String,
    /// Where `--serve` binds the stand-in detection service.
    pub bind_address: SocketAddr,
    /// Base of the per-frame result URLs the service hands out.
    pub public_url: String,
    pub frames: usize,
    pub max_detections_per_frame: usize,
    pub class_count: u32,
    pub seed: u64,
    pub chunk_size: usize,
    pub class_names: Vec<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            public_url: generator.public_url,
            frames: generator.frames,
            max_detections_per_frame: generator.max_detections_per_frame,
            class_count: generator.class_count,
            seed: generator.seed,
            chunk_size: DEFAULT_CHUNK_SIZE,
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(endpoint: String, port: u16, frames: usize, seed: u64) -> Self {
        let bind_address = SocketAddr::from(([127, 0, 0, 1], port));
        Self {
            endpoint,
            bind_address,
            public_url: format!("http://localhost:{port}"),
            frames,
            seed,
            ..Default::default()
        }
    }

    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            chunk_size: self.chunk_size,
            class_names: self.class_names.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            frames: self.frames,
            max_detections_per_frame: self.max_detections_per_frame,
            class_count: self.class_count,
            seed: self.seed,
            public_url: self.public_url.clone(),
            ..Default::default()
        }
    }
}
