use anyhow::Context;
use framescope::service_interface::{BoundingBoxDetection, DetectionFrame, DetectionResponse};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for fabricating detection results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub frames: usize,
    pub max_detections_per_frame: usize,
    /// Class ids are drawn from `0..class_count`; values past the client's
    /// label table exercise the `class-<n>` fallback.
    pub class_count: u32,
    pub frame_width: f64,
    pub frame_height: f64,
    pub seed: u64,
    pub public_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frames: 12,
            max_detections_per_frame: 5,
            class_count: 24,
            frame_width: 640.0,
            frame_height: 480.0,
            seed: 0,
            public_url: "http://localhost:8000".into(),
        }
    }
}

impl GeneratorConfig {
    fn frame_name(index: usize) -> String {
        format!("frame_{index:04}.jpg")
    }

    fn result_url(&self, frame: &str) -> String {
        format!("{}/results/{}", self.public_url.trim_end_matches('/'), frame)
    }
}

fn build_frame_detections(
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> anyhow::Result<Vec<BoundingBoxDetection>> {
    let count = rng.gen_range(0..=config.max_detections_per_frame);
    let mut detections = Vec::with_capacity(count);

    for _ in 0..count {
        let x1 = rng.gen_range(0.0..config.frame_width * 0.8);
        let y1 = rng.gen_range(0.0..config.frame_height * 0.8);
        let x2 = (x1 + rng.gen_range(8.0..config.frame_width * 0.2)).min(config.frame_width);
        let y2 = (y1 + rng.gen_range(8.0..config.frame_height * 0.2)).min(config.frame_height);
        let confidence = (rng.gen_range(0.25..1.0_f64) * 100.0).round() / 100.0;
        let class_index = i64::from(rng.gen_range(0..config.class_count));
        detections.push(BoundingBoxDetection::new(
            (x1, y1, x2, y2),
            confidence,
            class_index,
        )?);
    }

    Ok(detections)
}

/// Fabricates a full service response. `salt` is mixed into the seed so
/// different uploads get different, yet reproducible, results.
pub fn build_detection_response_from_config(
    config: &GeneratorConfig,
    salt: u64,
) -> anyhow::Result<DetectionResponse> {
    if config.class_count == 0 {
        anyhow::bail!("generator needs at least one class");
    }
    if config.frame_width < 64.0 || config.frame_height < 64.0 {
        anyhow::bail!(
            "frame size {}x{} too small for synthetic boxes",
            config.frame_width,
            config.frame_height
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed ^ salt);
    let mut results = Vec::with_capacity(config.frames);
    let mut detection_total = 0usize;

    for index in 0..config.frames {
        let frame = GeneratorConfig::frame_name(index);
        let detections = build_frame_detections(config, &mut rng)
            .with_context(|| format!("generating detections for {frame}"))?;
        detection_total += detections.len();
        let url = config.result_url(&frame);
        results.push(DetectionFrame::new(frame, detections, url));
    }

    let accuracy = if config.frames > 0 {
        ((detection_total as f64 / config.frames as f64) * 100.0 * 10.0).round() / 10.0
    } else {
        0.0
    };

    Ok(DetectionResponse::new(results, accuracy))
}
