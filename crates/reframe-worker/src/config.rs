//! Worker configuration.

use crate::error::{WorkerError, WorkerResult};
use reframe_core::ReframeConfig;
use reframe_models::{AspectRatio, PlanMode};
use std::path::{Path, PathBuf};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory holding one label file per frame
    pub labels_dir: PathBuf,
    /// Label file name prefix (`{prefix}_{frame}.txt`)
    pub label_prefix: String,
    /// Source frame width in pixels
    pub frame_width: u32,
    /// Source frame height in pixels
    pub frame_height: u32,
    /// Number of frames; inferred from the label files when unset
    pub frame_count: Option<u64>,
    /// Scene-based or direct planning
    pub mode: PlanMode,
    /// Output aspect ratio, overriding the reframe config
    pub aspect_ratio: Option<AspectRatio>,
    /// Minimum subject confidence, overriding the reframe config
    pub min_confidence: Option<f32>,
    /// Where the JSON crop plan is written
    pub output_path: PathBuf,
    /// Optional JSON file with a full `ReframeConfig`
    pub reframe_config_path: Option<PathBuf>,
    /// Optional file receiving a Prometheus metrics snapshot
    pub metrics_out: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            labels_dir: PathBuf::from("labels"),
            label_prefix: "frame".to_string(),
            frame_width: 1920,
            frame_height: 1080,
            frame_count: None,
            mode: PlanMode::Scenes,
            aspect_ratio: None,
            min_confidence: None,
            output_path: PathBuf::from("crop_plan.json"),
            reframe_config_path: None,
            metrics_out: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            labels_dir: std::env::var("REFRAME_LABELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.labels_dir),
            label_prefix: std::env::var("REFRAME_LABEL_PREFIX").unwrap_or(defaults.label_prefix),
            frame_width: std::env::var("REFRAME_FRAME_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_width),
            frame_height: std::env::var("REFRAME_FRAME_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_height),
            frame_count: std::env::var("REFRAME_FRAME_COUNT")
                .ok()
                .and_then(|s| s.parse().ok()),
            mode: std::env::var("REFRAME_MODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.mode),
            aspect_ratio: std::env::var("REFRAME_ASPECT")
                .ok()
                .and_then(|s| s.parse().ok()),
            min_confidence: std::env::var("REFRAME_MIN_CONFIDENCE")
                .ok()
                .and_then(|s| s.parse().ok()),
            output_path: std::env::var("REFRAME_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            reframe_config_path: std::env::var("REFRAME_CONFIG").ok().map(PathBuf::from),
            metrics_out: std::env::var("REFRAME_METRICS_OUT").ok().map(PathBuf::from),
        }
    }

    /// Path of the label file for `frame_index`.
    pub fn label_path(&self, frame_index: u64) -> PathBuf {
        label_path(&self.labels_dir, &self.label_prefix, frame_index)
    }

    /// Resolve the reframing config: JSON file (if any), then overrides.
    pub async fn load_reframe_config(&self) -> WorkerResult<ReframeConfig> {
        let mut config = match &self.reframe_config_path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                serde_json::from_str::<ReframeConfig>(&raw)?
            }
            None => ReframeConfig::default(),
        };

        if let Some(aspect) = self.aspect_ratio {
            config.crop.aspect_ratio = aspect;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.segmenter.min_confidence = min_confidence;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values the planner cannot recover from.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(WorkerError::config_error(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if self.label_prefix.is_empty() {
            return Err(WorkerError::config_error("label prefix must not be empty"));
        }
        Ok(())
    }
}

/// `{dir}/{prefix}_{frame}.txt`
pub fn label_path(dir: &Path, prefix: &str, frame_index: u64) -> PathBuf {
    dir.join(format!("{}_{}.txt", prefix, frame_index))
}
