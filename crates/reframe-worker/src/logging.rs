//! Structured run logging.
//!
//! Every run gets a v4 UUID carried on a tracing span and on each lifecycle
//! event, so logs of concurrent runs can be told apart.

use reframe_models::{PlanMode, PlannedScene};
use tracing::{info, warn, Span};
use uuid::Uuid;

/// Logger for one planning run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: Uuid,
    mode: PlanMode,
}

impl RunLogger {
    /// Create a logger with a fresh run id.
    pub fn new(mode: PlanMode) -> Self {
        Self::with_run_id(Uuid::new_v4(), mode)
    }

    pub fn with_run_id(run_id: Uuid, mode: PlanMode) -> Self {
        Self { run_id, mode }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    /// Log the start of the run.
    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, mode = %self.mode, "Run started: {}", message);
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, mode = %self.mode, "Run progress: {}", message);
    }

    /// Log a warning.
    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, mode = %self.mode, "Run warning: {}", message);
    }

    /// Log a closed scene as `frames a-b (duration n frames)`.
    pub fn log_scene(&self, scene: &PlannedScene) {
        info!(
            run_id = %self.run_id,
            scene = scene.index,
            crop = %scene.crop,
            "Scene {}: frames {}-{} (duration {} frames)",
            scene.index + 1,
            scene.start_frame,
            scene.end_frame,
            scene.duration_frames()
        );
    }

    /// Log the completion of the run.
    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, mode = %self.mode, "Run completed: {}", message);
    }

    /// Tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, mode = %self.mode)
    }
}
