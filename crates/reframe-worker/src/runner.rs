//! One planning run: labels in, crop plan out.

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::labels::LabelSource;
use crate::logging::RunLogger;
use crate::metrics;
use chrono::Utc;
use reframe_core::{DirectReframer, ReframeConfig, ScenePlanner};
use reframe_models::{CropPlan, DetectionSet, PlanMode};
use tracing::Instrument;
use uuid::Uuid;

/// Build a crop plan from loaded detection sets.
///
/// Pure CPU work; the runner calls it on the blocking pool.
pub fn build_plan(
    run_id: Uuid,
    mode: PlanMode,
    reframe: &ReframeConfig,
    frame_width: u32,
    frame_height: u32,
    sets: &[DetectionSet],
    frame_count: u64,
) -> WorkerResult<CropPlan> {
    let (scenes, frames) = match mode {
        PlanMode::Scenes => {
            let planner = ScenePlanner::new(reframe.clone(), frame_width, frame_height)?;
            let plan = planner.plan(sets, frame_count)?;
            let frames = plan.decisions().collect();
            (plan.into_scenes(), frames)
        }
        PlanMode::Direct => {
            let mut reframer = DirectReframer::new(reframe, frame_width, frame_height)?;
            (Vec::new(), reframer.plan(sets, frame_count))
        }
    };

    Ok(CropPlan {
        run_id,
        generated_at: Utc::now(),
        mode,
        frame_width,
        frame_height,
        aspect_ratio: reframe.crop.aspect_ratio,
        frame_count,
        scenes,
        frames,
    })
}

/// Runs one labels-to-plan job.
#[derive(Debug, Clone)]
pub struct ReframeRunner {
    config: WorkerConfig,
    reframe: ReframeConfig,
    labels: LabelSource,
    logger: RunLogger,
}

impl ReframeRunner {
    /// Create a runner, loading the reframing config the worker points at.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let reframe = config.load_reframe_config().await?;
        Self::with_reframe_config(config, reframe)
    }

    /// Create a runner with an explicit reframing config.
    pub fn with_reframe_config(config: WorkerConfig, reframe: ReframeConfig) -> WorkerResult<Self> {
        config.validate()?;
        reframe.validate()?;
        let labels = LabelSource::new(config.labels_dir.clone(), config.label_prefix.clone());
        let logger = RunLogger::new(config.mode);
        Ok(Self {
            config,
            reframe,
            labels,
            logger,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.logger.run_id()
    }

    pub fn reframe_config(&self) -> &ReframeConfig {
        &self.reframe
    }

    /// Configured frame count, or highest labelled frame + 1.
    pub async fn resolve_frame_count(&self) -> WorkerResult<u64> {
        if let Some(count) = self.config.frame_count {
            return Ok(count);
        }
        match self.labels.max_frame_index().await? {
            Some(max) => Ok(max + 1),
            None => Err(WorkerError::NoLabels(self.labels.dir().to_path_buf())),
        }
    }

    /// Load labels and build the plan.
    pub async fn plan(&self) -> WorkerResult<CropPlan> {
        let span = self.logger.create_span();
        async {
            self.logger.log_start(&format!("labels from {}", self.labels.dir().display()));

            let frame_count = self.resolve_frame_count().await?;
            let sets = self.labels.load_all(frame_count).await;
            let with_detections = sets.iter().filter(|s| !s.is_empty()).count();
            if with_detections == 0 {
                self.logger.log_warning("no detections in any frame, every frame stays uncropped");
            }
            self.logger.log_progress(&format!(
                "{} frames loaded, {} with detections",
                frame_count, with_detections
            ));

            let run_id = self.run_id();
            let mode = self.config.mode;
            let reframe = self.reframe.clone();
            let (width, height) = (self.config.frame_width, self.config.frame_height);
            let plan = tokio::task::spawn_blocking(move || {
                build_plan(run_id, mode, &reframe, width, height, &sets, frame_count)
            })
            .await
            .map_err(|e| WorkerError::planning_failed(e.to_string()))??;

            for scene in &plan.scenes {
                self.logger.log_scene(scene);
            }
            Ok::<_, WorkerError>(plan)
        }
        .instrument(span)
        .await
    }

    /// Build the plan and write it as JSON to the configured output path.
    pub async fn run(&self) -> WorkerResult<CropPlan> {
        let result = self.plan_and_write().await;
        metrics::record_run(self.config.mode.as_str(), result.is_ok());
        result
    }

    async fn plan_and_write(&self) -> WorkerResult<CropPlan> {
        let plan = self.plan().await?;

        let output = &self.config.output_path;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, serde_json::to_vec_pretty(&plan)?).await?;

        self.logger.log_completion(&format!(
            "{} scenes, {}/{} frames cropped, plan written to {}",
            plan.scenes.len(),
            plan.cropped_frame_count(),
            plan.frame_count,
            output.display()
        ));
        Ok(plan)
    }
}
