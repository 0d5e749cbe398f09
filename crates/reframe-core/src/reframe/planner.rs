//! Scene-based crop planning.
//!
//! Pass 1 runs every frame's detections through the [`SceneSegmenter`];
//! pass 2 replays frame indices and assigns each frame the crop of the scene
//! containing it, or the full frame outside scenes.

use super::aggregator::SceneBoundsAggregator;
use super::crop_calculator::CropCalculator;
use super::segmenter::SceneSegmenter;
use crate::config::ReframeConfig;
use crate::error::ReframeResult;
use crate::metrics;
use reframe_models::{DetectionSet, FrameCrop, FrameDecision, PlanMode, PlannedScene, SceneSegment};
use std::time::Instant;
use tracing::{debug, info};

/// Two-pass planner for one video.
#[derive(Debug, Clone)]
pub struct ScenePlanner {
    config: ReframeConfig,
    aggregator: SceneBoundsAggregator,
    calculator: CropCalculator,
}

impl ScenePlanner {
    /// Create a planner for frames of the given size.
    pub fn new(config: ReframeConfig, frame_width: u32, frame_height: u32) -> ReframeResult<Self> {
        config.validate()?;
        let calculator = CropCalculator::new(frame_width, frame_height, config.crop.clone())?;
        let aggregator = SceneBoundsAggregator::new(config.aggregator.clone(), frame_width, frame_height);

        if config.double_expands_scenes() {
            debug!(
                aggregator_ratio = config.aggregator.expansion_ratio,
                crop_ratio = config.crop.expansion_ratio,
                "Scene regions are expanded by both the aggregator and the crop calculator"
            );
        }

        Ok(Self {
            config,
            aggregator,
            calculator,
        })
    }

    pub fn config(&self) -> &ReframeConfig {
        &self.config
    }

    /// Pass 1: segment the whole video into scenes.
    pub fn segment<'a, I>(&self, sets: I) -> Vec<SceneSegment>
    where
        I: IntoIterator<Item = &'a DetectionSet>,
    {
        let mut segmenter = SceneSegmenter::new(self.config.segmenter.clone());
        for set in sets {
            segmenter.process_set(set);
        }
        segmenter.finalize()
    }

    /// Aggregate one closed scene and compute its crop.
    pub fn plan_scene(&self, index: usize, segment: &SceneSegment) -> ReframeResult<PlannedScene> {
        let region = self.aggregator.aggregate(segment)?;
        let crop = self.calculator.compute(&region);
        Ok(PlannedScene::new(index, segment, region, crop))
    }

    /// Aggregate every closed scene.
    pub fn plan_scenes(&self, segments: &[SceneSegment]) -> ReframeResult<Vec<PlannedScene>> {
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| self.plan_scene(i, segment))
            .collect()
    }

    /// Run both passes over `frame_count` frames.
    pub fn plan<'a, I>(&self, sets: I, frame_count: u64) -> ReframeResult<ReframePlan>
    where
        I: IntoIterator<Item = &'a DetectionSet>,
    {
        let started = Instant::now();
        let segments = self.segment(sets);
        let scenes = self.plan_scenes(&segments)?;

        for scene in &scenes {
            debug!(
                scene = scene.index,
                start_frame = scene.start_frame,
                end_frame = scene.end_frame,
                crop = %scene.crop,
                "Planned scene"
            );
        }

        let plan = ReframePlan::new(scenes, frame_count);
        let cropped = plan.cropped_frame_count();
        metrics::record_frames_planned(PlanMode::Scenes.as_str(), frame_count, cropped);
        metrics::record_planning_duration(PlanMode::Scenes.as_str(), started.elapsed().as_secs_f64());

        info!(
            scenes = plan.scenes.len(),
            frames = frame_count,
            cropped_frames = cropped,
            "Scene plan ready"
        );
        Ok(plan)
    }
}

/// Scenes with their crops, queryable per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ReframePlan {
    scenes: Vec<PlannedScene>,
    frame_count: u64,
}

impl ReframePlan {
    /// Scenes must be chronological and non-overlapping.
    pub fn new(scenes: Vec<PlannedScene>, frame_count: u64) -> Self {
        Self { scenes, frame_count }
    }

    pub fn scenes(&self) -> &[PlannedScene] {
        &self.scenes
    }

    pub fn into_scenes(self) -> Vec<PlannedScene> {
        self.scenes
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Scene containing `frame_index`, if any.
    pub fn scene_for(&self, frame_index: u64) -> Option<&PlannedScene> {
        let idx = self.scenes.partition_point(|s| s.end_frame < frame_index);
        self.scenes
            .get(idx)
            .filter(|s| s.start_frame <= frame_index)
    }

    /// Pass 2 decision for one frame.
    pub fn decision_for(&self, frame_index: u64) -> FrameDecision {
        match self.scene_for(frame_index) {
            Some(scene) => FrameDecision::Crop(scene.crop),
            None => FrameDecision::FullFrame,
        }
    }

    /// Decisions for every frame in order.
    pub fn decisions(&self) -> impl Iterator<Item = FrameCrop> + '_ {
        (0..self.frame_count).map(move |frame_index| FrameCrop {
            frame_index,
            decision: self.decision_for(frame_index),
        })
    }

    /// Number of frames inside a scene.
    pub fn cropped_frame_count(&self) -> u64 {
        self.scenes
            .iter()
            .filter(|s| s.start_frame < self.frame_count)
            .map(|s| s.end_frame.min(self.frame_count - 1) - s.start_frame + 1)
            .sum()
    }
}

/// Online planner: emits each scene's crop as soon as the scene closes.
///
/// A scene closes at most `max_gap_frames + 1` frames after its last
/// observation, so callers need to buffer no more than that many frames
/// before their decision is known.
#[derive(Debug)]
pub struct StreamingScenePlanner {
    planner: ScenePlanner,
    segmenter: SceneSegmenter,
    emitted: usize,
}

impl StreamingScenePlanner {
    pub fn new(planner: ScenePlanner) -> Self {
        let segmenter = SceneSegmenter::new(planner.config.segmenter.clone());
        Self {
            planner,
            segmenter,
            emitted: 0,
        }
    }

    /// Feed one frame; returns the scene it closed, if any.
    pub fn push(&mut self, set: &DetectionSet) -> ReframeResult<Option<PlannedScene>> {
        match self.segmenter.process_set(set) {
            Some(segment) => {
                let scene = self.planner.plan_scene(self.emitted, segment)?;
                self.emitted += 1;
                Ok(Some(scene))
            }
            None => Ok(None),
        }
    }

    /// Close any open scene; returns it if there was one.
    pub fn finish(self) -> ReframeResult<Option<PlannedScene>> {
        let closed_before = self.segmenter.scenes().len();
        let scenes = self.segmenter.finalize();
        match scenes.get(closed_before) {
            Some(segment) => Ok(Some(self.planner.plan_scene(self.emitted, segment)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::{CropWindow, Detection};

    fn sets(pattern: &[bool]) -> Vec<DetectionSet> {
        pattern
            .iter()
            .enumerate()
            .map(|(i, &present)| {
                let detections = if present {
                    vec![Detection::from_center(0.5, 0.5, 0.1, 0.1, 0, 0.9)]
                } else {
                    Vec::new()
                };
                DetectionSet::new(i as u64, detections)
            })
            .collect()
    }

    #[test]
    fn test_plan_assigns_scene_crops() {
        let planner = ScenePlanner::new(ReframeConfig::default(), 1920, 1080).unwrap();
        let pattern = [false, true, true, false, false, false, false, false, true, true];
        let plan = planner.plan(&sets(&pattern), 12).unwrap();

        assert_eq!(plan.scenes().len(), 2);
        assert_eq!(plan.decision_for(0), FrameDecision::FullFrame);
        assert!(!plan.decision_for(1).is_full_frame());
        assert_eq!(plan.decision_for(2), plan.decision_for(1));
        assert_eq!(plan.decision_for(5), FrameDecision::FullFrame);
        assert!(!plan.decision_for(9).is_full_frame());
        assert_eq!(plan.decision_for(11), FrameDecision::FullFrame);

        let decisions: Vec<FrameCrop> = plan.decisions().collect();
        assert_eq!(decisions.len(), 12);
        assert_eq!(plan.cropped_frame_count(), 4);
    }

    #[test]
    fn test_scene_crop_is_stable_and_in_bounds() {
        let planner = ScenePlanner::new(ReframeConfig::default(), 1920, 1080).unwrap();
        let plan = planner.plan(&sets(&[true; 6]), 6).unwrap();
        let crops: Vec<CropWindow> = plan.decisions().filter_map(|f| f.decision.crop().copied()).collect();
        assert_eq!(crops.len(), 6);
        assert!(crops.windows(2).all(|w| w[0] == w[1]));
        assert!(crops[0].is_within(1920, 1080));
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(ScenePlanner::new(ReframeConfig::default(), 0, 1080).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ReframeConfig::default();
        config.smoothing.window_size = 0;
        assert!(ScenePlanner::new(config, 1920, 1080).is_err());
    }

    #[test]
    fn test_streaming_emits_scene_on_close() {
        let planner = ScenePlanner::new(ReframeConfig::default(), 1920, 1080).unwrap();
        let mut streaming = StreamingScenePlanner::new(planner);
        let frames = sets(&[true, true, false, false, false, false, true]);

        let mut emitted_at = Vec::new();
        for set in &frames {
            if let Some(scene) = streaming.push(set).unwrap() {
                emitted_at.push((set.frame_index, scene.index, scene.end_frame));
            }
        }
        // closed on the 4th absent frame
        assert_eq!(emitted_at, vec![(5, 0, 1)]);

        let last = streaming.finish().unwrap().unwrap();
        assert_eq!((last.index, last.start_frame, last.end_frame), (1, 6, 6));
    }

    #[test]
    fn test_streaming_finish_without_open_scene() {
        let planner = ScenePlanner::new(ReframeConfig::default(), 1920, 1080).unwrap();
        let mut streaming = StreamingScenePlanner::new(planner);
        for set in &sets(&[false, false]) {
            assert!(streaming.push(set).unwrap().is_none());
        }
        assert!(streaming.finish().unwrap().is_none());
    }
}
