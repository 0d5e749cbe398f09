//! Crop plan handed to the resample/encode stage.

use crate::aspect::AspectRatio;
use crate::crop::{CropWindow, FrameDecision, SubjectRegion};
use crate::scene::SceneSegment;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How the plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Two-pass: scenes are found first, then every frame of a scene shares one crop.
    #[default]
    Scenes,
    /// Single pass: each frame is cropped around its own (smoothed) detection.
    Direct,
}

impl PlanMode {
    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMode::Scenes => "scenes",
            PlanMode::Direct => "direct",
        }
    }
}

impl fmt::Display for PlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scenes" | "scene" => Ok(PlanMode::Scenes),
            "direct" => Ok(PlanMode::Direct),
            other => Err(format!("Unknown plan mode: {}", other)),
        }
    }
}

/// A closed scene together with its stable crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlannedScene {
    /// Position in the scene list
    pub index: usize,
    /// First frame of the scene
    pub start_frame: u64,
    /// Last frame of the scene (inclusive)
    pub end_frame: u64,
    /// Number of frames that contributed a detection
    pub sample_count: usize,
    /// Aggregated subject region for the whole scene
    pub region: SubjectRegion,
    /// Crop applied to every frame of the scene
    pub crop: CropWindow,
}

impl PlannedScene {
    /// Build a planned scene from a closed segment.
    pub fn new(index: usize, segment: &SceneSegment, region: SubjectRegion, crop: CropWindow) -> Self {
        Self {
            index,
            start_frame: segment.start_frame,
            end_frame: segment.end_frame,
            sample_count: segment.samples.len(),
            region,
            crop,
        }
    }

    /// Number of frames spanned.
    pub fn duration_frames(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }
}

/// Decision for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameCrop {
    /// Zero-based frame index
    pub frame_index: u64,
    /// What to do with the frame
    pub decision: FrameDecision,
}

/// Complete reframing plan for one video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CropPlan {
    /// Identifier of the processing run
    pub run_id: Uuid,
    /// When the plan was produced
    pub generated_at: DateTime<Utc>,
    /// How the plan was produced
    pub mode: PlanMode,
    /// Source frame width in pixels
    pub frame_width: u32,
    /// Source frame height in pixels
    pub frame_height: u32,
    /// Target aspect ratio of every crop
    pub aspect_ratio: AspectRatio,
    /// Number of frames covered
    pub frame_count: u64,
    /// Scenes found (empty in direct mode)
    pub scenes: Vec<PlannedScene>,
    /// One decision per frame, in frame order
    pub frames: Vec<FrameCrop>,
}

impl CropPlan {
    /// Number of frames that are cropped.
    pub fn cropped_frame_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| !f.decision.is_full_frame())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_mode_parse() {
        assert_eq!("scenes".parse::<PlanMode>().unwrap(), PlanMode::Scenes);
        assert_eq!("DIRECT".parse::<PlanMode>().unwrap(), PlanMode::Direct);
        assert!("other".parse::<PlanMode>().is_err());
    }

    #[test]
    fn test_plan_serializes_decisions() {
        let plan = CropPlan {
            run_id: Uuid::nil(),
            generated_at: Utc::now(),
            mode: PlanMode::Scenes,
            frame_width: 1920,
            frame_height: 1080,
            aspect_ratio: AspectRatio::LANDSCAPE,
            frame_count: 2,
            scenes: Vec::new(),
            frames: vec![
                FrameCrop {
                    frame_index: 0,
                    decision: FrameDecision::FullFrame,
                },
                FrameCrop {
                    frame_index: 1,
                    decision: FrameDecision::Crop(CropWindow::new(0, 0, 960, 540)),
                },
            ],
        };

        assert_eq!(plan.cropped_frame_count(), 1);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["mode"], "scenes");
        assert_eq!(json["aspect_ratio"]["width"], 16);
        assert_eq!(json["frames"][1]["decision"]["kind"], "crop");
    }
}
