//! Configuration for the reframing pipeline.
//!
//! Every stage has its own section so deployments can tune decode, suppression,
//! segmentation and framing independently.

use crate::detection::strategy::DecodeStrategy;
use crate::error::{ReframeError, ReframeResult};
use reframe_models::AspectRatio;
use serde::{Deserialize, Serialize};

/// Configuration for the whole reframing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReframeConfig {
    pub decoder: DecoderConfig,
    pub nms: NmsConfig,
    pub segmenter: SegmenterConfig,
    pub aggregator: AggregatorConfig,
    pub crop: CropConfig,
    pub smoothing: SmoothingConfig,
}

/// Anchor priors for one stride level of the detector head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrideLevel {
    /// Downsampling factor between model input and this grid
    pub stride: u32,
    /// Anchor `[width, height]` priors in model-input pixels
    pub anchors: Vec<[f32; 2]>,
}

impl StrideLevel {
    /// Create a stride level.
    pub fn new(stride: u32, anchors: Vec<[f32; 2]>) -> Self {
        Self { stride, anchors }
    }

    /// Number of anchors per grid cell.
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

/// Raw detector output decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Box decoding convention of the detector head (default: YOLOv5)
    pub strategy: DecodeStrategy,

    /// Square model input dimension in pixels (default: 640)
    pub input_size: u32,

    /// Number of classes predicted per anchor (default: 2)
    pub num_classes: usize,

    /// Stride levels with their anchors (default: YOLOv5 P3/P4/P5)
    pub levels: Vec<StrideLevel>,

    /// Objectness/class channels already went through a sigmoid on device (default: false)
    pub outputs_activated: bool,

    /// Raw values are clamped to `[-logit_clamp, logit_clamp]` before sigmoid/exp (default: 50.0)
    pub logit_clamp: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strategy: DecodeStrategy::YoloV5,
            input_size: 640,
            num_classes: 2,
            levels: vec![
                StrideLevel::new(8, vec![[10.0, 13.0], [16.0, 30.0], [33.0, 23.0]]),
                StrideLevel::new(16, vec![[30.0, 61.0], [62.0, 45.0], [59.0, 119.0]]),
                StrideLevel::new(32, vec![[116.0, 90.0], [156.0, 198.0], [373.0, 326.0]]),
            ],
            outputs_activated: false,
            logit_clamp: 50.0,
        }
    }
}

/// Non-maximum suppression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsConfig {
    /// Minimum candidate confidence (default: 0.3)
    pub score_threshold: f32,

    /// Overlap above which the weaker box is dropped (default: 0.45)
    pub iou_threshold: f32,

    /// Maximum detections kept per frame (default: 100)
    pub max_detections: usize,

    /// Let boxes of different classes suppress each other (default: false)
    pub class_agnostic: bool,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.3,
            iou_threshold: 0.45,
            max_detections: 100,
            class_agnostic: false,
        }
    }
}

/// Temporal scene segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Class id of the tracked subject (default: 0)
    pub subject_class: u32,

    /// Minimum score for a detection to count as "present" (default: 0.85)
    pub min_confidence: f32,

    /// Absent frames tolerated before a scene is closed (default: 3)
    pub max_gap_frames: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            subject_class: 0,
            min_confidence: 0.85,
            max_gap_frames: 3,
        }
    }
}

/// Per-scene bounds aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Growth of the union box per axis, as a fraction of its extent (default: 0.08)
    pub expansion_ratio: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            expansion_ratio: 0.08,
        }
    }
}

/// What to do when the aspect-locked crop exceeds the frame on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Use the frame half containing the subject on each axis
    #[default]
    HalfFrame,
    /// Use the whole frame
    FullFrame,
}

/// How a crop that crosses a frame edge is brought back inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Cut the window at the frame edge
    #[default]
    Clip,
    /// Slide the window back inside, keeping its size
    Shift,
}

/// Aspect-locked crop window computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Output aspect ratio (default: 16:9)
    pub aspect_ratio: AspectRatio,

    /// Growth of the subject box per axis before sizing the crop (default: 0.08)
    pub expansion_ratio: f64,

    /// Expand regions that were already expanded by the scene aggregator (default: true)
    pub reexpand_aggregated: bool,

    /// Behavior when the crop is larger than the frame on both axes
    pub oversize_policy: OversizePolicy,

    /// Behavior when the crop crosses a frame edge
    pub edge_policy: EdgePolicy,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::LANDSCAPE,
            expansion_ratio: 0.08,
            reexpand_aggregated: true,
            oversize_policy: OversizePolicy::HalfFrame,
            edge_policy: EdgePolicy::Clip,
        }
    }
}

/// Position smoothing for direct mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of recent centers averaged (default: 5)
    pub window_size: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

impl ReframeConfig {
    /// Conservative configuration: only very confident detections open scenes.
    pub fn broadcast() -> Self {
        Self::default()
    }

    /// Permissive configuration for weaker detectors or harder footage.
    pub fn permissive() -> Self {
        Self {
            segmenter: SegmenterConfig {
                min_confidence: 0.5,
                max_gap_frames: 5,
                ..Default::default()
            },
            nms: NmsConfig {
                score_threshold: 0.25,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Vertical output (9:16) for short-form platforms.
    pub fn portrait() -> Self {
        Self {
            crop: CropConfig {
                aspect_ratio: AspectRatio::PORTRAIT,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Whether scene crops are expanded both by the aggregator and the calculator.
    pub fn double_expands_scenes(&self) -> bool {
        self.aggregator.expansion_ratio > 0.0
            && self.crop.expansion_ratio > 0.0
            && self.crop.reexpand_aggregated
    }

    /// Validate configuration.
    pub fn validate(&self) -> ReframeResult<()> {
        let d = &self.decoder;
        if d.input_size == 0 {
            return Err(ReframeError::invalid_config("decoder.input_size must be > 0"));
        }
        if d.num_classes == 0 {
            return Err(ReframeError::invalid_config("decoder.num_classes must be > 0"));
        }
        if d.levels.is_empty() {
            return Err(ReframeError::invalid_config("decoder.levels must not be empty"));
        }
        for level in &d.levels {
            if level.stride == 0 || level.anchors.is_empty() {
                return Err(ReframeError::invalid_config(format!(
                    "stride level {} needs a non-zero stride and at least one anchor",
                    level.stride
                )));
            }
            if d.input_size % level.stride != 0 {
                return Err(ReframeError::invalid_config(format!(
                    "input size {} is not a multiple of stride {}",
                    d.input_size, level.stride
                )));
            }
        }
        if !(d.logit_clamp.is_finite() && d.logit_clamp > 0.0) {
            return Err(ReframeError::invalid_config("decoder.logit_clamp must be positive"));
        }

        if !(0.0..=1.0).contains(&self.nms.score_threshold) {
            return Err(ReframeError::invalid_config("nms.score_threshold must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.nms.iou_threshold) {
            return Err(ReframeError::invalid_config("nms.iou_threshold must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.segmenter.min_confidence) {
            return Err(ReframeError::invalid_config("segmenter.min_confidence must be in [0, 1]"));
        }
        if !(self.aggregator.expansion_ratio >= 0.0 && self.aggregator.expansion_ratio.is_finite()) {
            return Err(ReframeError::invalid_config("aggregator.expansion_ratio must be >= 0"));
        }
        if !(self.crop.expansion_ratio >= 0.0 && self.crop.expansion_ratio.is_finite()) {
            return Err(ReframeError::invalid_config("crop.expansion_ratio must be >= 0"));
        }
        if self.crop.aspect_ratio.width == 0 || self.crop.aspect_ratio.height == 0 {
            return Err(ReframeError::invalid_config("crop.aspect_ratio cannot have zero values"));
        }
        if self.smoothing.window_size == 0 {
            return Err(ReframeError::invalid_config("smoothing.window_size must be > 0"));
        }
        Ok(())
    }
}
