//! Detections and per-frame detection sets.

use crate::geometry::NormalizedBox;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single detected object in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Box in normalized corner form
    pub bbox: NormalizedBox,
    /// Class index reported by the detector
    pub class_id: u32,
    /// Detection confidence score (0.0-1.0)
    pub score: f32,
}

impl Detection {
    /// Create a new detection.
    pub fn new(bbox: NormalizedBox, class_id: u32, score: f32) -> Self {
        Self {
            bbox,
            class_id,
            score,
        }
    }

    /// Create from the YOLO label convention `(cx, cy, w, h)`.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32, class_id: u32, score: f32) -> Self {
        Self::new(NormalizedBox::from_center(cx, cy, w, h), class_id, score)
    }
}

/// All detections retained for one frame, ordered by descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionSet {
    /// Zero-based frame index
    pub frame_index: u64,
    /// Detections in this frame
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    /// Create a detection set for a frame.
    pub fn new(frame_index: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame_index,
            detections,
        }
    }

    /// An empty set, used when a frame had no usable detector output.
    pub fn empty(frame_index: u64) -> Self {
        Self::new(frame_index, Vec::new())
    }

    /// Whether the frame has no detections.
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Highest-scoring detection of `class_id` whose score is at least `min_score`.
    ///
    /// Ties keep the earliest detection.
    pub fn best_of_class(&self, class_id: u32, min_score: f32) -> Option<&Detection> {
        self.detections
            .iter()
            .filter(|d| d.class_id == class_id && d.score >= min_score)
            .fold(None, |best: Option<&Detection>, d| match best {
                Some(b) if b.score >= d.score => Some(b),
                _ => Some(d),
            })
    }
}
