//! Scene segments produced by temporal segmentation.

use crate::detection::Detection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One subject observation inside a scene, in normalized center form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneSample {
    /// Frame the observation came from
    pub frame_index: u64,
    /// Center x (0-1)
    pub cx: f64,
    /// Center y (0-1)
    pub cy: f64,
    /// Width as fraction of frame width
    pub width: f64,
    /// Height as fraction of frame height
    pub height: f64,
    /// Detector confidence for this observation
    pub score: f32,
}

impl SceneSample {
    /// Create a sample from normalized center-form values.
    pub fn new(frame_index: u64, cx: f64, cy: f64, width: f64, height: f64, score: f32) -> Self {
        Self {
            frame_index,
            cx,
            cy,
            width,
            height,
            score,
        }
    }

    /// Build a sample from a detection.
    pub fn from_detection(frame_index: u64, detection: &Detection) -> Self {
        let (cx, cy) = detection.bbox.center();
        Self {
            frame_index,
            cx: cx as f64,
            cy: cy as f64,
            width: detection.bbox.width() as f64,
            height: detection.bbox.height() as f64,
            score: detection.score,
        }
    }

    /// Pixel corners `(left, top, right, bottom)` for the given frame size.
    pub fn pixel_corners(&self, frame_width: u32, frame_height: u32) -> (f64, f64, f64, f64) {
        let abs_cx = self.cx * frame_width as f64;
        let abs_cy = self.cy * frame_height as f64;
        let abs_w = self.width * frame_width as f64;
        let abs_h = self.height * frame_height as f64;
        (
            abs_cx - abs_w / 2.0,
            abs_cy - abs_h / 2.0,
            abs_cx + abs_w / 2.0,
            abs_cy + abs_h / 2.0,
        )
    }
}

/// A maximal run of frames in which the subject is considered present.
///
/// `end_frame` is inclusive. Samples are ordered by strictly increasing frame
/// index and are never empty for segments produced by the segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneSegment {
    /// First frame of the scene
    pub start_frame: u64,
    /// Last frame of the scene (inclusive)
    pub end_frame: u64,
    /// Subject observations in frame order
    pub samples: Vec<SceneSample>,
}

impl SceneSegment {
    /// Open a segment from its first observation.
    pub fn open(sample: SceneSample) -> Self {
        Self {
            start_frame: sample.frame_index,
            end_frame: sample.frame_index,
            samples: vec![sample],
        }
    }

    /// Extend the segment with an observation at a later frame.
    pub fn extend(&mut self, sample: SceneSample) {
        self.end_frame = sample.frame_index;
        self.samples.push(sample);
    }

    /// Whether `frame_index` lies inside the scene.
    #[inline]
    pub fn contains(&self, frame_index: u64) -> bool {
        self.start_frame <= frame_index && frame_index <= self.end_frame
    }

    /// Number of frames spanned, gap frames included.
    pub fn duration_frames(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_extend() {
        let mut segment = SceneSegment::open(SceneSample::new(4, 0.5, 0.5, 0.1, 0.1, 0.9));
        assert_eq!(segment.start_frame, 4);
        assert_eq!(segment.end_frame, 4);

        segment.extend(SceneSample::new(7, 0.6, 0.5, 0.1, 0.1, 0.9));
        assert_eq!(segment.end_frame, 7);
        assert_eq!(segment.samples.len(), 2);
        assert_eq!(segment.duration_frames(), 4);
        assert!(segment.contains(5));
        assert!(!segment.contains(8));
    }

    #[test]
    fn test_pixel_corners() {
        let sample = SceneSample::new(0, 0.5, 0.25, 0.2, 0.1, 1.0);
        let (l, t, r, b) = sample.pixel_corners(1000, 1000);
        assert!((l - 400.0).abs() < 1e-9);
        assert!((t - 200.0).abs() < 1e-9);
        assert!((r - 600.0).abs() < 1e-9);
        assert!((b - 300.0).abs() < 1e-9);
    }
}
