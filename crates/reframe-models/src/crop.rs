//! Subject regions, crop windows and per-frame crop decisions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject focus region in absolute pixel coordinates.
///
/// `expanded` records whether a margin has already been added (the scene
/// aggregator does this), so the crop calculator can decide whether to expand
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubjectRegion {
    /// Center x-coordinate
    pub cx: f64,
    /// Center y-coordinate
    pub cy: f64,
    /// Region width
    pub width: f64,
    /// Region height
    pub height: f64,
    /// Whether the expansion margin is already included
    pub expanded: bool,
}

impl SubjectRegion {
    /// Create a raw (unexpanded) region.
    pub fn new(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
            expanded: false,
        }
    }

    /// Create a region that already carries its margin.
    pub fn pre_expanded(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            expanded: true,
            ..Self::new(cx, cy, width, height)
        }
    }

    /// Same region re-centered on another point.
    pub fn recentered(&self, cx: f64, cy: f64) -> Self {
        Self { cx, cy, ..*self }
    }
}

/// Integer crop rectangle in source-frame pixels.
///
/// Invariant (enforced by the crop calculator):
/// `x1 < x2 <= frame_width` and `y1 < y2 <= frame_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CropWindow {
    /// Left edge
    pub x1: u32,
    /// Top edge
    pub y1: u32,
    /// Right edge (exclusive)
    pub x2: u32,
    /// Bottom edge (exclusive)
    pub y2: u32,
}

impl CropWindow {
    /// Create a new crop window.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Window covering the whole frame.
    pub fn full_frame(frame_width: u32, frame_height: u32) -> Self {
        Self::new(0, 0, frame_width, frame_height)
    }

    /// Crop width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Crop height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Whether the window lies inside a frame of the given size and is non-empty.
    pub fn is_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2 && self.x2 <= frame_width && self.y2 <= frame_height
    }

    /// FFmpeg crop filter expression (`crop=w:h:x:y`).
    pub fn to_ffmpeg_filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.width(),
            self.height(),
            self.x1,
            self.y1
        )
    }
}

impl fmt::Display for CropWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// What the resample stage should do with one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameDecision {
    /// Crop to the window, then scale to the output resolution
    Crop(CropWindow),
    /// Scale the whole frame unchanged
    FullFrame,
}

impl FrameDecision {
    /// The crop window, if this frame is cropped.
    pub fn crop(&self) -> Option<&CropWindow> {
        match self {
            FrameDecision::Crop(window) => Some(window),
            FrameDecision::FullFrame => None,
        }
    }

    /// Whether the frame is passed through uncropped.
    pub fn is_full_frame(&self) -> bool {
        matches!(self, FrameDecision::FullFrame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dimensions_and_filter() {
        let window = CropWindow::new(864, 486, 1056, 594);
        assert_eq!(window.width(), 192);
        assert_eq!(window.height(), 108);
        assert_eq!(window.to_ffmpeg_filter(), "crop=192:108:864:486");
        assert!(window.is_within(1920, 1080));
        assert!(!window.is_within(1000, 500));
    }

    #[test]
    fn test_decision_serialization() {
        let crop = FrameDecision::Crop(CropWindow::new(0, 0, 960, 540));
        let json = serde_json::to_value(crop).unwrap();
        assert_eq!(json["kind"], "crop");
        assert_eq!(json["x2"], 960);

        let full = serde_json::to_value(FrameDecision::FullFrame).unwrap();
        assert_eq!(full["kind"], "full_frame");

        let back: FrameDecision = serde_json::from_value(json).unwrap();
        assert_eq!(back, crop);
    }

    #[test]
    fn test_region_recentered_keeps_flags() {
        let region = SubjectRegion::pre_expanded(10.0, 20.0, 30.0, 40.0).recentered(1.0, 2.0);
        assert_eq!(region.cx, 1.0);
        assert_eq!(region.cy, 2.0);
        assert_eq!(region.width, 30.0);
        assert!(region.expanded);
    }
}
