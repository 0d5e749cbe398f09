//! Normalized box geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in corner form, normalized to the `[0, 1]` frame range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedBox {
    /// Left edge (0 = left, 1 = right)
    pub x1: f32,
    /// Top edge (0 = top, 1 = bottom)
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl NormalizedBox {
    /// Create a box from corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from center form `(cx, cy, w, h)`.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
        }
    }

    /// Box width.
    #[inline]
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Box height.
    #[inline]
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Box area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Clip the box into the unit square.
    ///
    /// Corners are clipped independently and then ordered, so the result
    /// always satisfies `0 <= x1 <= x2 <= 1` and `0 <= y1 <= y2 <= 1`.
    pub fn clipped(&self) -> Self {
        let clip = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let x1 = clip(self.x1);
        let y1 = clip(self.y1);
        let x2 = clip(self.x2);
        let y2 = clip(self.y2);
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Compute Intersection over Union with another box.
    ///
    /// Disjoint boxes (and degenerate unions) yield `0.0`.
    pub fn iou(&self, other: &NormalizedBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Convert to pixel corners `(left, top, right, bottom)`.
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> (f64, f64, f64, f64) {
        let w = frame_width as f64;
        let h = frame_height as f64;
        (
            self.x1 as f64 * w,
            self.y1 as f64 * h,
            self.x2 as f64 * w,
            self.y2 as f64 * h,
        )
    }
}
