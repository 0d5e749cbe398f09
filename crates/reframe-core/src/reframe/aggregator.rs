//! Per-scene subject bounds.
//!
//! A closed scene gets one region covering every observation of the subject,
//! so every frame of the scene shares the same crop.

use super::truncate_px;
use crate::config::AggregatorConfig;
use crate::error::{ReframeError, ReframeResult};
use reframe_models::{SceneSegment, SubjectRegion};

/// Pixel-space union of a scene's samples: `(left, top, right, bottom)`.
pub type PixelBounds = (f64, f64, f64, f64);

/// Computes the stable region of a closed scene.
#[derive(Debug, Clone)]
pub struct SceneBoundsAggregator {
    config: AggregatorConfig,
    frame_width: u32,
    frame_height: u32,
}

impl SceneBoundsAggregator {
    pub fn new(config: AggregatorConfig, frame_width: u32, frame_height: u32) -> Self {
        Self {
            config,
            frame_width,
            frame_height,
        }
    }

    /// Union of all samples in absolute pixels, or `None` for an empty scene.
    pub fn union_bounds(&self, segment: &SceneSegment) -> Option<PixelBounds> {
        segment
            .samples
            .iter()
            .map(|s| s.pixel_corners(self.frame_width, self.frame_height))
            .reduce(|(l1, t1, r1, b1), (l2, t2, r2, b2)| (l1.min(l2), t1.min(t2), r1.max(r2), b1.max(b2)))
    }

    /// Aggregate a closed scene into one region.
    ///
    /// The union box grows by `expansion_ratio` of its extent on each axis
    /// (half on each side); center and size are truncated to whole pixels.
    pub fn aggregate(&self, segment: &SceneSegment) -> ReframeResult<SubjectRegion> {
        let (left, top, right, bottom) =
            self.union_bounds(segment)
                .ok_or(ReframeError::DegenerateSceneBounds {
                    start_frame: segment.start_frame,
                    end_frame: segment.end_frame,
                })?;

        let ratio = self.config.expansion_ratio;
        let pad_x = (right - left) * ratio / 2.0;
        let pad_y = (bottom - top) * ratio / 2.0;
        let (left, right) = (left - pad_x, right + pad_x);
        let (top, bottom) = (top - pad_y, bottom + pad_y);

        let cx = truncate_px((left + right) / 2.0);
        let cy = truncate_px((top + bottom) / 2.0);
        let width = truncate_px(right - left);
        let height = truncate_px(bottom - top);

        Ok(if ratio > 0.0 {
            SubjectRegion::pre_expanded(cx, cy, width, height)
        } else {
            SubjectRegion::new(cx, cy, width, height)
        })
    }
}
