//! Aspect-locked crop window computation.
//!
//! The calculator turns a subject region into an integer crop rectangle that
//! matches the target aspect ratio, contains the (expanded) subject and stays
//! inside the frame. It is shared by scene mode and direct mode.

use super::truncate_px;
use crate::config::{CropConfig, EdgePolicy, OversizePolicy};
use crate::error::{ReframeError, ReframeResult};
use reframe_models::{CropWindow, SubjectRegion};
use tracing::trace;

/// Which frame bounds the ideal crop exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCase {
    /// Crop fits on both axes
    Fits,
    /// Only the width exceeds the frame
    WidthOverflow,
    /// Only the height exceeds the frame
    HeightOverflow,
    /// Both dimensions exceed the frame
    BothOverflow,
}

impl BoundaryCase {
    fn classify(fits_width: bool, fits_height: bool) -> Self {
        match (fits_width, fits_height) {
            (true, true) => BoundaryCase::Fits,
            (false, true) => BoundaryCase::WidthOverflow,
            (true, false) => BoundaryCase::HeightOverflow,
            (false, false) => BoundaryCase::BothOverflow,
        }
    }
}

/// Computes crop windows for one frame size.
#[derive(Debug, Clone)]
pub struct CropCalculator {
    config: CropConfig,
    frame_width: u32,
    frame_height: u32,
}

impl CropCalculator {
    /// Create a calculator; both frame dimensions must be non-zero.
    pub fn new(frame_width: u32, frame_height: u32, config: CropConfig) -> ReframeResult<Self> {
        if frame_width == 0 || frame_height == 0 {
            return Err(ReframeError::InvalidFrameDimensions {
                width: frame_width,
                height: frame_height,
            });
        }
        Ok(Self {
            config,
            frame_width,
            frame_height,
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Crop window centered on the region's own center.
    pub fn compute(&self, region: &SubjectRegion) -> CropWindow {
        self.compute_detailed(region, None).0
    }

    /// Crop window centered on `center` when given (e.g. a smoothed center).
    pub fn compute_with_center(&self, region: &SubjectRegion, center: Option<(f64, f64)>) -> CropWindow {
        self.compute_detailed(region, center).0
    }

    /// Crop window plus the boundary case that produced it.
    pub fn compute_detailed(
        &self,
        region: &SubjectRegion,
        center: Option<(f64, f64)>,
    ) -> (CropWindow, BoundaryCase) {
        let (cx, cy) = center.unwrap_or((region.cx, region.cy));
        let (crop_w, crop_h) = self.crop_size(region);

        let fw = self.frame_width as f64;
        let fh = self.frame_height as f64;
        let case = BoundaryCase::classify(crop_w <= fw, crop_h <= fh);

        let centered_x = (cx - crop_w / 2.0, cx + crop_w / 2.0);
        let centered_y = (cy - crop_h / 2.0, cy + crop_h / 2.0);

        let ((x1, x2), (y1, y2)) = match case {
            BoundaryCase::Fits => (self.fit_axis(centered_x, fw), self.fit_axis(centered_y, fh)),
            BoundaryCase::WidthOverflow => ((0.0, fw), self.fit_axis(centered_y, fh)),
            BoundaryCase::HeightOverflow => (self.fit_axis(centered_x, fw), (0.0, fh)),
            BoundaryCase::BothOverflow => match self.config.oversize_policy {
                OversizePolicy::HalfFrame => (
                    half_containing(cx, self.frame_width),
                    half_containing(cy, self.frame_height),
                ),
                OversizePolicy::FullFrame => ((0.0, fw), (0.0, fh)),
            },
        };

        let (x1, x2) = clamp_span(x1, x2, self.frame_width);
        let (y1, y2) = clamp_span(y1, y2, self.frame_height);
        let window = CropWindow::new(x1, y1, x2, y2);

        trace!(?case, crop = %window, "Computed crop window");
        (window, case)
    }

    /// Aspect-locked crop size containing the expanded region.
    pub fn crop_size(&self, region: &SubjectRegion) -> (f64, f64) {
        let (w, h) = self.expanded_size(region);
        let aspect = self.config.aspect_ratio;
        if aspect.is_wider(w, h) {
            (w, aspect.height_for(w))
        } else {
            (aspect.width_for(h), h)
        }
    }

    /// Region size after the configured margin.
    ///
    /// Regions that already carry a margin are only expanded again when
    /// `reexpand_aggregated` is set.
    pub fn expanded_size(&self, region: &SubjectRegion) -> (f64, f64) {
        let w = region.width.max(0.0);
        let h = region.height.max(0.0);
        if region.expanded && !self.config.reexpand_aggregated {
            return (w, h);
        }
        let ratio = self.config.expansion_ratio;
        (w + w * ratio, h + h * ratio)
    }

    /// Bring a span that fits on its axis inside `[0, limit]`.
    fn fit_axis(&self, (lo, hi): (f64, f64), limit: f64) -> (f64, f64) {
        match self.config.edge_policy {
            EdgePolicy::Clip => (lo, hi),
            EdgePolicy::Shift if lo < 0.0 => (0.0, hi - lo),
            EdgePolicy::Shift if hi > limit => (lo - (hi - limit), limit),
            EdgePolicy::Shift => (lo, hi),
        }
    }
}

/// Frame half (`[0, n/2]` or `[n/2, n]`) containing `center`.
fn half_containing(center: f64, extent: u32) -> (f64, f64) {
    let half = (extent / 2) as f64;
    if center < half {
        (0.0, half)
    } else {
        (half, extent as f64)
    }
}

/// Truncate a span to whole pixels inside `[0, limit]`, at least 1 pixel wide.
fn clamp_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let limit = i64::from(limit);
    let lo = (truncate_px(lo) as i64).clamp(0, limit - 1);
    let hi = (truncate_px(hi) as i64).min(limit).max(lo + 1);
    (lo as u32, hi as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_models::AspectRatio;

    fn calculator(config: CropConfig) -> CropCalculator {
        CropCalculator::new(1920, 1080, config).unwrap()
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            CropCalculator::new(0, 1080, CropConfig::default()),
            Err(ReframeError::InvalidFrameDimensions { width: 0, height: 1080 })
        ));
        assert!(CropCalculator::new(1920, 0, CropConfig::default()).is_err());
    }

    #[test]
    fn test_case_fits_centered() {
        let calc = calculator(CropConfig::default());
        let region = SubjectRegion::new(960.0, 540.0, 100.0, 100.0);
        let (window, case) = calc.compute_detailed(&region, None);
        assert_eq!(case, BoundaryCase::Fits);
        // 108x108 expanded, height-driven: 192x108
        assert_eq!(window, CropWindow::new(864, 486, 1056, 594));
    }

    #[test]
    fn test_case_width_overflow() {
        let calc = calculator(CropConfig {
            aspect_ratio: AspectRatio::new(2, 1),
            ..Default::default()
        });
        let region = SubjectRegion::new(960.0, 600.0, 1850.0, 100.0);
        let (window, case) = calc.compute_detailed(&region, None);
        // 1998 x 999
        assert_eq!(case, BoundaryCase::WidthOverflow);
        assert_eq!((window.x1, window.x2), (0, 1920));
        // 600 - 499.5 = 100.5, 600 + 499.5 = 1099.5 -> clamped to 1080
        assert_eq!((window.y1, window.y2), (100, 1080));
    }

    #[test]
    fn test_case_height_overflow() {
        let config = CropConfig {
            aspect_ratio: AspectRatio::PORTRAIT,
            ..Default::default()
        };
        let calc = CropCalculator::new(1920, 1080, config).unwrap();
        let region = SubjectRegion::new(400.0, 540.0, 100.0, 1050.0);
        let (window, case) = calc.compute_detailed(&region, None);
        // 1134 tall, 637.875 wide
        assert_eq!(case, BoundaryCase::HeightOverflow);
        assert_eq!((window.y1, window.y2), (0, 1080));
        assert_eq!((window.x1, window.x2), (81, 718));
    }

    #[test]
    fn test_case_both_overflow_uses_half_frame() {
        let calc = calculator(CropConfig::default());
        let region = SubjectRegion::new(50.0, 50.0, 3000.0, 3000.0);
        let (window, case) = calc.compute_detailed(&region, None);
        assert_eq!(case, BoundaryCase::BothOverflow);
        assert_eq!(window, CropWindow::new(0, 0, 960, 540));

        let region = SubjectRegion::new(1500.0, 900.0, 3000.0, 3000.0);
        assert_eq!(calc.compute(&region), CropWindow::new(960, 540, 1920, 1080));
    }

    #[test]
    fn test_case_both_overflow_full_frame_policy() {
        let config = CropConfig {
            oversize_policy: OversizePolicy::FullFrame,
            ..Default::default()
        };
        let calc = calculator(config);
        let region = SubjectRegion::new(50.0, 50.0, 3000.0, 3000.0);
        assert_eq!(calc.compute(&region), CropWindow::full_frame(1920, 1080));
    }

    #[test]
    fn test_edge_clip_vs_shift() {
        let region = SubjectRegion::new(20.0, 540.0, 100.0, 100.0);

        let clipped = calculator(CropConfig::default()).compute(&region);
        // 192x108 centered at x=20: -76..116 -> 0..116
        assert_eq!(clipped, CropWindow::new(0, 486, 116, 594));

        let shifted = calculator(CropConfig {
            edge_policy: EdgePolicy::Shift,
            ..Default::default()
        })
        .compute(&region);
        assert_eq!(shifted, CropWindow::new(0, 486, 192, 594));

        let right = SubjectRegion::new(1910.0, 1075.0, 100.0, 100.0);
        let shifted = calculator(CropConfig {
            edge_policy: EdgePolicy::Shift,
            ..Default::default()
        })
        .compute(&right);
        assert_eq!(shifted, CropWindow::new(1728, 972, 1920, 1080));
    }

    #[test]
    fn test_pre_expanded_region_respects_flag() {
        let region = SubjectRegion::pre_expanded(960.0, 540.0, 108.0, 108.0);

        let no_reexpand = calculator(CropConfig {
            reexpand_aggregated: false,
            ..Default::default()
        });
        assert_eq!(no_reexpand.compute(&region), CropWindow::new(864, 486, 1056, 594));

        let reexpand = calculator(CropConfig::default());
        let (w, h) = reexpand.expanded_size(&region);
        assert!((w - 116.64).abs() < 1e-9 && (h - 116.64).abs() < 1e-9);
    }

    #[test]
    fn test_smoothed_center_overrides_region_center() {
        let calc = calculator(CropConfig::default());
        let region = SubjectRegion::new(100.0, 100.0, 100.0, 100.0);
        let window = calc.compute_with_center(&region, Some((960.0, 540.0)));
        assert_eq!(window, CropWindow::new(864, 486, 1056, 594));
    }

    #[test]
    fn test_degenerate_boxes_never_collapse() {
        let calc = calculator(CropConfig::default());
        let cases = [
            SubjectRegion::new(960.0, 540.0, 0.0, 0.0),
            SubjectRegion::new(0.0, 0.0, 0.0, 0.0),
            SubjectRegion::new(1920.0, 1080.0, 0.0, 0.0),
            SubjectRegion::new(-50.0, 5000.0, 1e-9, 1e-9),
            SubjectRegion::new(960.0, 540.0, -10.0, 20.0),
            SubjectRegion::new(f64::NAN, 540.0, f64::NAN, 10.0),
        ];
        for region in cases {
            let window = calc.compute(&region);
            assert!(window.is_within(1920, 1080), "{:?} -> {}", region, window);
        }
    }

    #[test]
    fn test_always_within_frame() {
        let calc = calculator(CropConfig::default());
        for cx in (0..=1920).step_by(240) {
            for cy in (0..=1080).step_by(135) {
                for size in [1.0, 50.0, 400.0, 1000.0, 2500.0] {
                    let region = SubjectRegion::new(cx as f64, cy as f64, size, size * 0.6);
                    let window = calc.compute(&region);
                    assert!(window.is_within(1920, 1080), "{:?} -> {}", region, window);
                }
            }
        }
    }
}
