//! Direct (single-pass) reframing.
//!
//! Each frame is cropped around its own subject detection, with the center
//! run through a [`PositionSmoother`]. Frames without a subject are passed
//! through uncropped.

use super::crop_calculator::CropCalculator;
use super::smoother::PositionSmoother;
use crate::config::ReframeConfig;
use crate::error::ReframeResult;
use crate::metrics;
use reframe_models::{Detection, DetectionSet, FrameCrop, FrameDecision, PlanMode, SubjectRegion};
use std::time::Instant;
use tracing::{info, trace};

/// Per-frame reframer without scene segmentation.
#[derive(Debug, Clone)]
pub struct DirectReframer {
    subject_class: u32,
    min_confidence: f32,
    calculator: CropCalculator,
    smoother: PositionSmoother,
}

impl DirectReframer {
    pub fn new(config: &ReframeConfig, frame_width: u32, frame_height: u32) -> ReframeResult<Self> {
        config.validate()?;
        Ok(Self {
            subject_class: config.segmenter.subject_class,
            min_confidence: config.segmenter.min_confidence,
            calculator: CropCalculator::new(frame_width, frame_height, config.crop.clone())?,
            smoother: PositionSmoother::new(&config.smoothing),
        })
    }

    /// Pixel-space region of a normalized detection.
    fn region_of(&self, detection: &Detection) -> SubjectRegion {
        let (fw, fh) = self.calculator.frame_size();
        let (left, top, right, bottom) = detection.bbox.to_pixels(fw, fh);
        SubjectRegion::new(
            (left + right) / 2.0,
            (top + bottom) / 2.0,
            right - left,
            bottom - top,
        )
    }

    /// Decide the crop for one frame's best subject detection.
    pub fn process_frame(&mut self, detection: Option<&Detection>) -> FrameDecision {
        let present = detection.filter(|d| d.class_id == self.subject_class && d.score >= self.min_confidence);
        let Some(detection) = present else {
            return FrameDecision::FullFrame;
        };

        let region = self.region_of(detection);
        let center = self.smoother.update(region.cx, region.cy);
        let crop = self.calculator.compute_with_center(&region, Some(center));
        trace!(raw_cx = region.cx, raw_cy = region.cy, smoothed = ?center, crop = %crop, "Direct crop");
        FrameDecision::Crop(crop)
    }

    /// Decide the crop for one frame's detection set.
    pub fn process_set(&mut self, set: &DetectionSet) -> FrameDecision {
        let best = set.best_of_class(self.subject_class, self.min_confidence).copied();
        self.process_frame(best.as_ref())
    }

    /// Decisions for frames `0..frame_count`; frames without a set are uncropped.
    ///
    /// Sets must be ordered by frame index.
    pub fn plan<'a, I>(&mut self, sets: I, frame_count: u64) -> Vec<FrameCrop>
    where
        I: IntoIterator<Item = &'a DetectionSet>,
    {
        let started = Instant::now();
        let mut sets = sets.into_iter().peekable();
        let mut frames = Vec::with_capacity(frame_count as usize);

        for frame_index in 0..frame_count {
            while sets.next_if(|s| s.frame_index < frame_index).is_some() {}
            let decision = match sets.next_if(|s| s.frame_index == frame_index) {
                Some(set) => self.process_set(set),
                None => FrameDecision::FullFrame,
            };
            frames.push(FrameCrop {
                frame_index,
                decision,
            });
        }

        let cropped = frames.iter().filter(|f| !f.decision.is_full_frame()).count() as u64;
        metrics::record_frames_planned(PlanMode::Direct.as_str(), frame_count, cropped);
        metrics::record_planning_duration(PlanMode::Direct.as_str(), started.elapsed().as_secs_f64());
        info!(frames = frame_count, cropped_frames = cropped, "Direct plan ready");

        frames
    }
}
