//! Gap-tolerant scene segmentation.
//!
//! The segmenter consumes one observation per frame and groups frames in
//! which the subject is present into scenes, tolerating short detection
//! dropouts.
//!
//! # State Machine
//!
//! ```text
//!                         present
//!     ┌────────────────────────────────────────────┐
//!     │                                            ▼
//! ┌──────┐                                    ┌────────┐  present: extend, gap = 0
//! │ Idle │                                    │  Open  │◄──────────────┐
//! └──────┘                                    └────────┘───────────────┘
//!     ▲                                            │ absent: gap += 1
//!     └────────────────────────────────────────────┘
//!              gap > max_gap_frames: close scene
//! ```

use crate::config::SegmenterConfig;
use crate::metrics;
use reframe_models::{Detection, DetectionSet, SceneSample, SceneSegment};
use std::mem;
use tracing::{debug, warn};

/// Internal state for the segmenter state machine.
#[derive(Debug)]
enum State {
    /// No scene is open.
    Idle,
    /// A scene is open, tracking consecutive absent frames.
    Open { segment: SceneSegment, gap: u64 },
}

/// Groups per-frame subject observations into closed scenes.
///
/// One instance serves one processing run. Frame indices must increase; a
/// frame at or before the last processed index is ignored with a warning.
/// Skipped indices count as absent frames.
#[derive(Debug)]
pub struct SceneSegmenter {
    config: SegmenterConfig,
    state: State,
    scenes: Vec<SceneSegment>,
    last_frame: Option<u64>,
}

impl SceneSegmenter {
    /// Create a new segmenter.
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            scenes: Vec::new(),
            last_frame: None,
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Whether a detection counts as the subject being present.
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.class_id == self.config.subject_class && detection.score >= self.config.min_confidence
    }

    /// Feed the best subject detection of a frame, or `None` if absent.
    ///
    /// Returns the scene closed by this call, if any.
    pub fn process_frame(&mut self, frame_index: u64, detection: Option<&Detection>) -> Option<&SceneSegment> {
        let mut closed = false;

        if let Some(last) = self.last_frame {
            if frame_index <= last {
                warn!(frame = frame_index, last_frame = last, "Ignoring out-of-order frame");
                metrics::record_out_of_order_frame();
                return None;
            }
            closed |= self.absorb_gap(frame_index - last - 1);
        }
        self.last_frame = Some(frame_index);

        let present = detection.filter(|d| self.accepts(d));
        match present {
            Some(d) => self.observe(SceneSample::from_detection(frame_index, d)),
            None => closed |= self.absorb_gap(1),
        }

        if closed {
            self.scenes.last()
        } else {
            None
        }
    }

    /// Feed a whole detection set, using its best subject detection.
    pub fn process_set(&mut self, set: &DetectionSet) -> Option<&SceneSegment> {
        let best = set
            .best_of_class(self.config.subject_class, self.config.min_confidence)
            .copied();
        self.process_frame(set.frame_index, best.as_ref())
    }

    fn observe(&mut self, sample: SceneSample) {
        if let State::Open { segment, gap } = &mut self.state {
            segment.extend(sample);
            *gap = 0;
            return;
        }
        debug!(frame = sample.frame_index, "Scene opened");
        self.state = State::Open {
            segment: SceneSegment::open(sample),
            gap: 0,
        };
    }

    /// Count `frames` absent frames; returns true if the open scene closed.
    fn absorb_gap(&mut self, frames: u64) -> bool {
        let max_gap = u64::from(self.config.max_gap_frames);
        let exceeded = match &mut self.state {
            State::Open { gap, .. } if frames > 0 => {
                *gap += frames;
                *gap > max_gap
            }
            _ => false,
        };
        if exceeded {
            self.close();
        }
        exceeded
    }

    fn close(&mut self) {
        if let State::Open { segment, .. } = mem::replace(&mut self.state, State::Idle) {
            debug!(
                start_frame = segment.start_frame,
                end_frame = segment.end_frame,
                samples = segment.samples.len(),
                "Scene closed"
            );
            metrics::record_scene_closed(segment.duration_frames());
            self.scenes.push(segment);
        }
    }

    /// Whether a scene is currently open.
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// The open scene, if any.
    pub fn open_segment(&self) -> Option<&SceneSegment> {
        match &self.state {
            State::Open { segment, .. } => Some(segment),
            State::Idle => None,
        }
    }

    /// Consecutive absent frames since the open scene was last extended.
    pub fn gap_frames(&self) -> u64 {
        match &self.state {
            State::Open { gap, .. } => *gap,
            State::Idle => 0,
        }
    }

    /// Scenes closed so far, in chronological order.
    pub fn scenes(&self) -> &[SceneSegment] {
        &self.scenes
    }

    /// Close any open scene and return all scenes.
    pub fn finalize(mut self) -> Vec<SceneSegment> {
        self.close();
        self.scenes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(max_gap_frames: u32) -> SegmenterConfig {
        SegmenterConfig {
            subject_class: 0,
            min_confidence: 0.85,
            max_gap_frames,
        }
    }

    fn subject(score: f32) -> Detection {
        Detection::from_center(0.5, 0.5, 0.1, 0.1, 0, score)
    }

    /// Feed a presence pattern starting at frame 0.
    fn feed(segmenter: &mut SceneSegmenter, pattern: &[bool]) -> usize {
        let det = subject(0.9);
        let mut closed = 0;
        for (i, &present) in pattern.iter().enumerate() {
            if segmenter
                .process_frame(i as u64, present.then_some(&det))
                .is_some()
            {
                closed += 1;
            }
        }
        closed
    }

    #[test]
    fn test_gap_longer_than_tolerance_closes_scene() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let closed = feed(&mut segmenter, &[true, true, true, false, false, false, false]);

        assert_eq!(closed, 1);
        assert_eq!(segmenter.scenes().len(), 1);
        assert_eq!(segmenter.scenes()[0].start_frame, 0);
        assert_eq!(segmenter.scenes()[0].end_frame, 2);
        assert!(!segmenter.is_open());

        let det = subject(0.95);
        assert!(segmenter.process_frame(7, Some(&det)).is_none());
        let scenes = segmenter.finalize();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].start_frame, 7);
        assert_eq!(scenes[1].end_frame, 7);
    }

    #[test]
    fn test_gap_equal_to_tolerance_keeps_scene_open() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let closed = feed(&mut segmenter, &[true, false, false, false, true]);

        assert_eq!(closed, 0);
        assert!(segmenter.is_open());
        assert_eq!(segmenter.gap_frames(), 0);
        let scenes = segmenter.finalize();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].end_frame, 4);
        assert_eq!(scenes[0].samples.len(), 2);
        assert_eq!(scenes[0].duration_frames(), 5);
    }

    #[test]
    fn test_close_happens_on_first_excess_frame() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let det = subject(0.9);
        assert!(segmenter.process_frame(0, Some(&det)).is_none());
        for frame in 1..=3 {
            assert!(segmenter.process_frame(frame, None).is_none());
        }
        let closed = segmenter.process_frame(4, None).cloned();
        assert_eq!(closed.map(|s| (s.start_frame, s.end_frame)), Some((0, 0)));
    }

    #[test]
    fn test_finalize_closes_open_scene_without_losing_samples() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        feed(&mut segmenter, &[false, true, true, false, true]);
        assert_eq!(segmenter.scenes().len(), 0);

        let scenes = segmenter.finalize();
        assert_eq!(scenes.len(), 1);
        let frames: Vec<u64> = scenes[0].samples.iter().map(|s| s.frame_index).collect();
        assert_eq!(frames, vec![1, 2, 4]);
    }

    #[test]
    fn test_absent_without_open_scene_is_noop() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        feed(&mut segmenter, &[false, false, false, false, false, false]);
        assert!(!segmenter.is_open());
        assert!(segmenter.finalize().is_empty());
    }

    #[test]
    fn test_low_confidence_and_other_class_are_absent() {
        let mut segmenter = SceneSegmenter::new(make_config(0));
        let weak = subject(0.5);
        let other = Detection::from_center(0.5, 0.5, 0.1, 0.1, 1, 0.99);
        segmenter.process_frame(0, Some(&weak));
        segmenter.process_frame(1, Some(&other));
        assert!(!segmenter.is_open());
        assert!(segmenter.finalize().is_empty());
    }

    #[test]
    fn test_zero_gap_tolerance() {
        let mut segmenter = SceneSegmenter::new(make_config(0));
        let closed = feed(&mut segmenter, &[true, false, true, true, false]);
        assert_eq!(closed, 2);
        let scenes = segmenter.finalize();
        let bounds: Vec<(u64, u64)> = scenes.iter().map(|s| (s.start_frame, s.end_frame)).collect();
        assert_eq!(bounds, vec![(0, 0), (2, 3)]);
    }

    #[test]
    fn test_out_of_order_frames_ignored() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let det = subject(0.9);
        segmenter.process_frame(5, Some(&det));
        assert!(segmenter.process_frame(5, Some(&det)).is_none());
        assert!(segmenter.process_frame(2, Some(&det)).is_none());
        let scenes = segmenter.finalize();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].samples.len(), 1);
    }

    #[test]
    fn test_skipped_frames_count_as_gap() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let det = subject(0.9);
        segmenter.process_frame(0, Some(&det));
        // frames 1..=9 never arrive
        let closed = segmenter.process_frame(10, Some(&det)).cloned();
        assert_eq!(closed.map(|s| s.end_frame), Some(0));
        assert!(segmenter.is_open());
        assert_eq!(segmenter.open_segment().map(|s| s.start_frame), Some(10));
    }

    #[test]
    fn test_process_set_picks_best_subject() {
        let mut segmenter = SceneSegmenter::new(make_config(3));
        let set = DetectionSet::new(
            0,
            vec![
                Detection::from_center(0.2, 0.2, 0.1, 0.1, 0, 0.86),
                Detection::from_center(0.7, 0.7, 0.1, 0.1, 0, 0.97),
                Detection::from_center(0.4, 0.4, 0.1, 0.1, 1, 0.99),
            ],
        );
        segmenter.process_set(&set);
        let scenes = segmenter.finalize();
        assert!((scenes[0].samples[0].cx - 0.7).abs() < 1e-6);
    }
}
