//! Detector output decoding and duplicate suppression.
//!
//! Raw tensors flow through [`Decoder`] and [`nms::suppress`] into one
//! [`DetectionSet`] per frame. Decode failures are frame-local: the frame
//! degrades to an empty set and the stream continues.

pub mod decoder;
pub mod nms;
pub mod strategy;

pub use decoder::{Candidate, Decoder};
pub use nms::{nms, suppress};
pub use strategy::DecodeStrategy;

use crate::config::{DecoderConfig, NmsConfig};
use crate::error::ReframeResult;
use crate::metrics;
use ndarray::ArrayD;
use rayon::prelude::*;
use reframe_models::DetectionSet;
use tracing::{debug, warn};

/// Raw detector outputs of one frame, one tensor per stride level.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub frame_index: u64,
    pub outputs: Vec<ArrayD<f32>>,
}

impl RawFrame {
    pub fn new(frame_index: u64, outputs: Vec<ArrayD<f32>>) -> Self {
        Self {
            frame_index,
            outputs,
        }
    }
}

/// Decoder + suppressor for per-frame detection sets.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    decoder: Decoder,
    nms: NmsConfig,
}

impl DetectionPipeline {
    pub fn new(decoder: DecoderConfig, nms: NmsConfig) -> Self {
        Self {
            decoder: Decoder::new(decoder),
            nms,
        }
    }

    /// Decode and suppress one frame.
    pub fn detect(&self, frame: &RawFrame) -> ReframeResult<DetectionSet> {
        let views: Vec<_> = frame.outputs.iter().map(|o| o.view()).collect();
        let candidates = self.decoder.decode(&views)?;
        let detections = suppress(&candidates, &self.nms);

        debug!(
            frame = frame.frame_index,
            candidates = candidates.len(),
            kept = detections.len(),
            "Frame detections"
        );

        Ok(DetectionSet::new(frame.frame_index, detections))
    }

    /// Decode one frame, treating a malformed output as "no detections".
    pub fn detect_or_empty(&self, frame: &RawFrame) -> DetectionSet {
        match self.detect(frame) {
            Ok(set) => set,
            Err(e) => {
                warn!(frame = frame.frame_index, error = %e, "Decode failed, treating frame as empty");
                metrics::record_decode_failure();
                DetectionSet::empty(frame.frame_index)
            }
        }
    }

    /// Decode a batch of frames in parallel, preserving input order.
    pub fn detect_batch(&self, frames: &[RawFrame]) -> Vec<DetectionSet> {
        frames
            .par_iter()
            .map(|frame| self.detect_or_empty(frame))
            .collect()
    }
}
