//! Multi-scale grid tensor decoding.
//!
//! Each stride level of the detector head yields one tensor shaped
//! `H x W x (anchors * (5 + C))`, optionally with a leading batch dimension
//! of 1. Every anchor slot carries `[tx, ty, tw, th, objectness, class...]`.

use super::strategy::{bounded, sigmoid, Cell, DecodeStrategy, RawBox};
use crate::config::{DecoderConfig, StrideLevel};
use crate::error::{ReframeError, ReframeResult};
use ndarray::{ArrayView3, ArrayViewD, Axis, Ix3};
use reframe_models::NormalizedBox;
use tracing::trace;

/// A decoded box in normalized center form with per-class scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    /// `objectness * class_prob` for every class
    pub scores: Vec<f32>,
}

impl Candidate {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32, scores: Vec<f32>) -> Self {
        Self { cx, cy, w, h, scores }
    }

    /// Highest class score and its class id. Ties keep the lower id.
    pub fn best_class(&self) -> Option<(u32, f32)> {
        self.scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(u32, f32)>, (i, &s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((i as u32, s)),
            })
    }

    /// Corner-form box clipped into the unit square.
    pub fn to_box(&self) -> NormalizedBox {
        NormalizedBox::from_center(self.cx, self.cy, self.w, self.h).clipped()
    }
}

/// Stateless decoder for one detector head.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Channels per grid cell expected for `level`.
    fn channels_for(&self, level: &StrideLevel) -> usize {
        level.anchor_count() * (5 + self.config.num_classes)
    }

    /// Decode all stride outputs of one frame into a flat candidate list.
    ///
    /// Tensors may come in any order; each is matched to the level whose grid
    /// size equals its height.
    pub fn decode(&self, outputs: &[ArrayViewD<'_, f32>]) -> ReframeResult<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for output in outputs {
            let tensor = as_grid(output.view())?;
            let level = self.level_for(&tensor)?;
            self.decode_level(level, tensor, &mut candidates)?;
        }
        trace!(
            strategy = self.config.strategy.as_str(),
            candidates = candidates.len(),
            "Decoded detector outputs"
        );
        Ok(candidates)
    }

    fn level_for(&self, tensor: &ArrayView3<'_, f32>) -> ReframeResult<&StrideLevel> {
        let (h, w, _) = tensor.dim();
        self.config
            .levels
            .iter()
            .find(|level| level.stride > 0 && (self.config.input_size / level.stride) as usize == h)
            .filter(|_| h == w)
            .ok_or_else(|| {
                ReframeError::malformed_tensor(format!(
                    "no stride level matches a {}x{} grid at input size {}",
                    h, w, self.config.input_size
                ))
            })
    }

    /// Decode a single stride level, appending to `out`.
    pub fn decode_level(
        &self,
        level: &StrideLevel,
        tensor: ArrayView3<'_, f32>,
        out: &mut Vec<Candidate>,
    ) -> ReframeResult<()> {
        let (grid_h, grid_w, channels) = tensor.dim();
        let expected = self.channels_for(level);
        if channels != expected {
            return Err(ReframeError::malformed_tensor(format!(
                "stride {}: trailing dimension {} != {} anchors x (5 + {} classes)",
                level.stride,
                channels,
                level.anchor_count(),
                self.config.num_classes
            )));
        }

        let DecoderConfig {
            strategy,
            input_size,
            num_classes,
            outputs_activated,
            logit_clamp,
            ..
        } = self.config;
        let input = input_size as f32;
        let slot = 5 + num_classes;
        let activate = |v: f32| {
            if outputs_activated {
                v
            } else {
                sigmoid(bounded(v, logit_clamp))
            }
        };
        let box_activated = outputs_activated && strategy == DecodeStrategy::YoloV5;

        out.reserve(grid_h * grid_w * level.anchor_count());
        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let cell_values = tensor.slice(ndarray::s![gy, gx, ..]);
                for (a, anchor) in level.anchors.iter().enumerate() {
                    let base = a * slot;
                    let raw = RawBox {
                        tx: cell_values[base],
                        ty: cell_values[base + 1],
                        tw: cell_values[base + 2],
                        th: cell_values[base + 3],
                    };
                    let cell = Cell {
                        gx: gx as f32,
                        gy: gy as f32,
                        stride: level.stride as f32,
                        anchor: *anchor,
                    };
                    let [cx, cy, w, h] = strategy.decode_box(raw, cell, box_activated, logit_clamp);

                    let objectness = activate(cell_values[base + 4]);
                    let scores = (0..num_classes)
                        .map(|c| objectness * activate(cell_values[base + 5 + c]))
                        .collect();

                    out.push(Candidate::new(cx / input, cy / input, w / input, h / input, scores));
                }
            }
        }
        Ok(())
    }
}

/// View a raw output as a 3-D grid, dropping a leading batch dimension of 1.
fn as_grid<'a>(output: ArrayViewD<'a, f32>) -> ReframeResult<ArrayView3<'a, f32>> {
    let output = match output.ndim() {
        4 if output.shape()[0] == 1 => output.index_axis_move(Axis(0), 0),
        3 => output,
        _ => {
            return Err(ReframeError::malformed_tensor(format!(
                "expected HxWxC or 1xHxWxC, got shape {:?}",
                output.shape()
            )))
        }
    };
    output
        .into_dimensionality::<Ix3>()
        .map_err(|e| ReframeError::malformed_tensor(e.to_string()))
}
