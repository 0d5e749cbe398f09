//! Box decoding conventions of the supported detector heads.

use serde::{Deserialize, Serialize};

/// Raw channels of one anchor slot, before activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBox {
    pub tx: f32,
    pub ty: f32,
    pub tw: f32,
    pub th: f32,
}

/// Grid context of one anchor slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Column index in the grid
    pub gx: f32,
    /// Row index in the grid
    pub gy: f32,
    /// Stride of the level in model-input pixels
    pub stride: f32,
    /// Anchor `(w, h)` prior in model-input pixels
    pub anchor: [f32; 2],
}

/// Decoding convention of a detector head.
///
/// | Strategy  | centers                         | sizes              |
/// |-----------|---------------------------------|--------------------|
/// | `YoloV5`  | `(σ(t)·2 − 0.5 + g)·s`          | `(σ(t)·2)²·anchor` |
/// | `YoloV3`  | `(σ(t) + g)·s`                  | `exp(t)·anchor`    |
/// | `YoloV4`  | `(σ(t)·k − 0.5·(k−1) + g)·s`    | `exp(t)·anchor`    |
/// | `YoloX`   | `(t + g)·s`                     | `exp(t)·s`         |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodeStrategy {
    #[default]
    YoloV5,
    YoloV3,
    YoloV4 {
        /// Grid sensitivity factor `k`
        scale_xy: f32,
    },
    #[serde(rename = "yolox")]
    YoloX,
}

impl DecodeStrategy {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStrategy::YoloV5 => "yolov5",
            DecodeStrategy::YoloV3 => "yolov3",
            DecodeStrategy::YoloV4 { .. } => "yolov4",
            DecodeStrategy::YoloX => "yolox",
        }
    }

    /// Decode one anchor slot into a center-form box in model-input pixels.
    ///
    /// `box_activated` means the head already applied the sigmoid to the
    /// box channels (only meaningful for `YoloV5`, whose sizes are sigmoid
    /// based). Raw inputs are clamped to `[-clamp, clamp]` first.
    pub fn decode_box(&self, raw: RawBox, cell: Cell, box_activated: bool, clamp: f32) -> [f32; 4] {
        let c = |v: f32| bounded(v, clamp);
        let s = cell.stride;

        match *self {
            DecodeStrategy::YoloV5 => {
                let act = |v: f32| if box_activated { v } else { sigmoid(c(v)) };
                let cx = (act(raw.tx) * 2.0 - 0.5 + cell.gx) * s;
                let cy = (act(raw.ty) * 2.0 - 0.5 + cell.gy) * s;
                let w = (act(raw.tw) * 2.0).powi(2) * cell.anchor[0];
                let h = (act(raw.th) * 2.0).powi(2) * cell.anchor[1];
                [cx, cy, w, h]
            }
            DecodeStrategy::YoloV3 => {
                let cx = (sigmoid(c(raw.tx)) + cell.gx) * s;
                let cy = (sigmoid(c(raw.ty)) + cell.gy) * s;
                let w = c(raw.tw).exp() * cell.anchor[0];
                let h = c(raw.th).exp() * cell.anchor[1];
                [cx, cy, w, h]
            }
            DecodeStrategy::YoloV4 { scale_xy } => {
                let offset = 0.5 * (scale_xy - 1.0);
                let cx = (sigmoid(c(raw.tx)) * scale_xy - offset + cell.gx) * s;
                let cy = (sigmoid(c(raw.ty)) * scale_xy - offset + cell.gy) * s;
                let w = c(raw.tw).exp() * cell.anchor[0];
                let h = c(raw.th).exp() * cell.anchor[1];
                [cx, cy, w, h]
            }
            DecodeStrategy::YoloX => {
                let cx = (c(raw.tx) + cell.gx) * s;
                let cy = (c(raw.ty) + cell.gy) * s;
                let w = c(raw.tw).exp() * s;
                let h = c(raw.th).exp() * s;
                [cx, cy, w, h]
            }
        }
    }
}

/// Logistic function on a pre-clamped input.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Clamp a raw value into `[-limit, limit]`; NaN maps to the lower bound.
#[inline]
pub fn bounded(x: f32, limit: f32) -> f32 {
    if x.is_nan() {
        -limit
    } else {
        x.clamp(-limit, limit)
    }
}
