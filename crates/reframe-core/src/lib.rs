//! Detection-driven adaptive reframing.
//!
//! This crate provides:
//! - Multi-scale detector output decoding with selectable YOLO conventions
//! - Greedy non-maximum suppression
//! - Gap-tolerant scene segmentation and per-scene bounds
//! - Aspect-locked crop window computation
//! - Scene-based (two-pass) and direct (smoothed) crop planning

pub mod config;
pub mod detection;
pub mod error;
pub mod metrics;
pub mod reframe;

pub use config::{
    AggregatorConfig, CropConfig, DecoderConfig, EdgePolicy, NmsConfig, OversizePolicy, ReframeConfig,
    SegmenterConfig, SmoothingConfig, StrideLevel,
};
pub use detection::{Candidate, DecodeStrategy, Decoder, DetectionPipeline, RawFrame};
pub use error::{ReframeError, ReframeResult};
pub use reframe::{
    BoundaryCase, CropCalculator, DirectReframer, PositionSmoother, ReframePlan, SceneBoundsAggregator,
    ScenePlanner, SceneSegmenter, StreamingScenePlanner,
};
