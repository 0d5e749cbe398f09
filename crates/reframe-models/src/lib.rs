//! Shared data models for the subject reframing pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Normalized detection boxes and per-frame detection sets
//! - Scene segments produced by temporal segmentation
//! - Target aspect ratios, subject regions and integer crop windows
//! - The crop plan handed to the resample/encode stage

pub mod aspect;
pub mod crop;
pub mod detection;
pub mod geometry;
pub mod plan;
pub mod scene;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use crop::{CropWindow, FrameDecision, SubjectRegion};
pub use detection::{Detection, DetectionSet};
pub use geometry::NormalizedBox;
pub use plan::{CropPlan, FrameCrop, PlanMode, PlannedScene};
pub use scene::{SceneSample, SceneSegment};
