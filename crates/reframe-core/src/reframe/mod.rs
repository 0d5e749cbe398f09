//! Subject-following reframing.
//!
//! # Architecture
//!
//! ```text
//! DetectionSet per frame
//!     │
//!     ├──────────────────────────────┐
//!     ▼                              ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │  Scene Segmenter │      │ Position Smoother│ ← direct mode
//! └────────┬─────────┘      └────────┬─────────┘
//!          ▼                         │
//! ┌──────────────────┐               │
//! │ Bounds Aggregator│ ← once per scene
//! └────────┬─────────┘               │
//!          ▼                         ▼
//! ┌─────────────────────────────────────────────┐
//! │           Crop Window Calculator            │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//!              FrameDecision per frame
//! ```

pub mod aggregator;
pub mod crop_calculator;
pub mod direct;
pub mod planner;
pub mod segmenter;
pub mod smoother;


pub use aggregator::SceneBoundsAggregator;
pub use crop_calculator::{BoundaryCase, CropCalculator};
pub use direct::DirectReframer;
pub use planner::{ReframePlan, ScenePlanner, StreamingScenePlanner};
pub use segmenter::SceneSegmenter;
pub use smoother::PositionSmoother;

/// Values this close to a whole pixel snap to it before truncation.
const PIXEL_EPSILON: f64 = 1e-3;

/// Truncate toward zero, snapping float noise around whole pixels first.
pub(crate) fn truncate_px(v: f64) -> f64 {
    let nearest = v.round();
    if (v - nearest).abs() < PIXEL_EPSILON {
        nearest
    } else {
        v.trunc()
    }
}
