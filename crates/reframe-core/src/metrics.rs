//! Metrics emitted by the reframing core.
//!
//! Only the `metrics` facade is used here; installing an exporter is up to
//! the embedding binary.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    // Detection metrics
    pub const DECODE_FAILURES_TOTAL: &str = "reframe_decode_failures_total";

    // Segmentation metrics
    pub const SCENES_CLOSED_TOTAL: &str = "reframe_scenes_closed_total";
    pub const SCENE_DURATION_FRAMES: &str = "reframe_scene_duration_frames";
    pub const OUT_OF_ORDER_FRAMES_TOTAL: &str = "reframe_out_of_order_frames_total";

    // Planning metrics
    pub const FRAMES_PLANNED_TOTAL: &str = "reframe_frames_planned_total";
    pub const FRAMES_CROPPED_TOTAL: &str = "reframe_frames_cropped_total";
    pub const PLANNING_DURATION_SECONDS: &str = "reframe_planning_duration_seconds";
}

/// Record a frame whose detector output could not be decoded.
pub fn record_decode_failure() {
    counter!(names::DECODE_FAILURES_TOTAL).increment(1);
}

/// Record a closed scene.
pub fn record_scene_closed(duration_frames: u64) {
    counter!(names::SCENES_CLOSED_TOTAL).increment(1);
    histogram!(names::SCENE_DURATION_FRAMES).record(duration_frames as f64);
}

/// Record a frame that arrived out of order and was ignored.
pub fn record_out_of_order_frame() {
    counter!(names::OUT_OF_ORDER_FRAMES_TOTAL).increment(1);
}

/// Record planned frames for a mode.
pub fn record_frames_planned(mode: &str, total: u64, cropped: u64) {
    let labels = [("mode", mode.to_string())];
    counter!(names::FRAMES_PLANNED_TOTAL, &labels).increment(total);
    counter!(names::FRAMES_CROPPED_TOTAL, &labels).increment(cropped);
}

/// Record how long planning took.
pub fn record_planning_duration(mode: &str, duration_secs: f64) {
    let labels = [("mode", mode.to_string())];
    histogram!(names::PLANNING_DURATION_SECONDS, &labels).record(duration_secs);
}
