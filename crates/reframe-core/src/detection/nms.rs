//! Greedy non-maximum suppression.

use super::decoder::Candidate;
use crate::config::NmsConfig;
use reframe_models::Detection;
use std::cmp::Ordering;

/// Turn decoded candidates into suppressed detections.
///
/// Each candidate is reduced to its best class, converted to a clipped
/// corner-form box, and then filtered by [`nms`].
pub fn suppress(candidates: &[Candidate], config: &NmsConfig) -> Vec<Detection> {
    let detections = candidates
        .iter()
        .filter_map(|c| {
            let (class_id, score) = c.best_class()?;
            Some(Detection::new(c.to_box(), class_id, score))
        })
        .collect();

    nms(detections, config)
}

/// Greedy NMS over detections.
///
/// Drops detections below `score_threshold`, stable-sorts the rest by
/// descending score, then keeps a detection only if its IoU with every
/// already-kept detection (of the same class, unless `class_agnostic`) is at
/// most `iou_threshold`. Stops after `max_detections`.
pub fn nms(mut dets: Vec<Detection>, config: &NmsConfig) -> Vec<Detection> {
    dets.retain(|d| d.score >= config.score_threshold);
    // sort_by is stable: equal scores keep input order
    dets.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut kept: Vec<Detection> = Vec::with_capacity(dets.len().min(config.max_detections));

    'outer: for d in dets {
        if kept.len() >= config.max_detections {
            break;
        }
        for k in &kept {
            let comparable = config.class_agnostic || k.class_id == d.class_id;
            if comparable && k.bbox.iou(&d.bbox) > config.iou_threshold {
                continue 'outer;
            }
        }
        kept.push(d);
    }

    kept
}
