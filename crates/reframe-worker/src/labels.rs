//! Per-frame label files.
//!
//! Each frame `n` has an optional file `{prefix}_{n}.txt` with one detection
//! per line: `class cx cy w h confidence`, all normalized center form. A
//! missing file means nothing was detected in that frame.

use crate::config::label_path;
use crate::error::WorkerResult;
use reframe_models::{Detection, DetectionSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse one label line, or `None` if it is malformed.
pub fn parse_label_line(line: &str) -> Option<Detection> {
    let values: Vec<f32> = line
        .split_whitespace()
        .map(|v| v.parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;

    let [class, cx, cy, w, h, score] = values.as_slice() else {
        return None;
    };
    if *class < 0.0 || class.fract() != 0.0 || !values.iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(Detection::from_center(*cx, *cy, *w, *h, *class as u32, *score))
}

/// Parse a whole label file; malformed lines are skipped with a warning.
pub fn parse_label_file(contents: &str, frame_index: u64) -> DetectionSet {
    let detections = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| {
            let parsed = parse_label_line(line);
            if parsed.is_none() {
                warn!(frame = frame_index, line = n + 1, "Skipping malformed label line");
            }
            parsed
        })
        .collect();
    DetectionSet::new(frame_index, detections)
}

/// Directory of per-frame label files.
#[derive(Debug, Clone)]
pub struct LabelSource {
    dir: PathBuf,
    prefix: String,
}

impl LabelSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frame index encoded in a label file name, if it belongs to this source.
    pub fn frame_index_of(&self, file_name: &str) -> Option<u64> {
        file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('_')?
            .strip_suffix(".txt")?
            .parse()
            .ok()
    }

    /// Highest frame index with a label file, or `None` if there are none.
    pub async fn max_frame_index(&self) -> WorkerResult<Option<u64>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut max = None;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(index) = entry.file_name().to_str().and_then(|n| self.frame_index_of(n)) {
                max = max.max(Some(index));
            }
        }
        Ok(max)
    }

    /// Detections of one frame. Unreadable files count as empty frames.
    pub async fn load(&self, frame_index: u64) -> DetectionSet {
        let path = label_path(&self.dir, &self.prefix, frame_index);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_label_file(&contents, frame_index),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DetectionSet::empty(frame_index),
            Err(e) => {
                warn!(frame = frame_index, path = %path.display(), error = %e, "Unreadable label file");
                DetectionSet::empty(frame_index)
            }
        }
    }

    /// Detections of frames `0..frame_count`, in order.
    pub async fn load_all(&self, frame_count: u64) -> Vec<DetectionSet> {
        let mut sets = Vec::with_capacity(frame_count as usize);
        for frame_index in 0..frame_count {
            sets.push(self.load(frame_index).await);
        }
        let with_detections = sets.iter().filter(|s| !s.is_empty()).count();
        debug!(
            dir = %self.dir.display(),
            frames = frame_count,
            frames_with_detections = with_detections,
            "Loaded label files"
        );
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let det = parse_label_line("0 0.5 0.5 0.2 0.4 0.93").unwrap();
        assert_eq!(det.class_id, 0);
        assert!((det.score - 0.93).abs() < 1e-6);
        assert!((det.bbox.x1 - 0.4).abs() < 1e-6);
        assert!((det.bbox.y2 - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_label_line("").is_none());
        assert!(parse_label_line("0 0.5 0.5 0.2 0.4").is_none());
        assert!(parse_label_line("0 0.5 0.5 0.2 0.4 0.9 1").is_none());
        assert!(parse_label_line("a 0.5 0.5 0.2 0.4 0.9").is_none());
        assert!(parse_label_line("1.5 0.5 0.5 0.2 0.4 0.9").is_none());
        assert!(parse_label_line("-1 0.5 0.5 0.2 0.4 0.9").is_none());
        assert!(parse_label_line("0 NaN 0.5 0.2 0.4 0.9").is_none());
    }

    #[test]
    fn test_parse_file_skips_bad_lines() {
        let contents = "0 0.5 0.5 0.2 0.4 0.93\n\ngarbage\n1 0.1 0.1 0.05 0.05 0.7\n";
        let set = parse_label_file(contents, 3);
        assert_eq!(set.frame_index, 3);
        assert_eq!(set.detections.len(), 2);
        assert_eq!(set.detections[1].class_id, 1);
    }

    #[test]
    fn test_frame_index_from_file_name() {
        let source = LabelSource::new("labels", "cut");
        assert_eq!(source.frame_index_of("cut_42.txt"), Some(42));
        assert_eq!(source.frame_index_of("cut_42.json"), None);
        assert_eq!(source.frame_index_of("other_42.txt"), None);
        assert_eq!(source.frame_index_of("cut_x.txt"), None);
        assert_eq!(source.frame_index_of("cutter_1.txt"), None);
    }
}
