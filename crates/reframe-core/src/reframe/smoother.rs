//! Sliding-window position smoothing for direct mode.

use crate::config::SmoothingConfig;
use std::collections::VecDeque;

/// Moving average over the most recent subject centers.
#[derive(Debug, Clone)]
pub struct PositionSmoother {
    window_size: usize,
    window: VecDeque<(f64, f64)>,
}

impl PositionSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        let window_size = config.window_size.max(1);
        Self {
            window_size,
            window: VecDeque::with_capacity(window_size),
        }
    }

    /// Append a raw center, evicting the oldest once the window is full.
    pub fn push(&mut self, cx: f64, cy: f64) {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back((cx, cy));
    }

    /// Average of the window, or `None` when it is empty.
    pub fn smoothed(&self) -> Option<(f64, f64)> {
        if self.window.is_empty() {
            return None;
        }
        let n = self.window.len() as f64;
        let (sx, sy) = self
            .window
            .iter()
            .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
        Some((sx / n, sy / n))
    }

    /// Push a raw center and return the smoothed center.
    pub fn update(&mut self, cx: f64, cy: f64) -> (f64, f64) {
        self.push(cx, cy);
        self.smoothed().unwrap_or((cx, cy))
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
