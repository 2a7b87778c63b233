//! Frame-rate sampling for the diagnostic graph.

use crate::constants::{FPS_HISTORY, FPS_REFRESH_MS};
use std::collections::VecDeque;

/// Begin/end markers around each loop iteration. Observational only.
#[derive(Clone, Debug)]
pub struct FrameStats {
    begin_ms: Option<f64>,
    window_start_ms: Option<f64>,
    window_frames: u32,
    fps: f32,
    last_frame_ms: f32,
    history: VecDeque<f32>,
    capacity: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(FPS_HISTORY)
    }
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            begin_ms: None,
            window_start_ms: None,
            window_frames: 0,
            fps: 0.0,
            last_frame_ms: 0.0,
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn begin(&mut self, now_ms: f64) {
        self.begin_ms = Some(now_ms);
        if self.window_start_ms.is_none() {
            self.window_start_ms = Some(now_ms);
        }
    }

    /// Close the frame opened by `begin`. Returns the refreshed fps when a
    /// sampling window completed.
    pub fn end(&mut self, now_ms: f64) -> Option<f32> {
        let begin = self.begin_ms.take()?;
        self.last_frame_ms = (now_ms - begin).max(0.0) as f32;
        self.window_frames += 1;

        let start = self.window_start_ms.unwrap_or(begin);
        let span = now_ms - start;
        if span < FPS_REFRESH_MS {
            return None;
        }
        self.fps = (self.window_frames as f64 * 1000.0 / span) as f32;
        self.window_frames = 0;
        self.window_start_ms = Some(now_ms);
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(self.fps);
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// CPU time between the last begin/end pair.
    pub fn last_frame_ms(&self) -> f32 {
        self.last_frame_ms
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
