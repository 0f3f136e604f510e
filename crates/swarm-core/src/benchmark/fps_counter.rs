// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::{Duration, Instant};

/// Rolling frame-rate estimate over a fixed interval, independent of any
/// benchmark run.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    window_start: Instant,
    frames_at_window_start: u64,
    last_fps: Option<f32>,
}

impl FpsCounter {
    /// Starts measuring at `now` with the given reporting interval.
    pub fn new(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            window_start: now,
            frames_at_window_start: 0,
            last_fps: None,
        }
    }

    /// Feeds the current total frame count.
    ///
    /// ## Returns
    /// A fresh FPS value once at least one interval has elapsed since the last
    /// one, `None` otherwise.
    pub fn sample(&mut self, now: Instant, total_frames: u64) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }
        let frames = total_frames.saturating_sub(self.frames_at_window_start);
        let fps = (frames as f64 / elapsed.as_secs_f64()) as f32;

        self.window_start = now;
        self.frames_at_window_start = total_frames;
        self.last_fps = Some(fps);
        Some(fps)
    }

    /// Restarts the current window at `now` from `total_frames`.
    pub fn reset(&mut self, now: Instant, total_frames: u64) {
        self.window_start = now;
        self.frames_at_window_start = total_frames;
    }

    /// Time left before [`FpsCounter::sample`] produces a value, zero when one
    /// is already due.
    pub fn until_next_sample(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.window_start))
    }

    /// The most recent value returned by [`FpsCounter::sample`].
    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }
}

/// Formats the live counter shown on screen, e.g. `FPS: 59.8 | Time: 12s`.
pub fn live_fps_text(fps: f32, session_elapsed: Duration) -> String {
    format!("FPS: {fps:.1} | Time: {}s", session_elapsed.as_secs())
}
