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

/// Monotonic clock measuring time since a start instant.
///
/// Used as the frame clock: the render lane restarts it when the surface is
/// created and reads [`Stopwatch::elapsed_secs_f32`] on every tick.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch started now.
    #[inline]
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// Creates a stopwatch started at `start_time`.
    /// ## Arguments
    /// * `start_time` - The instant elapsed time is measured from.
    #[inline]
    pub fn started_at(start_time: Instant) -> Self {
        Self { start_time }
    }

    /// Resets the start instant to now.
    #[inline]
    pub fn restart(&mut self) {
        self.start_time = Instant::now();
    }

    /// The instant the stopwatch was last (re)started.
    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Returns the time elapsed since the start instant.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the time elapsed at `now`, saturating to zero if `now` precedes the start.
    #[inline]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }

    /// Returns the elapsed time in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Returns the elapsed time in seconds as `f32`, the precision shaders consume.
    #[inline]
    pub fn elapsed_secs_f32(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SLEEP_DURATION_MS: u64 = 50;
    const SLEEP_MARGIN_MS: u64 = 500;

    #[test]
    fn elapsed_near_zero_initially() {
        let watch = Stopwatch::new();
        assert!(watch.elapsed() < Duration::from_millis(SLEEP_DURATION_MS));
        assert!(watch.elapsed_secs_f32() < SLEEP_DURATION_MS as f32 / 1000.0);
    }

    #[test]
    fn elapsed_after_sleep() {
        let watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        let ms = watch.elapsed_ms();
        assert!(ms >= SLEEP_DURATION_MS, "elapsed {ms} ms is too short");
        assert!(ms < SLEEP_DURATION_MS + SLEEP_MARGIN_MS, "elapsed {ms} ms is too long");
    }

    #[test]
    fn restart_moves_start_forward() {
        let mut watch = Stopwatch::new();
        let first = watch.start_time();
        thread::sleep(Duration::from_millis(5));
        watch.restart();
        assert!(watch.start_time() > first);
    }

    #[test]
    fn elapsed_at_is_deterministic() {
        let t0 = Instant::now();
        let watch = Stopwatch::started_at(t0);
        assert_eq!(watch.elapsed_at(t0 + Duration::from_secs(3)), Duration::from_secs(3));
        // An instant before the start saturates.
        let early = Stopwatch::started_at(t0 + Duration::from_secs(1));
        assert_eq!(early.elapsed_at(t0), Duration::ZERO);
    }
}
