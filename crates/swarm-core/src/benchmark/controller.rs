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

use std::fmt;
use std::time::{Duration, Instant};

use super::PerformanceRating;

/// Frames counted over one benchmark window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkSample {
    /// The configured window length.
    pub window_duration_ms: u64,
    /// Wall-clock time that actually elapsed when the window was closed.
    pub elapsed_ms: u64,
    /// Frames rendered while the run was active.
    pub frames_rendered: u64,
}

impl BenchmarkSample {
    /// `frames · 1000 / elapsed_ms`, or 0 for an empty window.
    pub fn average_fps(&self) -> f32 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        (self.frames_rendered as f64 * 1000.0 / self.elapsed_ms as f64) as f32
    }

    /// Consumes the sample into the report shown to the user.
    pub fn into_report(self) -> BenchmarkReport {
        let average_fps = self.average_fps();
        BenchmarkReport {
            average_fps,
            rating: PerformanceRating::from_fps(average_fps),
            frames_rendered: self.frames_rendered,
            elapsed_ms: self.elapsed_ms,
        }
    }
}

/// Final result of a benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkReport {
    /// Average frames per second over the window.
    pub average_fps: f32,
    /// Rating derived from `average_fps`.
    pub rating: PerformanceRating,
    /// Frames counted.
    pub frames_rendered: u64,
    /// Measured window length.
    pub elapsed_ms: u64,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average FPS: {:.1} | Rating: {}",
            self.average_fps, self.rating
        )
    }
}

/// Lifecycle of a benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BenchmarkState {
    /// No run has been started.
    Idle,
    /// A window is open.
    Running {
        /// When the window opened.
        started_at: Instant,
        /// How long the window stays open.
        window: Duration,
    },
    /// The last run finished; stays here until restarted.
    Reported(BenchmarkReport),
}

/// Drives `Idle -> Running -> Reported`.
///
/// The controller never counts frames itself: the caller passes the number of
/// frames rendered since [`BenchmarkController::start`] when it closes the window.
#[derive(Debug, Clone)]
pub struct BenchmarkController {
    state: BenchmarkState,
}

impl BenchmarkController {
    /// A controller in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: BenchmarkState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &BenchmarkState {
        &self.state
    }

    /// Returns `true` while a window is open.
    pub fn is_running(&self) -> bool {
        matches!(self.state, BenchmarkState::Running { .. })
    }

    /// The report of the last finished run, if any.
    pub fn last_report(&self) -> Option<&BenchmarkReport> {
        match &self.state {
            BenchmarkState::Reported(report) => Some(report),
            _ => None,
        }
    }

    /// Opens a window of `window` starting at `now`. Restarting a running or
    /// reported benchmark discards its previous state.
    pub fn start(&mut self, now: Instant, window: Duration) {
        if self.is_running() {
            log::warn!("Benchmark restarted while a run was in progress");
        }
        log::info!("Benchmark started ({} ms window)", window.as_millis());
        self.state = BenchmarkState::Running {
            started_at: now,
            window,
        };
    }

    /// Time left in the open window, `None` when not running.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            BenchmarkState::Running { started_at, window } => {
                Some(window.saturating_sub(now.saturating_duration_since(started_at)))
            }
            _ => None,
        }
    }

    /// Returns `true` once the open window has fully elapsed.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now) == Some(Duration::ZERO)
    }

    /// Countdown text while running, e.g. `Testing... 3s remaining`.
    /// Seconds are rounded up so the last second reads `1s`.
    pub fn status_text(&self, now: Instant) -> Option<String> {
        let remaining = self.remaining(now)?;
        let secs = remaining.as_millis().div_ceil(1000);
        Some(format!("Testing... {secs}s remaining"))
    }

    /// Closes the window if it has elapsed by `now`.
    ///
    /// ## Arguments
    /// * `now` - Current wall-clock instant.
    /// * `frames_rendered` - Frames counted since the run started.
    ///
    /// ## Returns
    /// The report, exactly once per run. `None` while the window is still open
    /// or when no run is active.
    pub fn finish(&mut self, now: Instant, frames_rendered: u64) -> Option<BenchmarkReport> {
        let BenchmarkState::Running { started_at, window } = self.state else {
            return None;
        };
        let elapsed = now.saturating_duration_since(started_at);
        if elapsed < window {
            return None;
        }

        let report = BenchmarkSample {
            window_duration_ms: window.as_millis() as u64,
            elapsed_ms: elapsed.as_millis() as u64,
            frames_rendered,
        }
        .into_report();
        log::info!(
            "Benchmark finished: {frames_rendered} frames in {} ms, {report}",
            report.elapsed_ms
        );
        self.state = BenchmarkState::Reported(report);
        Some(report)
    }
}

impl Default for BenchmarkController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WINDOW: Duration = Duration::from_millis(5000);

    #[test]
    fn sample_of_150_frames_over_5s_is_good() {
        let report = BenchmarkSample {
            window_duration_ms: 5000,
            elapsed_ms: 5000,
            frames_rendered: 150,
        }
        .into_report();
        assert_relative_eq!(report.average_fps, 30.0);
        assert_eq!(report.rating, PerformanceRating::Good);
        assert_eq!(report.to_string(), "Average FPS: 30.0 | Rating: Good");
    }

    #[test]
    fn empty_window_averages_zero() {
        let sample = BenchmarkSample {
            window_duration_ms: 5000,
            elapsed_ms: 0,
            frames_rendered: 10,
        };
        assert_eq!(sample.average_fps(), 0.0);
    }

    #[test]
    fn lifecycle_idle_running_reported() {
        let t0 = Instant::now();
        let mut controller = BenchmarkController::new();
        assert_eq!(*controller.state(), BenchmarkState::Idle);
        assert_eq!(controller.finish(t0, 10), None);

        controller.start(t0, WINDOW);
        assert!(controller.is_running());
        assert_eq!(controller.remaining(t0 + Duration::from_secs(2)), Some(Duration::from_secs(3)));

        // Still open one millisecond before the deadline.
        assert_eq!(controller.finish(t0 + WINDOW - Duration::from_millis(1), 149), None);
        assert!(controller.is_running());

        let report = controller.finish(t0 + WINDOW, 150).expect("window elapsed");
        assert_relative_eq!(report.average_fps, 30.0);
        assert_eq!(controller.last_report(), Some(&report));

        // Delivered once; further polls are no-ops until restarted.
        assert_eq!(controller.finish(t0 + WINDOW * 2, 500), None);
        assert!(!controller.is_running());
    }

    #[test]
    fn average_uses_measured_elapsed_time() {
        let t0 = Instant::now();
        let mut controller = BenchmarkController::new();
        controller.start(t0, WINDOW);
        // Timer fired late: 6 s elapsed for 360 frames.
        let report = controller.finish(t0 + Duration::from_secs(6), 360).unwrap();
        assert_relative_eq!(report.average_fps, 60.0);
        assert_eq!(report.rating, PerformanceRating::Outstanding);
    }

    #[test]
    fn status_text_counts_down() {
        let t0 = Instant::now();
        let mut controller = BenchmarkController::new();
        assert_eq!(controller.status_text(t0), None);

        controller.start(t0, WINDOW);
        assert_eq!(controller.status_text(t0).as_deref(), Some("Testing... 5s remaining"));
        assert_eq!(
            controller.status_text(t0 + Duration::from_millis(4200)).as_deref(),
            Some("Testing... 1s remaining")
        );
    }

    #[test]
    fn restart_after_report() {
        let t0 = Instant::now();
        let mut controller = BenchmarkController::new();
        controller.start(t0, WINDOW);
        controller.finish(t0 + WINDOW, 50).unwrap();

        let t1 = t0 + Duration::from_secs(10);
        controller.start(t1, WINDOW);
        assert!(controller.is_running());
        assert!(controller.last_report().is_none());
        assert!(!controller.is_expired(t1));
        assert!(controller.is_expired(t1 + WINDOW));
    }
}
