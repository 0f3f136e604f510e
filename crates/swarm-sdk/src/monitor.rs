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

//! Timer-side statistics: live FPS text and benchmark expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use swarm_core::benchmark::{live_fps_text, BenchmarkController, FpsCounter, FrameCounters};
use swarm_core::event::HostNotification;
use swarm_core::Stopwatch;

/// Floor on the timer delay so an overdue deadline cannot spin the thread.
const MIN_TIMER_DELAY: Duration = Duration::from_millis(1);

/// Turns the render thread's frame counters into host notifications.
///
/// Runs on the host timer thread. It only reads [`FrameCounters`] and never
/// touches GPU objects.
#[derive(Debug)]
pub struct StatsMonitor {
    counters: Arc<FrameCounters>,
    controller: BenchmarkController,
    fps: FpsCounter,
    session: Stopwatch,
    notifications: flume::Sender<HostNotification>,
}

impl StatsMonitor {
    /// Starts a session at `now`.
    pub fn new(
        counters: Arc<FrameCounters>,
        notifications: flume::Sender<HostNotification>,
        fps_interval: Duration,
        now: Instant,
    ) -> Self {
        let mut fps = FpsCounter::new(now, fps_interval);
        // Frames rendered before the monitor existed do not count.
        fps.reset(now, counters.snapshot().total_frames);
        Self {
            counters,
            controller: BenchmarkController::new(),
            fps,
            session: Stopwatch::started_at(now),
            notifications,
        }
    }

    /// Opens a benchmark window and resets the shared benchmark frame counter.
    pub fn start_benchmark(&mut self, now: Instant, duration: Duration) {
        self.counters.begin_benchmark();
        self.controller.start(now, duration);
        self.publish(HostNotification::BenchmarkStatus(
            self.controller.status_text(now).unwrap_or_default(),
        ));
    }

    /// One timer tick.
    ///
    /// Publishes live FPS once per interval, and while a benchmark runs either
    /// its countdown or, once the window has elapsed, its report.
    ///
    /// ## Returns
    /// The delay until the next tick, see [`StatsMonitor::next_delay`].
    pub fn on_timer(&mut self, now: Instant) -> Duration {
        self.publish_due(now);
        self.next_delay(now)
    }

    /// How long the timer may sleep after `now`: until the next live FPS
    /// sample, or until the benchmark window closes if that comes first.
    pub fn next_delay(&self, now: Instant) -> Duration {
        let mut delay = self.fps.until_next_sample(now);
        if let Some(remaining) = self.controller.remaining(now) {
            delay = delay.min(remaining);
        }
        delay.max(MIN_TIMER_DELAY)
    }

    fn publish_due(&mut self, now: Instant) {
        let snapshot = self.counters.snapshot();
        if let Some(fps) = self.fps.sample(now, snapshot.total_frames) {
            self.publish(HostNotification::LiveFps(live_fps_text(
                fps,
                self.session.elapsed_at(now),
            )));
        }

        if !self.controller.is_running() {
            return;
        }
        if self.controller.is_expired(now) {
            let frames = self.counters.end_benchmark();
            if let Some(report) = self.controller.finish(now, frames) {
                self.publish(HostNotification::BenchmarkReport(report));
            }
        } else if let Some(status) = self.controller.status_text(now) {
            self.publish(HostNotification::BenchmarkStatus(status));
        }
    }

    /// The benchmark state machine.
    pub fn controller(&self) -> &BenchmarkController {
        &self.controller
    }

    fn publish(&self, notification: HostNotification) {
        if self.notifications.send(notification).is_err() {
            log::debug!("Notification dropped, the host has gone away");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use swarm_core::benchmark::PerformanceRating;

    fn monitor(now: Instant) -> (StatsMonitor, Arc<FrameCounters>, flume::Receiver<HostNotification>) {
        let counters = Arc::new(FrameCounters::new());
        let (tx, rx) = flume::unbounded();
        let monitor = StatsMonitor::new(Arc::clone(&counters), tx, Duration::from_secs(1), now);
        (monitor, counters, rx)
    }

    #[test]
    fn live_fps_once_per_second() {
        let t0 = Instant::now();
        let (mut monitor, counters, rx) = monitor(t0);
        for _ in 0..60 {
            counters.record_frame();
        }

        monitor.on_timer(t0 + Duration::from_millis(500));
        assert!(rx.try_recv().is_err());

        monitor.on_timer(t0 + Duration::from_secs(1));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostNotification::LiveFps("FPS: 60.0 | Time: 1s".to_string())
        );
    }

    #[test]
    fn benchmark_counts_only_frames_after_start() {
        let t0 = Instant::now();
        let (mut monitor, counters, rx) = monitor(t0);
        for _ in 0..500 {
            counters.record_frame();
        }

        monitor.start_benchmark(t0, Duration::from_secs(5));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostNotification::BenchmarkStatus("Testing... 5s remaining".to_string())
        );
        for _ in 0..150 {
            counters.record_frame();
        }

        monitor.on_timer(t0 + Duration::from_secs(5));
        let report = rx
            .try_iter()
            .find_map(|n| match n {
                HostNotification::BenchmarkReport(report) => Some(report),
                _ => None,
            })
            .expect("report after the window");
        assert_eq!(report.frames_rendered, 150);
        assert_eq!(report.rating, PerformanceRating::Good);
        assert!(!counters.snapshot().benchmark_active);

        // Reported once.
        monitor.on_timer(t0 + Duration::from_secs(7));
        assert!(rx
            .try_iter()
            .all(|n| !matches!(n, HostNotification::BenchmarkReport(_))));
    }

    #[test]
    fn window_closes_on_time_between_fps_ticks() {
        let t0 = Instant::now();
        let (mut monitor, counters, rx) = monitor(t0);
        let window = Duration::from_millis(1500);
        monitor.start_benchmark(t0, window);
        assert_eq!(monitor.next_delay(t0), Duration::from_secs(1));

        for _ in 0..30 {
            counters.record_frame();
        }
        let delay = monitor.on_timer(t0 + Duration::from_secs(1));
        assert_eq!(delay, Duration::from_millis(500));

        for _ in 0..15 {
            counters.record_frame();
        }
        let delay = monitor.on_timer(t0 + Duration::from_secs(1) + delay);
        let report = rx
            .try_iter()
            .find_map(|n| match n {
                HostNotification::BenchmarkReport(report) => Some(report),
                _ => None,
            })
            .expect("report once the window closes");
        assert_eq!(report.elapsed_ms, 1500);
        assert_eq!(report.frames_rendered, 45);
        assert_relative_eq!(report.average_fps, 30.0);
        // Back to the live FPS cadence.
        assert_eq!(delay, Duration::from_millis(500));
    }

    #[test]
    fn window_shorter_than_fps_interval_is_not_stretched() {
        let t0 = Instant::now();
        let counters = Arc::new(FrameCounters::new());
        let (tx, _rx) = flume::unbounded();
        let mut monitor = StatsMonitor::new(Arc::clone(&counters), tx, Duration::from_secs(10), t0);

        monitor.start_benchmark(t0, Duration::from_secs(5));
        assert_eq!(monitor.next_delay(t0), Duration::from_secs(5));

        monitor.on_timer(t0 + Duration::from_secs(5));
        assert_eq!(
            monitor.controller().last_report().map(|r| r.elapsed_ms),
            Some(5000)
        );
        assert_eq!(monitor.next_delay(t0 + Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn benchmark_can_be_restarted_after_a_report() {
        let t0 = Instant::now();
        let (mut monitor, counters, rx) = monitor(t0);
        monitor.start_benchmark(t0, Duration::from_secs(1));
        for _ in 0..20 {
            counters.record_frame();
        }
        monitor.on_timer(t0 + Duration::from_secs(1));
        assert!(monitor.controller().last_report().is_some());

        let t1 = t0 + Duration::from_secs(3);
        monitor.start_benchmark(t1, Duration::from_secs(2));
        for _ in 0..120 {
            counters.record_frame();
        }
        monitor.on_timer(t1 + Duration::from_secs(2));

        let reports: Vec<_> = rx
            .try_iter()
            .filter_map(|n| match n {
                HostNotification::BenchmarkReport(report) => Some(report),
                _ => None,
            })
            .collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].frames_rendered, 120);
        assert_relative_eq!(reports[1].average_fps, 60.0);
    }

    #[test]
    fn countdown_while_running() {
        let t0 = Instant::now();
        let (mut monitor, _counters, rx) = monitor(t0);
        monitor.start_benchmark(t0, Duration::from_secs(5));
        while rx.try_recv().is_ok() {}

        monitor.on_timer(t0 + Duration::from_millis(2500));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostNotification::BenchmarkStatus("Testing... 3s remaining".to_string())
        );
    }
}
