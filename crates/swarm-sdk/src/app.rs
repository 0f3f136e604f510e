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

//! The desktop host: a `winit` application driving a [`BenchEngine`].

use std::sync::{Arc, Mutex};
use std::time::Instant;

use swarm_core::benchmark::FrameCounters;
use swarm_core::event::{HostNotification, NotificationBus};
use swarm_core::renderer::RenderError;
use swarm_core::BenchmarkConfig;
use swarm_infra::{WgpuRenderSystem, WinitWindow, WinitWindowBuilder};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::engine::BenchEngine;
use crate::monitor::StatsMonitor;
use crate::render_queue::RenderOp;
use crate::timer::RepeatingTimer;

const WINDOW_TITLE: &str = "Swarm";

/// Text shown in the window title, rebuilt from notifications.
#[derive(Debug, Default)]
struct StatusLine {
    adapter: Option<String>,
    live_fps: Option<String>,
    benchmark: Option<String>,
}

impl StatusLine {
    fn apply(&mut self, notification: &HostNotification) {
        match notification {
            HostNotification::LiveFps(text) => self.live_fps = Some(text.clone()),
            HostNotification::BenchmarkStatus(_)
            | HostNotification::BenchmarkReport(_)
            | HostNotification::FatalError(_) => {
                self.benchmark = Some(notification.display_text());
            }
        }
    }

    fn title(&self) -> String {
        [Some(WINDOW_TITLE), self.adapter.as_deref(), self.live_fps.as_deref(), self.benchmark.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// The internal state of the running host, managed by the winit event loop.
pub(crate) struct SwarmApp {
    config: BenchmarkConfig,
    bus: NotificationBus,
    counters: Arc<FrameCounters>,
    engine: BenchEngine,
    window: Option<WinitWindow>,
    monitor: Option<Arc<Mutex<StatsMonitor>>>,
    timer: Option<RepeatingTimer>,
    status: StatusLine,
    fatal_error: Option<String>,
}

impl SwarmApp {
    pub(crate) fn new(config: BenchmarkConfig) -> Self {
        let config = config.sanitized();
        let bus = NotificationBus::new();
        let counters = Arc::new(FrameCounters::new());
        let engine = BenchEngine::new(&config, Arc::clone(&counters), bus.sender());
        Self {
            config,
            bus,
            counters,
            engine,
            window: None,
            monitor: None,
            timer: None,
            status: StatusLine::default(),
            fatal_error: None,
        }
    }

    /// The first fatal error seen during the run, if any.
    pub(crate) fn fatal_error(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    fn start_surface(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Application resumed. Initializing window and render system...");

        // 1. Create the window using the builder from swarm-infra.
        let window = match WinitWindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .build(event_loop)
        {
            Ok(window) => window,
            Err(e) => {
                self.abandon(event_loop, format!("Failed to create window: {e}"));
                return;
            }
        };

        // 2. Create the renderer; an unsupported adapter ends the run.
        let render_system = match WgpuRenderSystem::new(&window) {
            Ok(render_system) => render_system,
            Err(e @ RenderError::UnsupportedPlatform { .. }) => {
                self.abandon(event_loop, e.to_string());
                return;
            }
            Err(e) => {
                self.abandon(event_loop, format!("Failed to initialize rendering: {e}"));
                return;
            }
        };

        // 3. Hand the surface to the engine.
        self.engine.on_surface_created(Box::new(render_system));
        let (width, height) = window.inner_size();
        self.engine.on_surface_changed(width, height);
        self.status.adapter = self.engine.adapter_info().map(|info| info.name);

        // 4. Start the statistics timer.
        let now = Instant::now();
        let mut monitor = StatsMonitor::new(
            Arc::clone(&self.counters),
            self.bus.sender(),
            self.config.fps_report_interval(),
            now,
        );
        if self.config.auto_start_benchmark {
            monitor.start_benchmark(now, self.config.sample_window());
        }
        let first_delay = monitor.next_delay(now);
        let monitor = Arc::new(Mutex::new(monitor));
        let fallback_delay = self.config.fps_report_interval();
        let timer_monitor = Arc::clone(&monitor);
        self.timer = match RepeatingTimer::start(
            "swarm-stats",
            first_delay,
            move |now| match timer_monitor.lock() {
                Ok(mut monitor) => monitor.on_timer(now),
                Err(e) => {
                    log::error!("Mutex poisoned (stats monitor): {e}");
                    fallback_delay
                }
            },
        ) {
            Ok(timer) => Some(timer),
            Err(e) => {
                log::error!("Failed to start the statistics timer: {e}");
                None
            }
        };

        self.monitor = Some(monitor);
        self.window = Some(window);
    }

    /// Opens a new benchmark window, discarding the previous report.
    fn restart_benchmark(&mut self) {
        let Some(monitor) = &self.monitor else {
            return;
        };
        match monitor.lock() {
            Ok(mut monitor) => monitor.start_benchmark(Instant::now(), self.config.sample_window()),
            Err(e) => {
                log::error!("Mutex poisoned (stats monitor): {e}");
                return;
            }
        }
        // The timer may be sleeping past the new window's deadline.
        if let Some(timer) = &self.timer {
            timer.wake();
        }
    }

    /// Teardown, in order: timer, queued release, surface, window.
    fn stop_surface(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.monitor = None;
        if self.engine.has_surface() {
            let _ = self.engine.render_op_sender().send(RenderOp::ReleaseResources);
            self.engine.drain_render_ops();
            self.engine.on_surface_destroyed();
        }
        if self.window.take().is_some() {
            log::info!("Window released");
        }
    }

    fn abandon(&mut self, event_loop: &ActiveEventLoop, message: String) {
        log::error!("{message}");
        self.bus.publish(HostNotification::FatalError(message));
        self.drain_notifications();
        self.stop_surface();
        event_loop.exit();
    }

    fn drain_notifications(&mut self) {
        let notifications = self.bus.drain();
        if notifications.is_empty() {
            return;
        }
        for notification in &notifications {
            match notification {
                HostNotification::LiveFps(text) | HostNotification::BenchmarkStatus(text) => {
                    log::debug!("{text}");
                }
                HostNotification::BenchmarkReport(report) => log::info!("{report}"),
                HostNotification::FatalError(text) => {
                    if self.fatal_error.is_none() {
                        self.fatal_error = Some(text.clone());
                    }
                }
            }
            self.status.apply(notification);
        }
        if let Some(window) = &self.window {
            window.set_title(&self.status.title());
        }
    }
}

impl ApplicationHandler for SwarmApp {
    /// Called when the event loop is ready to start processing events.
    /// This is the ideal place to create the window and its surface.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        self.start_surface(event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(WinitWindow::id) != Some(id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                self.stop_surface();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::info!("Window resized to: {}x{}", size.width, size.height);
                self.engine.on_surface_changed(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyR),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                log::info!("Benchmark restart requested");
                self.restart_benchmark();
            }
            WindowEvent::RedrawRequested => {
                if let Some(stats) = self.engine.on_tick() {
                    log::trace!("Frame {} rendered.", stats.frame_number);
                }
            }
            _ => {}
        }
    }

    /// Called when the event loop has processed all pending events and is about to wait.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.drain_notifications();
        if self.engine.has_failed() {
            log::error!("Rendering abandoned, exiting event loop...");
            self.stop_surface();
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Application suspended, releasing the surface");
        self.stop_surface();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop_surface();
        self.drain_notifications();
        log::info!("Swarm host shutdown complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::benchmark::BenchmarkSample;

    #[test]
    fn title_joins_available_parts() {
        let mut status = StatusLine::default();
        assert_eq!(status.title(), "Swarm");

        status.adapter = Some("Test GPU".to_string());
        status.apply(&HostNotification::LiveFps("FPS: 60.0 | Time: 3s".to_string()));
        assert_eq!(status.title(), "Swarm | Test GPU | FPS: 60.0 | Time: 3s");

        let report = BenchmarkSample {
            window_duration_ms: 5000,
            elapsed_ms: 5000,
            frames_rendered: 300,
        }
        .into_report();
        status.apply(&HostNotification::BenchmarkReport(report));
        assert!(status.title().ends_with("Average FPS: 60.0 | Rating: Outstanding"));
    }
}
