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

//! The render-thread half of the benchmark: surface lifecycle and frame ticks.

use std::sync::Arc;

use swarm_core::benchmark::FrameCounters;
use swarm_core::event::HostNotification;
use swarm_core::renderer::{RenderError, RenderStats, RenderSystem, RendererAdapterInfo};
use swarm_core::BenchmarkConfig;
use swarm_lanes::render_lane::InstancedSphereLane;

use crate::render_queue::{RenderOp, RenderOpQueue};

/// Drives one [`InstancedSphereLane`] across surface lifetimes.
///
/// Every method must be called from the render thread. Other threads talk to
/// the engine through [`BenchEngine::render_op_sender`] and read its progress
/// from the shared [`FrameCounters`].
#[derive(Debug)]
pub struct BenchEngine {
    config: BenchmarkConfig,
    instance_seed: Option<u64>,
    counters: Arc<FrameCounters>,
    notifications: flume::Sender<HostNotification>,
    ops: RenderOpQueue,
    render_system: Option<Box<dyn RenderSystem>>,
    lane: Option<InstancedSphereLane>,
    fatal_reported: bool,
}

impl BenchEngine {
    /// Creates an engine with no surface. Notifications go to `notifications`.
    pub fn new(
        config: &BenchmarkConfig,
        counters: Arc<FrameCounters>,
        notifications: flume::Sender<HostNotification>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            instance_seed: None,
            counters,
            notifications,
            ops: RenderOpQueue::new(),
            render_system: None,
            lane: None,
            fatal_reported: false,
        }
    }

    /// Makes every surface's instance layout reproducible.
    pub fn with_instance_seed(mut self, seed: u64) -> Self {
        self.instance_seed = Some(seed);
        self
    }

    /// The sanitized configuration.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Takes ownership of a fresh surface's render system and builds the lane.
    ///
    /// A build failure is reported once as [`HostNotification::FatalError`];
    /// ticks then draw nothing until the surface is recreated.
    pub fn on_surface_created(&mut self, render_system: Box<dyn RenderSystem>) {
        if self.render_system.is_some() {
            log::warn!("Surface created while another is live, releasing the old one first");
            self.on_surface_destroyed();
        }

        match render_system.get_adapter_info() {
            Some(info) => log::info!("Surface created on {info}"),
            None => log::info!("Surface created"),
        }
        self.fatal_reported = false;

        let mut lane = InstancedSphereLane::new(&self.config);
        if let Some(seed) = self.instance_seed {
            lane = lane.with_instance_seed(seed);
        }
        let (width, height) = render_system.surface_size();
        lane.resize(width, height);

        let device = render_system.graphics_device();
        if let Err(e) = lane.on_gpu_init(device.as_ref()) {
            self.report_fatal(format!("Failed to initialize the sphere lane: {e}"));
        }

        self.lane = Some(lane);
        self.render_system = Some(render_system);
    }

    /// Resizes the surface and the camera. Zero sizes are ignored by both.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        if let Some(render_system) = self.render_system.as_mut() {
            render_system.resize(width, height);
        }
        if let Some(lane) = self.lane.as_mut() {
            lane.resize(width, height);
        }
    }

    /// Renders one frame.
    ///
    /// ## Returns
    /// The frame's stats, or `None` when nothing was drawn.
    pub fn on_tick(&mut self) -> Option<RenderStats> {
        self.drain_render_ops();
        if self.fatal_reported {
            return None;
        }
        let (Some(render_system), Some(lane)) = (self.render_system.as_mut(), self.lane.as_mut())
        else {
            return None;
        };

        match lane.render(render_system.as_mut()) {
            Ok(Some(stats)) => {
                self.counters.record_frame();
                Some(stats)
            }
            Ok(None) => None,
            Err(RenderError::SurfaceAcquisitionFailed(reason)) => {
                log::warn!("Frame skipped: {reason}");
                None
            }
            Err(e) => {
                self.report_fatal(format!("Rendering failed: {e}"));
                None
            }
        }
    }

    /// Releases every GPU object, then shuts the render system down and drops it.
    /// Safe to call at any time, repeatedly.
    pub fn on_surface_destroyed(&mut self) {
        self.drain_render_ops();
        self.release_resources();
        self.lane = None;
        if let Some(mut render_system) = self.render_system.take() {
            render_system.shutdown();
            log::info!("Surface destroyed");
        }
    }

    /// A sender for operations other threads want run on the render thread.
    pub fn render_op_sender(&self) -> flume::Sender<RenderOp> {
        self.ops.sender()
    }

    /// Runs every queued [`RenderOp`].
    pub fn drain_render_ops(&mut self) {
        for op in self.ops.drain() {
            match op {
                RenderOp::ReleaseResources => self.release_resources(),
            }
        }
    }

    /// Returns `true` while a surface is attached.
    pub fn has_surface(&self) -> bool {
        self.render_system.is_some()
    }

    /// Returns `true` once a fatal error was reported for the current surface.
    pub fn has_failed(&self) -> bool {
        self.fatal_reported
    }

    /// The adapter of the current surface, if any.
    pub fn adapter_info(&self) -> Option<RendererAdapterInfo> {
        self.render_system.as_ref()?.get_adapter_info()
    }

    /// The lane of the current surface.
    pub fn lane(&self) -> Option<&InstancedSphereLane> {
        self.lane.as_ref()
    }

    fn release_resources(&mut self) {
        if let (Some(render_system), Some(lane)) = (self.render_system.as_ref(), self.lane.as_mut()) {
            let device = render_system.graphics_device();
            lane.on_gpu_shutdown(device.as_ref());
            log::debug!("{} resources released", lane.strategy_name());
        }
    }

    fn report_fatal(&mut self, message: String) {
        log::error!("{message}");
        if self.fatal_reported {
            return;
        }
        self.fatal_reported = true;
        if self
            .notifications
            .send(HostNotification::FatalError(message))
            .is_err()
        {
            log::debug!("Fatal error notification dropped, the host has gone away");
        }
    }
}

impl Drop for BenchEngine {
    fn drop(&mut self) {
        if self.render_system.is_some() {
            log::warn!("BenchEngine dropped with a live surface, releasing it now");
            self.on_surface_destroyed();
        }
    }
}
