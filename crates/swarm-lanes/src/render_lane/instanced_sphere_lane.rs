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

//! The instanced sphere swarm: one indexed, instanced draw per frame.

use swarm_core::geometry::uv_sphere;
use swarm_core::instancing::InstanceSynthesizer;
use swarm_core::renderer::{
    DrawCommand, FrameSubmission, GraphicsDevice, RenderError, RenderPipelineId, RenderStats,
    RenderSystem, ResourceError, UniformLocation, UniformValue,
};
use swarm_core::{BenchmarkConfig, Stopwatch};

use super::animation::light_position;
use super::{Camera, GpuResources, PipelineState, ShaderPipeline};

/// Clear color of the swarm's color target.
pub const CLEAR_COLOR: [f64; 4] = [0.05, 0.05, 0.1, 1.0];

/// A lane that renders N animated spheres with a single instanced draw.
///
/// Lifecycle, all on the render thread:
/// 1. [`InstancedSphereLane::on_gpu_init`] builds the pipeline, generates the
///    mesh and instances, and uploads them.
/// 2. [`InstancedSphereLane::resize`] on every surface size change.
/// 3. [`InstancedSphereLane::render`] once per tick.
/// 4. [`InstancedSphereLane::on_gpu_shutdown`] before the surface goes away.
#[derive(Debug)]
pub struct InstancedSphereLane {
    config: BenchmarkConfig,
    instance_seed: Option<u64>,
    pipeline: ShaderPipeline,
    resources: GpuResources,
    camera: Camera,
    clock: Stopwatch,
    frames_submitted: u64,
    last_frame_number: u64,
}

impl InstancedSphereLane {
    /// Creates a lane for `config`. The config is sanitized here.
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            config: config.sanitized(),
            instance_seed: None,
            pipeline: ShaderPipeline::new(),
            resources: GpuResources::new(),
            camera: Camera::new(),
            clock: Stopwatch::new(),
            frames_submitted: 0,
            last_frame_number: 0,
        }
    }

    /// Makes instance synthesis reproducible.
    pub fn with_instance_seed(mut self, seed: u64) -> Self {
        self.instance_seed = Some(seed);
        self
    }

    /// Identifier used in logs.
    pub fn strategy_name(&self) -> &'static str {
        "InstancedSphere"
    }

    /// The sanitized configuration in use.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Builds GPU state for a new surface.
    ///
    /// ## Errors
    /// Any compile, link or upload error. The pipeline then stays `Failed` and
    /// [`InstancedSphereLane::render`] draws nothing until the next
    /// `on_gpu_shutdown`/`on_gpu_init` cycle.
    pub fn on_gpu_init(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        log::info!(
            "Initializing {} lane: {} instances, {} segments, radius {}",
            self.strategy_name(),
            self.config.instance_count,
            self.config.sphere_segments,
            self.config.sphere_radius
        );

        self.pipeline.build(device)?;

        let mesh = uv_sphere(self.config.sphere_radius, self.config.sphere_segments);
        let mut synthesizer = match self.instance_seed {
            Some(seed) => InstanceSynthesizer::from_seed(seed),
            None => InstanceSynthesizer::new(),
        };
        let instances = synthesizer.generate(self.config.instance_count as usize);
        self.resources.upload(device, &mesh, &instances)?;

        self.clock.restart();
        self.frames_submitted = 0;
        self.last_frame_number = 0;
        Ok(())
    }

    /// Forwards a surface size change to the camera.
    ///
    /// ## Returns
    /// `false` if the size was ignored (a zero dimension).
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.camera.set_viewport(width, height)
    }

    /// Returns `true` when a frame would issue a draw.
    pub fn is_ready(&self) -> bool {
        self.pipeline.pipeline_id().is_some() && self.resources.is_live()
    }

    /// Updates the uniforms for the current time and returns the frame's draw.
    ///
    /// `None` when the pipeline is not linked or nothing is uploaded.
    pub fn prepare_frame(&mut self, device: &dyn GraphicsDevice) -> Option<DrawCommand> {
        let pipeline = self.pipeline.pipeline_id()?;
        if !self.resources.is_live() {
            return None;
        }
        let handle = *self.resources.bind()?;

        let time = self.clock.elapsed_secs_f32();
        self.write_uniforms(device, pipeline, time);

        Some(DrawCommand {
            pipeline,
            binding: handle.binding,
            index_count: handle.index_count,
            instance_count: handle.instance_count,
        })
    }

    fn write_uniforms(&self, device: &dyn GraphicsDevice, pipeline: RenderPipelineId, time: f32) {
        let slots = self.pipeline.uniforms();
        let writes: [(Option<UniformLocation>, UniformValue); 4] = [
            (slots.time, UniformValue::Float(time)),
            (slots.light_pos, UniformValue::Vec3(light_position(time))),
            (
                slots.view_projection,
                UniformValue::Mat4(self.camera.view_projection()),
            ),
            (slots.camera_pos, UniformValue::Vec3(self.camera.position())),
        ];
        for (location, value) in writes {
            let Some(location) = location else { continue };
            if let Err(e) = device.set_uniform(pipeline, location, value) {
                log::warn!("Uniform write at {location:?} failed: {e}");
            }
        }
    }

    /// Renders one frame through `render_system`.
    ///
    /// ## Returns
    /// `Ok(None)` when the lane is not ready, or when the render system skipped
    /// the frame and reported the previous frame number again.
    pub fn render(
        &mut self,
        render_system: &mut dyn RenderSystem,
    ) -> Result<Option<RenderStats>, RenderError> {
        let device = render_system.graphics_device();
        let Some(draw) = self.prepare_frame(device.as_ref()) else {
            return Ok(None);
        };

        let stats = render_system.render(&FrameSubmission {
            clear_color: CLEAR_COLOR,
            draws: std::slice::from_ref(&draw),
        })?;
        if stats.frame_number == self.last_frame_number {
            log::debug!("Frame {} was not presented", stats.frame_number + 1);
            return Ok(None);
        }
        self.last_frame_number = stats.frame_number;
        self.frames_submitted += 1;
        Ok(Some(stats))
    }

    /// Releases the buffers first, then the pipeline. Safe to call repeatedly.
    pub fn on_gpu_shutdown(&mut self, device: &dyn GraphicsDevice) {
        self.resources.release(device);
        self.pipeline.release(device);
    }

    /// Build state of the pipeline.
    pub fn pipeline_state(&self) -> &PipelineState {
        self.pipeline.state()
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Frames submitted since the last `on_gpu_init`.
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swarm_core::renderer::testing::{RecordingDevice, RecordingRenderSystem};
    use swarm_core::renderer::ShaderStage;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            instance_count: 10_000,
            sphere_segments: 8,
            ..Default::default()
        }
    }

    #[test]
    fn one_draw_per_frame_with_all_indices_and_instances() {
        let device = Arc::new(RecordingDevice::new());
        let mut system = RecordingRenderSystem::new(device.clone(), 800, 600);
        let log = system.log_handle();
        let mut lane = InstancedSphereLane::new(&small_config()).with_instance_seed(7);

        lane.on_gpu_init(device.as_ref()).unwrap();
        lane.resize(800, 600);
        let stats = lane.render(&mut system).unwrap().unwrap();

        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.triangles_rendered, 128 * 10_000);
        let log = log.lock().unwrap();
        let frames = &log.frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][0].index_count, 8 * 8 * 6);
        assert_eq!(frames[0][0].instance_count, 10_000);
    }

    #[test]
    fn config_is_sanitized() {
        let lane = InstancedSphereLane::new(&BenchmarkConfig {
            instance_count: 1,
            ..Default::default()
        });
        assert_eq!(lane.config().instance_count, 10_000);
    }

    #[test]
    fn failed_pipeline_renders_nothing() {
        let device = Arc::new(RecordingDevice::new().fail_compile(ShaderStage::Vertex));
        let mut system = RecordingRenderSystem::new(device.clone(), 800, 600);
        let mut lane = InstancedSphereLane::new(&small_config());

        assert!(lane.on_gpu_init(device.as_ref()).is_err());
        assert!(!lane.is_ready());
        assert_eq!(lane.render(&mut system).unwrap(), None);
        assert!(system.log_handle().lock().unwrap().frames.is_empty());
        // Nothing was uploaded after the failed build.
        assert_eq!(device.live_object_count(), 0);
    }

    #[test]
    fn shutdown_releases_everything() {
        let device = Arc::new(RecordingDevice::new());
        let mut lane = InstancedSphereLane::new(&small_config());
        lane.on_gpu_init(device.as_ref()).unwrap();
        assert!(device.live_object_count() > 0);

        lane.on_gpu_shutdown(device.as_ref());
        lane.on_gpu_shutdown(device.as_ref());
        assert_eq!(device.live_object_count(), 0);
        assert_eq!(*lane.pipeline_state(), PipelineState::Uncompiled);
    }
}
