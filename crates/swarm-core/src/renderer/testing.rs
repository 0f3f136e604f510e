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

//! In-memory renderer doubles for tests.
//!
//! [`RecordingDevice`] tracks live objects and uniform writes and can be told
//! to fail a compile stage or the link step. [`RecordingRenderSystem`] records
//! every submitted frame into a shared [`RenderLog`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::api::*;
use super::error::{PipelineError, RenderError, ResourceError, ShaderError};
use super::traits::{GraphicsDevice, RenderSystem};

/// Uniform block layout reported by [`RecordingDevice`]. Mirrors the std140
/// offsets of the sphere shaders' `Uniforms` struct.
pub const UNIFORM_LAYOUT: &[(&str, u32)] = &[
    ("view_projection", 0),
    ("light_pos", 64),
    ("time", 76),
    ("camera_pos", 80),
];

/// Size in bytes of the uniform block described by [`UNIFORM_LAYOUT`].
pub const UNIFORM_BLOCK_SIZE: u32 = 96;

#[derive(Debug, Default)]
struct DeviceState {
    next_id: usize,
    shader_modules: HashMap<ShaderModuleId, ShaderStage>,
    pipelines: HashSet<RenderPipelineId>,
    buffers: HashMap<BufferId, usize>,
    bindings: HashSet<VertexBindingId>,
    uniform_writes: Vec<(RenderPipelineId, UniformLocation, UniformValue)>,
    failing_stage: Option<ShaderStage>,
    failing_link: bool,
    missing_uniforms: HashSet<String>,
}

impl DeviceState {
    fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

/// A `GraphicsDevice` that keeps everything in memory.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: Mutex<DeviceState>,
}

impl RecordingDevice {
    /// A device on which every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes compilation of `stage` fail from now on.
    pub fn fail_compile(self, stage: ShaderStage) -> Self {
        self.state().failing_stage = Some(stage);
        self
    }

    /// Makes every pipeline link fail from now on.
    pub fn fail_link(self) -> Self {
        self.state().failing_link = true;
        self
    }

    /// Removes `name` from the reflected uniform block.
    pub fn without_uniform(self, name: &str) -> Self {
        self.state().missing_uniforms.insert(name.to_string());
        self
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Buffers, bindings, pipelines and shader modules still alive.
    pub fn live_object_count(&self) -> usize {
        let s = self.state();
        s.buffers.len() + s.bindings.len() + s.pipelines.len() + s.shader_modules.len()
    }

    /// Buffers still alive.
    pub fn live_buffer_count(&self) -> usize {
        self.state().buffers.len()
    }

    /// Vertex bindings still alive.
    pub fn live_binding_count(&self) -> usize {
        self.state().bindings.len()
    }

    /// Pipelines still alive.
    pub fn live_pipeline_count(&self) -> usize {
        self.state().pipelines.len()
    }

    /// Shader modules still alive.
    pub fn live_shader_module_count(&self) -> usize {
        self.state().shader_modules.len()
    }

    /// Every uniform write so far, in order.
    pub fn uniform_writes(&self) -> Vec<(RenderPipelineId, UniformLocation, UniformValue)> {
        self.state().uniform_writes.clone()
    }

    /// Forgets recorded uniform writes.
    pub fn clear_uniform_writes(&self) {
        self.state().uniform_writes.clear();
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let mut s = self.state();
        if s.failing_stage == Some(descriptor.stage) {
            return Err(ShaderError::CompilationFailed {
                stage: descriptor.stage,
                label: descriptor.label.to_string(),
                details: "injected compile failure".to_string(),
            }
            .into());
        }
        let id = ShaderModuleId(s.next_id());
        s.shader_modules.insert(id, descriptor.stage);
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        match self.state().shader_modules.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ShaderError::NotFound { id }.into()),
        }
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        let mut s = self.state();
        for module in [descriptor.vertex_module, descriptor.fragment_module] {
            if !s.shader_modules.contains_key(&module) {
                return Err(PipelineError::InvalidShaderModule { id: module }.into());
            }
        }
        if s.failing_link {
            return Err(PipelineError::LinkFailed {
                label: descriptor.label.as_deref().map(String::from),
                details: "injected link failure".to_string(),
            }
            .into());
        }
        let id = RenderPipelineId(s.next_id());
        s.pipelines.insert(id);
        Ok(id)
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        if self.state().pipelines.remove(&id) {
            Ok(())
        } else {
            Err(PipelineError::InvalidRenderPipeline { id }.into())
        }
    }

    fn uniform_location(&self, pipeline: RenderPipelineId, name: &str) -> Option<UniformLocation> {
        let s = self.state();
        if !s.pipelines.contains(&pipeline) || s.missing_uniforms.contains(name) {
            return None;
        }
        UNIFORM_LAYOUT
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, offset)| UniformLocation(*offset))
    }

    fn set_uniform(
        &self,
        pipeline: RenderPipelineId,
        location: UniformLocation,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let mut s = self.state();
        if !s.pipelines.contains(&pipeline) {
            return Err(PipelineError::InvalidRenderPipeline { id: pipeline }.into());
        }
        if location.0 as usize + value.as_bytes().len() > UNIFORM_BLOCK_SIZE as usize {
            return Err(ResourceError::OutOfBounds);
        }
        s.uniform_writes.push((pipeline, location, value));
        Ok(())
    }

    fn create_buffer_with_data(
        &self,
        _descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let mut s = self.state();
        let id = BufferId(s.next_id());
        s.buffers.insert(id, data.len());
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        match self.state().buffers.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ResourceError::NotFound),
        }
    }

    fn create_vertex_binding(
        &self,
        descriptor: &VertexBindingDescriptor,
    ) -> Result<VertexBindingId, ResourceError> {
        let mut s = self.state();
        let all_present = descriptor
            .vertex_buffers
            .iter()
            .chain(std::iter::once(&descriptor.index_buffer))
            .all(|b| s.buffers.contains_key(b));
        if !all_present {
            return Err(ResourceError::NotFound);
        }
        let id = VertexBindingId(s.next_id());
        s.bindings.insert(id);
        Ok(id)
    }

    fn destroy_vertex_binding(&self, id: VertexBindingId) -> Result<(), ResourceError> {
        if self.state().bindings.remove(&id) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn get_adapter_info(&self) -> RendererAdapterInfo {
        RendererAdapterInfo {
            name: "Recording Device".to_string(),
            backend: "Memory".to_string(),
            device_type: "Cpu".to_string(),
            driver: String::new(),
        }
    }
}

/// What a [`RecordingRenderSystem`] has seen.
#[derive(Debug, Default, Clone)]
pub struct RenderLog {
    /// Draws of every rendered frame, in order.
    pub frames: Vec<Vec<DrawCommand>>,
    /// Every resize request, ignored ones included.
    pub resizes: Vec<(u32, u32)>,
    /// Set once `shutdown` ran.
    pub shut_down: bool,
}

/// A `RenderSystem` that records submissions instead of presenting them.
#[derive(Debug)]
pub struct RecordingRenderSystem {
    device: Arc<RecordingDevice>,
    size: (u32, u32),
    log: Arc<Mutex<RenderLog>>,
    pending_skips: u32,
    last_stats: RenderStats,
}

impl RecordingRenderSystem {
    /// Creates a render system over `device` with an initial surface size.
    pub fn new(device: Arc<RecordingDevice>, width: u32, height: u32) -> Self {
        Self {
            device,
            size: (width, height),
            log: Arc::default(),
            pending_skips: 0,
            last_stats: RenderStats::default(),
        }
    }

    /// The next `count` frames are dropped the way a lost surface drops them:
    /// nothing is recorded and the previous stats are returned again.
    pub fn skip_frames(&mut self, count: u32) {
        self.pending_skips += count;
    }

    /// A handle to the log that stays readable after the system is moved away.
    pub fn log_handle(&self) -> Arc<Mutex<RenderLog>> {
        Arc::clone(&self.log)
    }

    fn log(&self) -> MutexGuard<'_, RenderLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderSystem for RecordingRenderSystem {
    fn resize(&mut self, new_width: u32, new_height: u32) {
        self.log().resizes.push((new_width, new_height));
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, frame: &FrameSubmission<'_>) -> Result<RenderStats, RenderError> {
        if self.pending_skips > 0 {
            self.pending_skips -= 1;
            return Ok(self.last_stats);
        }
        let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        log.frames.push(frame.draws.to_vec());
        self.last_stats = RenderStats {
            frame_number: log.frames.len() as u64,
            draw_calls: frame.draws.len() as u32,
            triangles_rendered: frame
                .draws
                .iter()
                .map(|d| (d.index_count / 3) as u64 * d.instance_count as u64)
                .sum(),
        };
        Ok(self.last_stats)
    }

    fn get_adapter_info(&self) -> Option<RendererAdapterInfo> {
        Some(self.device.get_adapter_info())
    }

    fn graphics_device(&self) -> Arc<dyn GraphicsDevice> {
        self.device.clone()
    }

    fn shutdown(&mut self) {
        self.log().shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn vertex_desc() -> ShaderModuleDescriptor<'static> {
        ShaderModuleDescriptor {
            label: "vs",
            source: ShaderSourceData::Wgsl(Cow::Borrowed("")),
            stage: ShaderStage::Vertex,
            entry_point: "vs_main",
        }
    }

    #[test]
    fn injected_compile_failure_names_stage() {
        let device = RecordingDevice::new().fail_compile(ShaderStage::Vertex);
        let err = device.create_shader_module(&vertex_desc()).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Shader(ShaderError::CompilationFailed {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
        assert_eq!(device.live_object_count(), 0);
    }

    #[test]
    fn binding_requires_existing_buffers() {
        let device = RecordingDevice::new();
        let desc = BufferDescriptor {
            label: None,
            usage: BufferUsage::Vertex,
        };
        let vb = device.create_buffer_with_data(&desc, &[0; 12]).unwrap();
        let binding = VertexBindingDescriptor {
            label: None,
            vertex_buffers: Cow::Owned(vec![vb]),
            index_buffer: BufferId(999),
            index_format: IndexFormat::Uint16,
        };
        assert_eq!(
            device.create_vertex_binding(&binding),
            Err(ResourceError::NotFound)
        );
    }
}
