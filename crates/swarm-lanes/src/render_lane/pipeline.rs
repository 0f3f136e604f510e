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

use std::borrow::Cow;

use swarm_core::renderer::{
    CullMode, GraphicsDevice, RenderPipelineDescriptor, RenderPipelineId, ResourceError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, ShaderStage, UniformLocation,
};

use super::gpu_resources::sphere_vertex_layouts;
use super::shaders::{
    FRAGMENT_ENTRY_POINT, SPHERE_INSTANCED_WGSL, SPHERE_PHONG_WGSL, VERTEX_ENTRY_POINT,
};

/// Build state of the sphere pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Nothing has been built on the current surface.
    Uncompiled,
    /// A build is in progress.
    Compiling,
    /// The pipeline is ready to draw with.
    Linked(RenderPipelineId),
    /// The build failed. Terminal until the pipeline is released with the surface.
    Failed(ResourceError),
}

/// Uniform slots resolved once after link. `None` means the linked program does
/// not declare that uniform and writes to it are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformLocations {
    /// `time`
    pub time: Option<UniformLocation>,
    /// `light_pos`
    pub light_pos: Option<UniformLocation>,
    /// `view_projection`
    pub view_projection: Option<UniformLocation>,
    /// `camera_pos`
    pub camera_pos: Option<UniformLocation>,
}

impl UniformLocations {
    fn resolve(device: &dyn GraphicsDevice, pipeline: RenderPipelineId) -> Self {
        let lookup = |name: &str| {
            let location = device.uniform_location(pipeline, name);
            if location.is_none() {
                log::warn!("Uniform '{name}' not found in the sphere pipeline; updates will be skipped");
            }
            location
        };
        Self {
            time: lookup("time"),
            light_pos: lookup("light_pos"),
            view_projection: lookup("view_projection"),
            camera_pos: lookup("camera_pos"),
        }
    }

    /// Number of uniforms that were found.
    pub fn resolved_count(&self) -> usize {
        [self.time, self.light_pos, self.view_projection, self.camera_pos]
            .iter()
            .filter(|l| l.is_some())
            .count()
    }
}

/// Compiles and links the instanced sphere program and caches its uniform slots.
///
/// `Uncompiled -> Compiling -> Linked`, or `-> Failed` on the first error. A
/// failed build is never retried; [`ShaderPipeline::release`] returns the
/// pipeline to `Uncompiled` for the next surface.
#[derive(Debug)]
pub struct ShaderPipeline {
    state: PipelineState,
    uniforms: UniformLocations,
}

impl ShaderPipeline {
    /// A pipeline in the `Uncompiled` state.
    pub fn new() -> Self {
        Self {
            state: PipelineState::Uncompiled,
            uniforms: UniformLocations::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The linked pipeline, if any.
    pub fn pipeline_id(&self) -> Option<RenderPipelineId> {
        match self.state {
            PipelineState::Linked(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` once the build failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, PipelineState::Failed(_))
    }

    /// Cached uniform slots. All `None` unless linked.
    pub fn uniforms(&self) -> &UniformLocations {
        &self.uniforms
    }

    /// Builds the pipeline on `device`.
    ///
    /// ## Returns
    /// The linked pipeline. Calling again once linked returns the same ID; once
    /// failed, returns the original error without touching the device.
    pub fn build(&mut self, device: &dyn GraphicsDevice) -> Result<RenderPipelineId, ResourceError> {
        match &self.state {
            PipelineState::Linked(id) => return Ok(*id),
            PipelineState::Failed(e) => return Err(e.clone()),
            PipelineState::Uncompiled | PipelineState::Compiling => {}
        }

        self.state = PipelineState::Compiling;
        match Self::compile_and_link(device) {
            Ok(id) => {
                self.uniforms = UniformLocations::resolve(device, id);
                self.state = PipelineState::Linked(id);
                log::info!(
                    "Sphere pipeline linked ({}/4 uniforms resolved)",
                    self.uniforms.resolved_count()
                );
                Ok(id)
            }
            Err(e) => {
                log::error!("Sphere pipeline build failed: {e}");
                self.state = PipelineState::Failed(e.clone());
                Err(e)
            }
        }
    }

    fn compile_and_link(device: &dyn GraphicsDevice) -> Result<RenderPipelineId, ResourceError> {
        let vertex = device.create_shader_module(&ShaderModuleDescriptor {
            label: "sphere_instanced",
            source: ShaderSourceData::Wgsl(Cow::Borrowed(SPHERE_INSTANCED_WGSL)),
            stage: ShaderStage::Vertex,
            entry_point: VERTEX_ENTRY_POINT,
        })?;

        let fragment = match device.create_shader_module(&ShaderModuleDescriptor {
            label: "sphere_phong",
            source: ShaderSourceData::Wgsl(Cow::Borrowed(SPHERE_PHONG_WGSL)),
            stage: ShaderStage::Fragment,
            entry_point: FRAGMENT_ENTRY_POINT,
        }) {
            Ok(id) => id,
            Err(e) => {
                Self::destroy_modules(device, &[vertex]);
                return Err(e);
            }
        };

        let layouts = sphere_vertex_layouts();
        let linked = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(Cow::Borrowed("Sphere Swarm Pipeline")),
            vertex_module: vertex,
            fragment_module: fragment,
            vertex_buffers: Cow::Borrowed(&layouts),
            cull_mode: CullMode::Back,
            depth_test: true,
        });

        // The linked program keeps what it needs from the modules.
        Self::destroy_modules(device, &[vertex, fragment]);
        linked
    }

    fn destroy_modules(device: &dyn GraphicsDevice, modules: &[ShaderModuleId]) {
        for &id in modules {
            if let Err(e) = device.destroy_shader_module(id) {
                log::warn!("Failed to destroy shader module {id:?}: {e}");
            }
        }
    }

    /// Destroys the linked pipeline and forgets the cached uniforms. A failed or
    /// never-built pipeline is simply reset.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        if let PipelineState::Linked(id) = self.state {
            if let Err(e) = device.destroy_render_pipeline(id) {
                log::warn!("Failed to destroy render pipeline {id:?}: {e}");
            }
            log::info!("Released sphere pipeline");
        }
        self.state = PipelineState::Uncompiled;
        self.uniforms = UniformLocations::default();
    }
}

impl Default for ShaderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::renderer::testing::RecordingDevice;
    use swarm_core::renderer::{PipelineError, ShaderError};

    #[test]
    fn build_links_and_resolves_all_uniforms() {
        let device = RecordingDevice::new();
        let mut pipeline = ShaderPipeline::new();
        assert_eq!(*pipeline.state(), PipelineState::Uncompiled);

        let id = pipeline.build(&device).unwrap();
        assert_eq!(*pipeline.state(), PipelineState::Linked(id));
        assert_eq!(pipeline.uniforms().resolved_count(), 4);
        assert_eq!(pipeline.uniforms().light_pos, Some(UniformLocation(64)));
        // Stage modules are dropped after link.
        assert_eq!(device.live_shader_module_count(), 0);
        assert_eq!(device.live_pipeline_count(), 1);

        assert_eq!(pipeline.build(&device).unwrap(), id);
        assert_eq!(device.live_pipeline_count(), 1);
    }

    #[test]
    fn fragment_compile_failure_is_terminal() {
        let device = RecordingDevice::new().fail_compile(ShaderStage::Fragment);
        let mut pipeline = ShaderPipeline::new();

        let err = pipeline.build(&device).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Shader(ShaderError::CompilationFailed {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        assert!(pipeline.is_failed());
        assert_eq!(pipeline.pipeline_id(), None);
        assert_eq!(device.live_object_count(), 0);

        // Not retried.
        assert_eq!(pipeline.build(&device).unwrap_err(), err);
    }

    #[test]
    fn link_failure_cleans_up_modules() {
        let device = RecordingDevice::new().fail_link();
        let mut pipeline = ShaderPipeline::new();
        let err = pipeline.build(&device).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Pipeline(PipelineError::LinkFailed { .. })
        ));
        assert_eq!(device.live_object_count(), 0);
    }

    #[test]
    fn missing_uniform_is_not_an_error() {
        let device = RecordingDevice::new().without_uniform("camera_pos");
        let mut pipeline = ShaderPipeline::new();
        pipeline.build(&device).unwrap();
        assert_eq!(pipeline.uniforms().camera_pos, None);
        assert_eq!(pipeline.uniforms().resolved_count(), 3);
    }

    #[test]
    fn release_resets_to_uncompiled() {
        let device = RecordingDevice::new();
        let mut pipeline = ShaderPipeline::new();
        pipeline.build(&device).unwrap();
        pipeline.release(&device);
        pipeline.release(&device);
        assert_eq!(*pipeline.state(), PipelineState::Uncompiled);
        assert_eq!(*pipeline.uniforms(), UniformLocations::default());
        assert_eq!(device.live_object_count(), 0);
    }
}
