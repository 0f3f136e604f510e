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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// Resource management half of a graphics backend.
///
/// Every method is called from the render thread only. Implementations are
/// still `Send + Sync` so they can be shared behind an `Arc` with the render
/// system that owns the surface.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Compiles one shader stage.
    /// ## Arguments
    /// * `descriptor` - Source, stage and entry point of the module.
    /// ## Returns
    /// The ID of the compiled module.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::CompilationFailed)` - The source failed to parse or validate.
    /// * `ResourceError::Shader(ShaderError::InvalidEntryPoint)` - The entry point does not exist for the stage.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Destroys a shader module. Pipelines already linked from it stay valid.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::NotFound)` - The ID is unknown.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Links a vertex and a fragment module into a render pipeline and
    /// allocates its uniform block.
    /// ## Errors
    /// * `ResourceError::Pipeline(PipelineError::LinkFailed)` - The backend rejected the pipeline.
    /// * `ResourceError::Pipeline(PipelineError::InvalidShaderModule)` - A module ID is unknown.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError>;

    /// Destroys a render pipeline and its uniform block.
    /// ## Errors
    /// * `ResourceError::Pipeline(PipelineError::InvalidRenderPipeline)` - The ID is unknown.
    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError>;

    /// Looks up a member of the pipeline's uniform block by name.
    /// ## Returns
    /// `None` when the pipeline does not declare the uniform. That is not an error:
    /// callers skip writes to uniforms that are absent.
    fn uniform_location(&self, pipeline: RenderPipelineId, name: &str) -> Option<UniformLocation>;

    /// Writes one uniform value. The write is visible to the next submitted frame.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - The value does not fit at `location`.
    /// * `ResourceError::Pipeline(PipelineError::InvalidRenderPipeline)` - The ID is unknown.
    fn set_uniform(
        &self,
        pipeline: RenderPipelineId,
        location: UniformLocation,
        value: UniformValue,
    ) -> Result<(), ResourceError>;

    /// Creates a GPU buffer initialized with `data`.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a buffer.
    /// ## Errors
    /// * `ResourceError::NotFound` - The ID is unknown.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Groups vertex buffers and an index buffer into a reusable binding.
    /// ## Errors
    /// * `ResourceError::NotFound` - One of the referenced buffers does not exist.
    fn create_vertex_binding(
        &self,
        descriptor: &VertexBindingDescriptor,
    ) -> Result<VertexBindingId, ResourceError>;

    /// Destroys a vertex binding. The buffers it references are left alone.
    /// ## Errors
    /// * `ResourceError::NotFound` - The ID is unknown.
    fn destroy_vertex_binding(&self, id: VertexBindingId) -> Result<(), ResourceError>;

    /// Identification of the underlying adapter.
    fn get_adapter_info(&self) -> RendererAdapterInfo;
}
