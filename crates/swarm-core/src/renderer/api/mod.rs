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

//! Data types exchanged between the render lanes and a graphics backend.

pub mod adapter;
pub mod buffer;
pub mod draw;
pub mod pipeline;
pub mod shader;

pub use self::adapter::RendererAdapterInfo;
pub use self::buffer::{BufferDescriptor, BufferId, BufferUsage, IndexFormat};
pub use self::draw::{
    DrawCommand, FrameSubmission, RenderStats, VertexBindingDescriptor, VertexBindingId,
};
pub use self::pipeline::{
    CullMode, RenderPipelineDescriptor, RenderPipelineId, UniformLocation, UniformValue,
    VertexAttributeDescriptor, VertexBufferLayoutDescriptor, VertexFormat, VertexStepMode,
};
pub use self::shader::{ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, ShaderStage};
