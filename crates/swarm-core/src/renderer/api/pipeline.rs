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

use super::shader::ShaderModuleId;
use crate::math::{Mat4, Vec3};
use std::borrow::Cow;

/// An opaque handle to a linked render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPipelineId(pub usize);

/// The format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
}

impl VertexFormat {
    /// Size in bytes of one attribute value.
    pub const fn size(&self) -> u64 {
        match self {
            VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// How often a vertex buffer advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Advance once per vertex.
    #[default]
    Vertex,
    /// Advance once per instance (an attribute divisor of 1).
    Instance,
}

/// One attribute read from a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// Attribute format.
    pub format: VertexFormat,
    /// Byte offset inside one element of the buffer.
    pub offset: u64,
    /// `@location(n)` in the vertex shader.
    pub shader_location: u32,
}

/// The layout of one vertex buffer slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferLayoutDescriptor<'a> {
    /// Distance in bytes between consecutive elements.
    pub array_stride: u64,
    /// Per-vertex or per-instance stepping.
    pub step_mode: VertexStepMode,
    /// Attributes sourced from this slot.
    pub attributes: Cow<'a, [VertexAttributeDescriptor]>,
}

/// Which triangle faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// Keep every triangle.
    None,
    /// Discard clockwise (back-facing) triangles.
    #[default]
    Back,
}

/// Everything needed to link two compiled stages into a render pipeline.
///
/// The pipeline owns one uniform block at `@group(0) @binding(0)`, visible to
/// both stages. Its size and member offsets come from shader reflection, so
/// the descriptor does not repeat them.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Compiled vertex stage.
    pub vertex_module: ShaderModuleId,
    /// Compiled fragment stage.
    pub fragment_module: ShaderModuleId,
    /// Vertex buffer slots, in binding order.
    pub vertex_buffers: Cow<'a, [VertexBufferLayoutDescriptor<'a>]>,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Enables depth testing and depth writes against the surface depth buffer.
    pub depth_test: bool,
}

/// The slot of a named uniform inside a pipeline's uniform block.
///
/// Resolved once after link; it stays valid for the lifetime of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// A value written to a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A scalar `f32`.
    Float(f32),
    /// A `vec3<f32>`.
    Vec3(Vec3),
    /// A column-major `mat4x4<f32>`.
    Mat4(Mat4),
}

impl UniformValue {
    /// The raw bytes as laid out in a uniform block.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(m) => bytemuck::bytes_of(m),
        }
    }
}
