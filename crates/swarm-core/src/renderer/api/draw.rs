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

use super::buffer::{BufferId, IndexFormat};
use super::pipeline::RenderPipelineId;
use std::borrow::Cow;

/// An opaque handle to a vertex-binding object: the set of buffers plugged into
/// a pipeline's vertex slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBindingId(pub usize);

/// Describes a vertex-binding object.
#[derive(Debug, Clone)]
pub struct VertexBindingDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Buffers in slot order; slot `n` feeds the pipeline's `vertex_buffers[n]`.
    pub vertex_buffers: Cow<'a, [BufferId]>,
    /// The index buffer drawn with this binding.
    pub index_buffer: BufferId,
    /// Element width of `index_buffer`.
    pub index_format: IndexFormat,
}

/// One indexed, instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// Linked pipeline to draw with.
    pub pipeline: RenderPipelineId,
    /// Vertex and index buffers.
    pub binding: VertexBindingId,
    /// Number of indices to draw, starting at 0.
    pub index_count: u32,
    /// Number of instances to draw, starting at 0.
    pub instance_count: u32,
}

/// Everything a render system needs to produce one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    /// Linear RGBA clear color of the color target.
    pub clear_color: [f64; 4],
    /// Draws recorded in order into a single pass.
    pub draws: &'a [DrawCommand],
}

/// Counters describing the last submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Monotonic frame number, starting at 1 for the first presented frame.
    pub frame_number: u64,
    /// Draw calls recorded.
    pub draw_calls: u32,
    /// Triangles submitted, all instances included.
    pub triangles_rendered: u64,
}
