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

//! Procedural geometry.
//!
//! A [`Mesh`] is built once at surface creation and is immutable afterwards.
//! Its three arrays are uploaded to separate GPU buffers, so positions and
//! normals are kept as parallel, tightly packed `[f32; 3]` streams rather than
//! an interleaved vertex struct.

mod sphere;

pub use self::sphere::{uv_sphere, MAX_SPHERE_SEGMENTS, MIN_SPHERE_SEGMENTS};

/// An indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit normals, parallel to `positions`.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices, three per triangle.
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices (three per triangle).
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Checks the structural invariants: parallel attribute arrays, whole
    /// triangles, and every index inside the vertex range.
    pub fn is_well_formed(&self) -> bool {
        self.positions.len() == self.normals.len()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.positions.len())
    }
}
