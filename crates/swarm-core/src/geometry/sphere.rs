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

use super::Mesh;
use crate::math::{PI, TAU};

/// Smallest tessellation that still encloses a volume.
pub const MIN_SPHERE_SEGMENTS: u32 = 3;

/// Largest tessellation whose `(segments + 1)²` vertices stay addressable by
/// 16-bit indices.
pub const MAX_SPHERE_SEGMENTS: u32 = 255;

/// Builds a UV sphere centered at the origin.
///
/// Latitude rings run from the north pole (`+Y`) to the south pole, longitude
/// from `+X` towards `+Z`. Each ring carries a duplicated seam vertex, which
/// gives `(segments + 1)²` vertices and `segments² · 6` indices. Triangles wind
/// counter-clockwise when seen from outside the sphere.
///
/// # Arguments
///
/// * `radius` - Sphere radius, must be positive.
/// * `segments` - Subdivisions along both latitude and longitude, in
///   `[MIN_SPHERE_SEGMENTS, MAX_SPHERE_SEGMENTS]`.
pub fn uv_sphere(radius: f32, segments: u32) -> Mesh {
    debug_assert!(radius > 0.0, "sphere radius must be positive");
    debug_assert!(
        (MIN_SPHERE_SEGMENTS..=MAX_SPHERE_SEGMENTS).contains(&segments),
        "sphere segments {segments} outside the 16-bit index range"
    );

    let ring = segments + 1;
    let vertex_count = (ring * ring) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);

    for i in 0..=segments {
        let lat = PI * i as f32 / segments as f32;
        let (sin_lat, cos_lat) = lat.sin_cos();
        for j in 0..=segments {
            let lon = TAU * j as f32 / segments as f32;
            let (sin_lon, cos_lon) = lon.sin_cos();

            let point = [sin_lat * cos_lon, cos_lat, sin_lat * sin_lon];
            positions.push(point.map(|c| c * radius));
            normals.push(point);
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for i in 0..segments {
        for j in 0..segments {
            let start = (i * ring + j) as u16;
            let below = start + ring as u16;
            indices.extend_from_slice(&[start, start + 1, below, below, start + 1, below + 1]);
        }
    }

    log::debug!(
        "Generated UV sphere: radius {radius}, {segments} segments, {} vertices, {} indices",
        positions.len(),
        indices.len()
    );

    Mesh {
        positions,
        normals,
        indices,
    }
}
