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

//! Built-in WGSL sources of the sphere pipeline.
//!
//! Both stages declare the same `Uniforms` block at `@group(0) @binding(0)`:
//!
//! | member            | type          | offset |
//! |-------------------|---------------|--------|
//! | `view_projection` | `mat4x4<f32>` | 0      |
//! | `light_pos`       | `vec3<f32>`   | 64     |
//! | `time`            | `f32`         | 76     |
//! | `camera_pos`      | `vec3<f32>`   | 80     |

/// Vertex stage: per-instance animation and rotation.
///
/// Inputs: `@location(0)` position, `@location(1)` normal (per vertex),
/// `@location(2)` base position and `@location(3)` speed/rotation/phase
/// (per instance).
pub const SPHERE_INSTANCED_WGSL: &str = include_str!("sphere_instanced.wgsl");

/// Fragment stage: Phong lighting with a world-position tint.
pub const SPHERE_PHONG_WGSL: &str = include_str!("sphere_phong.wgsl");

/// Entry point of [`SPHERE_INSTANCED_WGSL`].
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Entry point of [`SPHERE_PHONG_WGSL`].
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Names of the uniform block members the lane writes every frame.
pub const UNIFORM_NAMES: [&str; 4] = ["time", "light_pos", "view_projection", "camera_pos"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_shader_has_entry_point_and_instance_inputs() {
        assert!(SPHERE_INSTANCED_WGSL.contains("@vertex"));
        assert!(SPHERE_INSTANCED_WGSL.contains(&format!("fn {VERTEX_ENTRY_POINT}(")));
        for location in 0..4 {
            assert!(
                SPHERE_INSTANCED_WGSL.contains(&format!("@location({location})")),
                "missing vertex input {location}"
            );
        }
    }

    #[test]
    fn fragment_shader_has_entry_point() {
        assert!(SPHERE_PHONG_WGSL.contains("@fragment"));
        assert!(SPHERE_PHONG_WGSL.contains(&format!("fn {FRAGMENT_ENTRY_POINT}(")));
    }

    #[test]
    fn both_stages_declare_every_uniform() {
        for source in [SPHERE_INSTANCED_WGSL, SPHERE_PHONG_WGSL] {
            assert!(source.contains("@group(0) @binding(0)"));
            for name in UNIFORM_NAMES {
                assert!(source.contains(&format!("{name}:")), "missing uniform {name}");
            }
        }
    }
}
