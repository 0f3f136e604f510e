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

//! CPU reference of the sphere shaders.
//!
//! These functions evaluate the same closed-form formulas as
//! `sphere_instanced.wgsl` and `sphere_phong.wgsl`. The frame loop uses
//! [`light_position`]; the rest exists so the shading math can be checked
//! without a GPU.

use swarm_core::instancing::InstanceRecord;
use swarm_core::math::{Mat3, Vec3};

/// Orbit amplitude of an instance along X and Z.
pub const ORBIT_RADIUS: f32 = 5.0;
/// Bob amplitude of an instance along Y.
pub const BOB_HEIGHT: f32 = 2.0;
/// Distance of the orbiting light from the Y axis, and its height.
pub const LIGHT_DISTANCE: f32 = 50.0;

/// Base surface color.
pub const MATERIAL_COLOR: Vec3 = Vec3::new(0.8, 0.3, 0.2);
/// Ambient term added to the diffuse factor.
pub const AMBIENT: f32 = 0.1;
/// Weight of the white specular highlight.
pub const SPECULAR_STRENGTH: f32 = 0.3;
/// Phong exponent.
pub const SHININESS: f32 = 32.0;

/// Position of the point light at `time` seconds.
#[inline]
pub fn light_position(time: f32) -> Vec3 {
    Vec3::new(
        LIGHT_DISTANCE * time.sin(),
        LIGHT_DISTANCE,
        LIGHT_DISTANCE * time.cos(),
    )
}

/// Offset of an instance from its base position.
pub fn displacement(time: f32, speed: f32, phase_offset: f32) -> Vec3 {
    let t = time * speed + phase_offset;
    Vec3::new(
        t.sin() * ORBIT_RADIUS,
        (t * 1.3).sin() * BOB_HEIGHT,
        (t * 0.7).cos() * ORBIT_RADIUS,
    )
}

/// Spin of an instance around its local Y axis.
pub fn spin(time: f32, rotation_speed: f32, phase_offset: f32) -> Mat3 {
    Mat3::from_rotation_y(time * rotation_speed + phase_offset * 10.0)
}

/// A vertex after the vertex stage, before projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedVertex {
    /// World-space position.
    pub world_position: Vec3,
    /// Rotated (not renormalized) normal.
    pub normal: Vec3,
}

/// Evaluates the vertex stage for one mesh vertex of one instance.
pub fn animate_vertex(
    position: Vec3,
    normal: Vec3,
    instance: &InstanceRecord,
    time: f32,
) -> AnimatedVertex {
    let base = Vec3::from(instance.base_position);
    let offset = displacement(time, instance.speed(), instance.phase_offset());
    let rotation = spin(time, instance.rotation_speed(), instance.phase_offset());
    AnimatedVertex {
        world_position: rotation * position + base + offset,
        normal: rotation * normal,
    }
}

/// Evaluates the fragment stage. Returns linear RGBA.
pub fn shade(world_position: Vec3, normal: Vec3, light_pos: Vec3, camera_pos: Vec3) -> [f32; 4] {
    let n = normal.normalize();
    let l = (light_pos - world_position).normalize();
    let v = (camera_pos - world_position).normalize();

    let diffuse = n.dot(l).max(0.0);
    let specular = v.dot((-l).reflect(n)).max(0.0).powf(SHININESS);
    let lit = MATERIAL_COLOR * (AMBIENT + diffuse) + Vec3::splat(SPECULAR_STRENGTH) * specular;

    let color = lit.mul_elem(position_tint(world_position));
    [color.x, color.y, color.z, 1.0]
}

/// Per-channel tint derived from the world position.
pub fn position_tint(world_position: Vec3) -> Vec3 {
    let pf = 0.1 * (world_position.x + world_position.y + world_position.z);
    Vec3::new(
        0.8 + pf.sin() * 0.2,
        0.8 + pf.cos() * 0.2,
        0.8 + (pf * 1.2).sin() * 0.2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(base: [f32; 3], speed: f32, rotation_speed: f32, phase: f32) -> InstanceRecord {
        InstanceRecord {
            base_position: base,
            params: [speed, rotation_speed, phase],
        }
    }

    #[test]
    fn displacement_at_origin_of_time() {
        let d = displacement(0.0, 0.3, 0.0);
        assert_relative_eq!(d.x, 0.0);
        assert_relative_eq!(d.y, 0.0);
        assert_relative_eq!(d.z, 5.0);
    }

    #[test]
    fn displacement_stays_within_amplitudes() {
        for step in 0..200 {
            let d = displacement(step as f32 * 0.37, 0.45, 3.0);
            assert!(d.x.abs() <= ORBIT_RADIUS + 1e-5);
            assert!(d.y.abs() <= BOB_HEIGHT + 1e-5);
            assert!(d.z.abs() <= ORBIT_RADIUS + 1e-5);
        }
    }

    #[test]
    fn rotation_preserves_length() {
        let instance = record([0.0; 3], 0.2, 1.1, 4.2);
        let p = Vec3::new(0.2, -0.1, 0.05);
        let n = p.normalize();
        for step in 0..50 {
            let t = step as f32 * 0.5;
            let rotation = spin(t, instance.rotation_speed(), instance.phase_offset());
            assert_relative_eq!((rotation * p).length(), p.length(), epsilon = 1e-5);
            let v = animate_vertex(p, n, &instance, t);
            assert_relative_eq!(v.normal.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn vertex_at_time_zero_without_phase() {
        let instance = record([10.0, -20.0, 30.0], 0.25, 1.0, 0.0);
        let v = animate_vertex(Vec3::new(0.2, 0.0, 0.0), Vec3::X, &instance, 0.0);
        // No spin and only the Z orbit term at t = 0.
        assert_relative_eq!(v.world_position.x, 10.2, epsilon = 1e-5);
        assert_relative_eq!(v.world_position.y, -20.0, epsilon = 1e-5);
        assert_relative_eq!(v.world_position.z, 35.0, epsilon = 1e-5);
        assert_relative_eq!(v.normal.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn light_orbits_at_fixed_height() {
        let at_zero = light_position(0.0);
        assert_relative_eq!(at_zero.x, 0.0);
        assert_relative_eq!(at_zero.y, 50.0);
        assert_relative_eq!(at_zero.z, 50.0);
        let later = light_position(1.234);
        assert_relative_eq!(later.y, 50.0);
        assert_relative_eq!((later.x * later.x + later.z * later.z).sqrt(), 50.0, epsilon = 1e-3);
    }

    #[test]
    fn back_facing_fragment_gets_only_ambient_tinted() {
        // At the origin the tint argument is 0: (0.8, 1.0, 0.8).
        let color = shade(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::new(0.0, -10.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        );
        assert_relative_eq!(color[0], 0.8 * 0.1 * 0.8, epsilon = 1e-6);
        assert_relative_eq!(color[1], 0.3 * 0.1 * 1.0, epsilon = 1e-6);
        assert_relative_eq!(color[2], 0.2 * 0.1 * 0.8, epsilon = 1e-6);
        assert_relative_eq!(color[3], 1.0);
    }

    #[test]
    fn head_on_light_and_view_saturate_diffuse_and_specular() {
        let eye = Vec3::new(0.0, 10.0, 0.0);
        let color = shade(Vec3::ZERO, Vec3::Y, eye, eye);
        let tint = position_tint(Vec3::ZERO);
        // diffuse = 1, specular = 1
        assert_relative_eq!(color[0], (0.8 * 1.1 + 0.3) * tint.x, epsilon = 1e-5);
        assert_relative_eq!(color[1], (0.3 * 1.1 + 0.3) * tint.y, epsilon = 1e-5);
        assert_relative_eq!(color[2], (0.2 * 1.1 + 0.3) * tint.z, epsilon = 1e-5);
    }

    #[test]
    fn tint_matches_channel_formulas() {
        let p = Vec3::new(3.0, 4.0, 5.0);
        let pf: f32 = 1.2;
        let tint = position_tint(p);
        assert_relative_eq!(tint.x, 0.8 + pf.sin() * 0.2, epsilon = 1e-6);
        assert_relative_eq!(tint.y, 0.8 + pf.cos() * 0.2, epsilon = 1e-6);
        assert_relative_eq!(tint.z, 0.8 + (pf * 1.2).sin() * 0.2, epsilon = 1e-6);
    }
}
