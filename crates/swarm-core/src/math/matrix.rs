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

//! Defines the `Mat3` and `Mat4` types and the handful of constructors the
//! camera and the animation reference need.

use super::{Vec3, Vec4, EPSILON};
use std::ops::Mul;

/// A 3x3 column-major matrix. Only used for pure rotations here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Creates a new matrix from three column vectors.
    #[inline]
    pub fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Creates a right-handed rotation around the Y-axis.
    ///
    /// The columns are `(cos, 0, -sin)`, `(0, 1, 0)` and `(sin, 0, cos)`, which is
    /// exactly the matrix the instanced vertex shader builds per instance.
    #[inline]
    pub fn from_rotation_y(angle_radians: f32) -> Self {
        let (s, c) = angle_radians.sin_cos();
        Self::from_cols(
            Vec3::new(c, 0.0, -s),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(s, 0.0, c),
        )
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z
    }
}

/// A 4x4 column-major matrix used for view and projection transforms.
///
/// The memory layout is column-major, which is what WGSL expects for a
/// `mat4x4<f32>` inside a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a right-handed perspective projection matrix with a [0, 1] depth range (ZO).
    ///
    /// # Arguments
    ///
    /// * `fov_y_radians`: Vertical field of view in radians.
    /// * `aspect_ratio`: Width divided by height of the viewport.
    /// * `z_near`: Distance to the near clipping plane (must be positive).
    /// * `z_far`: Distance to the far clipping plane (must be greater than `z_near`).
    ///
    /// # Panics
    ///
    /// Panics if the clip planes are not ordered `0 < z_near < z_far`.
    #[inline]
    pub fn perspective_rh_zo(
        fov_y_radians: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        assert!(z_near > 0.0 && z_far > z_near);
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let range = z_near - z_far;

        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, z_far / range, -1.0),
            Vec4::new(0.0, 0.0, (z_near * z_far) / range, 0.0),
        )
    }

    /// Creates a right-handed view matrix for a camera looking from `eye` towards `target`.
    ///
    /// # Returns
    ///
    /// `None` if `eye` and `target` coincide, or if `up` is parallel to the view direction.
    #[inline]
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let f = forward.normalize();
        let s = f.cross(up);
        if s.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let s = s.normalize();
        let u = s.cross(f);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        ))
    }

    /// Inverts an affine matrix (rotation, scale, translation; last row `0 0 0 1`).
    ///
    /// The rows of the inverted 3x3 part are the pairwise cross products of its
    /// columns divided by the determinant.
    ///
    /// # Returns
    ///
    /// `None` if the linear part is singular.
    pub fn affine_inverse(&self) -> Option<Self> {
        let a = self.cols[0].truncate();
        let b = self.cols[1].truncate();
        let c = self.cols[2].truncate();
        let t = self.cols[3].truncate();

        let bc = b.cross(c);
        let det = a.dot(bc);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        // Rows of the inverse 3x3.
        let r0 = bc * inv_det;
        let r1 = c.cross(a) * inv_det;
        let r2 = a.cross(b) * inv_det;
        let inv_t = Vec3::new(-r0.dot(t), -r1.dot(t), -r2.dot(t));

        Some(Self::from_cols(
            Vec4::new(r0.x, r1.x, r2.x, 0.0),
            Vec4::new(r0.y, r1.y, r2.y, 0.0),
            Vec4::new(r0.z, r1.z, r2.z, 0.0),
            Vec4::from_vec3(inv_t, 1.0),
        ))
    }

    /// Returns the translation column.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transforms a point (implicit `w = 1`) and performs the perspective divide.
    #[inline]
    pub fn project_point3(&self, p: Vec3) -> Vec3 {
        let clip = *self * Vec4::from_vec3(p, 1.0);
        clip.truncate() * (1.0 / clip.w)
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let rows = [
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        ];
        let cols = rhs
            .cols
            .map(|col| Vec4::new(rows[0].dot(col), rows[1].dot(col), rows[2].dot(col), rows[3].dot(col)));
        Mat4 { cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a `Vec4` by this matrix.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, degrees_to_radians, PI};

    fn vec3_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn mat4_approx_eq(a: Mat4, b: Mat4) -> bool {
        (0..4).all(|c| (0..4).all(|r| approx_eq(a.cols[c].get(r), b.cols[c].get(r))))
    }

    #[test]
    fn test_mat3_rotation_y_is_right_handed() {
        let m = Mat3::from_rotation_y(PI / 2.0);
        // +X rotates towards -Z for a right-handed rotation about +Y.
        assert!(vec3_approx_eq(m * Vec3::X, Vec3::new(0.0, 0.0, -1.0)));
        assert!(vec3_approx_eq(m * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_identity_mul() {
        let m = Mat4::look_at_rh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y).unwrap();
        assert!(mat4_approx_eq(m * Mat4::IDENTITY, m));
        assert!(mat4_approx_eq(Mat4::IDENTITY * m, m));
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 20.0, 50.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y).unwrap();
        let eye_in_view = (view * Vec4::from_vec3(eye, 1.0)).truncate();
        assert!(vec3_approx_eq(eye_in_view, Vec3::ZERO));

        // The target lies straight down the -Z axis of view space.
        let target_in_view = (view * Vec4::W).truncate();
        assert!(approx_eq(target_in_view.x, 0.0));
        assert!(approx_eq(target_in_view.y, 0.0));
        assert!(target_in_view.z < 0.0);
    }

    #[test]
    fn test_look_at_degenerate_inputs() {
        assert!(Mat4::look_at_rh(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn test_affine_inverse_of_view_recovers_eye() {
        let eye = Vec3::new(0.0, 20.0, 50.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y).unwrap();
        let inv = view.affine_inverse().unwrap();
        assert!(vec3_approx_eq(inv.translation(), eye));
        assert!(mat4_approx_eq(view * inv, Mat4::IDENTITY));
    }

    #[test]
    fn test_affine_inverse_singular() {
        let mut m = Mat4::IDENTITY;
        m.cols[1] = Vec4::ZERO;
        assert!(m.affine_inverse().is_none());
    }

    #[test]
    fn test_perspective_depth_range_zero_to_one() {
        let proj = Mat4::perspective_rh_zo(degrees_to_radians(45.0), 16.0 / 9.0, 0.1, 1000.0);
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -0.1));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -1000.0));
        assert!(approx_eq(near.z, 0.0));
        assert!((far.z - 1.0).abs() < 1e-3);
    }

    #[test]
    #[should_panic]
    fn test_perspective_rejects_inverted_planes() {
        let _ = Mat4::perspective_rh_zo(1.0, 1.0, 10.0, 1.0);
    }
}
