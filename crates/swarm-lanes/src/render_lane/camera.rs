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

use swarm_core::math::{degrees_to_radians, Mat4, Vec3};

/// Eye position of the fixed camera.
pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 20.0, 50.0);
/// Point the camera looks at.
pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
/// Up direction of the camera.
pub const CAMERA_UP: Vec3 = Vec3::Y;
/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
/// Near clip plane distance.
pub const Z_NEAR: f32 = 0.1;
/// Far clip plane distance.
pub const Z_FAR: f32 = 1000.0;

/// A fixed camera whose projection follows the surface size.
///
/// The view matrix never changes. The projection and the cached
/// `view_projection` are recomputed only in [`Camera::set_viewport`], and every
/// recompute bumps [`Camera::revision`].
#[derive(Debug, Clone)]
pub struct Camera {
    view: Mat4,
    position: Vec3,
    projection: Mat4,
    view_projection: Mat4,
    viewport: (u32, u32),
    revision: u64,
}

impl Camera {
    /// Creates the camera with a square placeholder projection.
    pub fn new() -> Self {
        // The constant eye and target never coincide.
        let view = Mat4::look_at_rh(CAMERA_EYE, CAMERA_TARGET, CAMERA_UP).unwrap_or(Mat4::IDENTITY);
        let position = view
            .affine_inverse()
            .map(|inverse| inverse.translation())
            .unwrap_or(CAMERA_EYE);
        let projection = Self::projection_for(1.0);
        Self {
            view,
            position,
            projection,
            view_projection: projection * view,
            viewport: (0, 0),
            revision: 0,
        }
    }

    fn projection_for(aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_zo(degrees_to_radians(FOV_Y_DEGREES), aspect_ratio, Z_NEAR, Z_FAR)
    }

    /// Recomputes the projection for a `width x height` surface.
    ///
    /// ## Returns
    /// `false` when either dimension is zero; the cached matrices are left untouched.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::warn!("Ignoring zero-sized viewport {width}x{height}");
            return false;
        }
        self.viewport = (width, height);
        self.projection = Self::projection_for(width as f32 / height as f32);
        self.view_projection = self.projection * self.view;
        self.revision += 1;
        log::debug!(
            "Camera viewport set to {width}x{height} (revision {})",
            self.revision
        );
        true
    }

    /// Cached `projection * view`.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// The fixed view matrix.
    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// The current projection matrix.
    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// World-space camera position, taken from the inverse view matrix.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The last accepted viewport size, `(0, 0)` before the first one.
    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Number of times the projection was recomputed.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn position_is_recovered_from_the_view() {
        let camera = Camera::new();
        let p = camera.position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-4);
        assert_relative_eq!(p.z, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn revision_bumps_only_on_accepted_viewport() {
        let mut camera = Camera::new();
        assert_eq!(camera.revision(), 0);

        assert!(camera.set_viewport(1280, 720));
        assert_eq!(camera.revision(), 1);
        let cached = camera.view_projection();

        assert!(!camera.set_viewport(0, 720));
        assert!(!camera.set_viewport(1280, 0));
        assert_eq!(camera.revision(), 1);
        assert_eq!(camera.view_projection(), cached);
        assert_eq!(camera.viewport(), (1280, 720));
    }

    #[test]
    fn aspect_ratio_follows_viewport() {
        let mut camera = Camera::new();
        camera.set_viewport(1600, 800);
        let wide = camera.projection();
        camera.set_viewport(800, 800);
        let square = camera.projection();
        // Horizontal scale is halved at twice the aspect ratio.
        assert_relative_eq!(wide.cols[0].x * 2.0, square.cols[0].x, epsilon = 1e-5);
        assert_relative_eq!(wide.cols[1].y, square.cols[1].y, epsilon = 1e-5);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut camera = Camera::new();
        camera.set_viewport(1920, 1080);
        let ndc = camera.view_projection().project_point3(Vec3::ZERO);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
