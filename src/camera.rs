//! Perspective orbit camera.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Pitch limit, just short of straight up/down so `look_at` stays defined.
pub const MAX_PITCH: f32 = 1.55;

/// Orbit camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Place the camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            distance,
            target,
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 1000.0,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            ..Self::looking_at(config.position, config.target)
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio after a resize. Zero-sized viewports are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Pixels per world unit at unit clip-space depth for a viewport of
    /// `viewport_height` pixels; sprite sizes are scaled by this.
    pub fn point_multiplier(&self, viewport_height: u32) -> f32 {
        viewport_height as f32 / (2.0 * (0.5 * self.fov_y).tan())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_round_trips_position() {
        let camera = Camera::looking_at(Vec3::new(25.0, 10.0, 0.0), Vec3::ZERO);
        let pos = camera.position();
        assert!((pos - Vec3::new(25.0, 10.0, 0.0)).length() < 1e-3, "{pos:?}");
    }

    #[test]
    fn test_looking_at_offset_target() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let camera = Camera::looking_at(Vec3::new(-4.0, 5.0, 9.0), target);
        assert!((camera.position() - Vec3::new(-4.0, 5.0, 9.0)).length() < 1e-3);
        assert_eq!(camera.target, target);
    }

    #[test]
    fn test_set_aspect_ignores_zero() {
        let mut camera = Camera::default();
        camera.set_aspect(800, 400);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(0, 400);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_point_multiplier_at_60_degrees() {
        let camera = Camera::default();
        // tan(30deg) = 0.57735
        let expected = 1080.0 / (2.0 * 0.577_350_3);
        assert!((camera.point_multiplier(1080) - expected).abs() < 0.01);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera::default();
        let clip = camera.view_projection() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
    }
}
