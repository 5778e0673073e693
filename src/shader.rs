//! WGSL sources and the per-frame uniform block they share.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::Camera;
use crate::scene::Lighting;

pub const POINTS_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/points.wgsl")
);

pub const SKYBOX_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/skybox.wgsl")
);

pub const MESH_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/mesh.wgsl")
);

/// Mirrors `Frame` in `common.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// Width, height, point multiplier, elapsed seconds.
    pub viewport: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_radiance: [f32; 4],
    pub ambient: [f32; 4],
}

impl FrameUniforms {
    pub fn new(camera: &Camera, lighting: &Lighting, width: u32, height: u32, elapsed: f32) -> Self {
        let view_proj = camera.view_projection();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: camera.position().extend(1.0).to_array(),
            viewport: [
                width as f32,
                height as f32,
                camera.point_multiplier(height),
                elapsed,
            ],
            light_dir: lighting.direction.extend(0.0).to_array(),
            light_radiance: lighting.radiance.extend(0.0).to_array(),
            ambient: lighting.ambient.extend(0.0).to_array(),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightConfig;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_points_shader_valid() {
        validate_wgsl(POINTS_SOURCE).unwrap();
    }

    #[test]
    fn test_skybox_shader_valid() {
        validate_wgsl(SKYBOX_SOURCE).unwrap();
    }

    #[test]
    fn test_skybox_mirrors_x_when_sampling() {
        assert!(SKYBOX_SOURCE
            .contains("textureSample(sky, sky_sampler, vec3<f32>(-direction.x, direction.y, direction.z))"));
        assert!(!SKYBOX_SOURCE.contains("textureSample(sky, sky_sampler, direction)"));
    }

    #[test]
    fn test_mesh_shader_valid() {
        validate_wgsl(MESH_SOURCE).unwrap();
    }

    #[test]
    fn test_frame_uniform_layout() {
        // Two mat4 plus five vec4, no implicit padding.
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 2 * 64 + 5 * 16);
        assert!(POINTS_SOURCE.contains("struct Frame"));
    }

    #[test]
    fn test_frame_uniforms_from_camera() {
        let camera = Camera::default();
        let lighting = Lighting::from_config(&LightConfig::default());
        let frame = FrameUniforms::new(&camera, &lighting, 1920, 1080, 2.5);
        assert_eq!(frame.viewport[0], 1920.0);
        assert_eq!(frame.viewport[3], 2.5);
        assert!((frame.viewport[2] - camera.point_multiplier(1080)).abs() < 1e-4);
        assert_eq!(frame.view_proj(), camera.view_projection());
        let roundtrip = frame.view_proj() * Mat4::from_cols_array_2d(&frame.inv_view_proj);
        assert!(roundtrip.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }
}
