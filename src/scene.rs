//! Scene state driven by the frame loop.
//!
//! [`Scene`] holds everything that is not a GPU resource: the camera and its
//! controls, the lights and the particle system. The window loop calls
//! [`Scene::tick`] once per frame and the renderer reads the result.

use glam::Vec3;

use crate::camera::Camera;
use crate::config::{AssetConfig, DemoConfig, LightConfig};
use crate::controls::OrbitControls;
use crate::model::ModelData;
use crate::system::ParticleSystem;
use crate::textures::{CubemapData, TextureData};
use crate::visuals::BlendMode;

/// Directional plus ambient lighting, resolved to shader-ready values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Unit vector pointing from the surface toward the light.
    pub direction: Vec3,
    /// Colour premultiplied by intensity.
    pub radiance: Vec3,
    pub ambient: Vec3,
}

impl Lighting {
    pub fn from_config(config: &LightConfig) -> Self {
        let to_light = config.directional_position - config.directional_target;
        Self {
            direction: to_light.try_normalize().unwrap_or(Vec3::Y),
            radiance: config.directional_colour * config.directional_intensity,
            ambient: config.ambient_colour,
        }
    }
}

/// Decoded assets handed to the renderer at startup.
///
/// Every asset is optional at load time: the sprite falls back to a
/// generated disc, a missing skybox leaves a plain background and a missing
/// model is simply not drawn.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub sprite: TextureData,
    pub skybox: Option<CubemapData>,
    pub model: Option<ModelData>,
}

impl SceneAssets {
    pub fn load(config: &AssetConfig) -> Self {
        let sprite = TextureData::sprite_or_fallback(&config.sprite);
        let skybox = match CubemapData::load(&config.skybox_paths()) {
            Ok(cube) => Some(cube),
            Err(e) => {
                log::warn!("skybox unavailable: {}", e);
                None
            }
        };
        let model = match ModelData::load(&config.model) {
            Ok(model) => Some(model),
            Err(e) => {
                log::warn!("model {} unavailable: {}", config.model.display(), e);
                None
            }
        };
        Self { sprite, skybox, model }
    }
}

/// Scene host state.
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    pub controls: OrbitControls,
    pub lighting: Lighting,
    pub blend: BlendMode,
    particles: ParticleSystem,
    running: bool,
}

impl Scene {
    /// Build the scene for a viewport of `width` x `height` pixels.
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        let mut camera = Camera::from_config(&config.camera, 1.0);
        camera.set_aspect(width, height);
        let particles = ParticleSystem::from_config(&config.particles);
        log::info!(
            "scene ready: {} particles, camera at {:?}",
            particles.len(),
            camera.position()
        );
        Self {
            camera,
            controls: OrbitControls::new(),
            lighting: Lighting::from_config(&config.lights),
            blend: config.particles.blend,
            particles,
            running: true,
        }
    }

    /// Advance one frame: sort the particles for the current camera and
    /// republish their buffers. Returns `false` once the scene is shut down.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if !self.running {
            return false;
        }
        self.particles.step(delta_time, self.camera.position());
        log::trace!("tick dt={:.4}", delta_time);
        true
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Stop the scene; later ticks do nothing.
    pub fn shutdown(&mut self) {
        if self.running {
            self.running = false;
            log::info!("scene shut down after {} particles", self.particles.len());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.particles.seed = Some(11);
        config
    }

    #[test]
    fn test_missing_assets_fall_back() {
        let config = AssetConfig {
            sprite: "no/such/fire.png".into(),
            skybox_dir: "no/such/dir".into(),
            model: "no/such/scene.gltf".into(),
            ..AssetConfig::default()
        };
        let assets = SceneAssets::load(&config);
        assert!(assets.sprite.width > 0);
        assert!(assets.skybox.is_none());
        assert!(assets.model.is_none());
    }

    #[test]
    fn test_lighting_from_defaults() {
        let lighting = Lighting::from_config(&LightConfig::default());
        let expected = Vec3::new(20.0, 100.0, 10.0).normalize();
        assert!((lighting.direction - expected).length() < 1e-6);
        assert_eq!(lighting.radiance, Vec3::ONE);
    }

    #[test]
    fn test_lighting_degenerate_direction() {
        let config = LightConfig {
            directional_position: Vec3::ZERO,
            ..LightConfig::default()
        };
        assert_eq!(Lighting::from_config(&config).direction, Vec3::Y);
    }

    #[test]
    fn test_tick_sorts_for_camera() {
        let mut scene = Scene::new(&seeded_config(), 1280, 720);
        assert!(scene.tick(0.016));
        let eye = scene.camera.position();
        let distances: Vec<f32> = scene
            .particles()
            .particles()
            .iter()
            .map(|p| p.position.distance(eye))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_shutdown_stops_ticks() {
        let mut scene = Scene::new(&seeded_config(), 1280, 720);
        scene.particles_mut().buffers_mut().position.take_update();
        scene.shutdown();
        assert!(!scene.is_running());
        assert!(!scene.tick(0.016));
        // No republish after shutdown.
        assert!(!scene.particles().buffers().position.needs_update());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut scene = Scene::new(&seeded_config(), 1280, 720);
        scene.resize(1000, 500);
        assert_eq!(scene.camera.aspect, 2.0);
    }
}
