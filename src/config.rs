//! Demo configuration.
//!
//! Every field has a default, so a JSON file only needs the values it wants
//! to change:
//!
//! ```json
//! { "particles": { "initial_count": 50, "seed": 7 },
//!   "assets": { "model": "models/fox.glb" } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::visuals::BlendMode;

/// Complete demo configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub title: String,
    /// Initial window width in logical pixels.
    pub width: u32,
    /// Initial window height in logical pixels.
    pub height: u32,
    pub particles: ParticleConfig,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
    pub lights: LightConfig,
    /// Multisample the scene (4x) when the adapter supports it.
    pub antialias: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Pyre".into(),
            width: 1280,
            height: 720,
            particles: ParticleConfig::default(),
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
            lights: LightConfig::default(),
            antialias: true,
        }
    }
}

impl DemoConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// MSAA sample count requested from the renderer.
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            4
        } else {
            1
        }
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.camera.validate()
    }
}

/// Particle population settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    /// Particles spawned at startup.
    pub initial_count: usize,
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub blend: BlendMode,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            initial_count: crate::system::DEFAULT_BATCH,
            seed: None,
            blend: BlendMode::Alpha,
        }
    }
}

/// Perspective camera settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(25.0, 10.0, 0.0),
            target: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        if self.position == self.target {
            return Err(ConfigError::Invalid(
                "camera position and target must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Paths of the assets loaded by the scene.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Point-sprite texture.
    pub sprite: PathBuf,
    /// Directory holding the skybox faces.
    pub skybox_dir: PathBuf,
    /// Face file names in `+x, -x, +y, -y, +z, -z` order.
    pub skybox_faces: [String; 6],
    /// glTF or GLB model.
    pub model: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sprite: PathBuf::from("resources/fire.png"),
            skybox_dir: PathBuf::from("resources"),
            skybox_faces: [
                "posx.jpg".into(),
                "negx.jpg".into(),
                "posy.jpg".into(),
                "negy.jpg".into(),
                "posz.jpg".into(),
                "negz.jpg".into(),
            ],
            model: PathBuf::from("shiba/scene.gltf"),
        }
    }
}

impl AssetConfig {
    /// Full paths of the six skybox faces.
    pub fn skybox_paths(&self) -> [PathBuf; 6] {
        std::array::from_fn(|i| self.skybox_dir.join(&self.skybox_faces[i]))
    }
}

/// Scene lighting.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub directional_colour: Vec3,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub directional_target: Vec3,
    pub ambient_colour: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            directional_colour: Vec3::ONE,
            directional_intensity: 1.0,
            directional_position: Vec3::new(20.0, 100.0, 10.0),
            directional_target: Vec3::ZERO,
            // 0x101010
            ambient_colour: Vec3::splat(16.0 / 255.0),
        }
    }
}
