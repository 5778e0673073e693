//! # Pyre
//!
//! A camera-sorted point-sprite fire effect in a small lit scene.
//!
//! Pyre keeps a CPU-side population of particles, sorts them back to front
//! against the camera every frame and republishes them as flat attribute
//! streams (position, size, colour with alpha) that the GPU draws as
//! textured sprites over a skybox and a glTF model.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pyre::prelude::*;
//!
//! fn main() -> Result<(), DemoError> {
//!     Demo::new()
//!         .with_particle_count(10)
//!         .with_blend(BlendMode::Alpha)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle system
//!
//! [`ParticleSystem`] owns the particles and their [`AttributeBuffers`].
//! [`ParticleSystem::step`] sorts farthest-first for a camera position and
//! republishes the buffers so that buffer index `i` always describes
//! particle `i`:
//!
//! ```
//! use pyre::{ParticleSystem, Vec3};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut system = ParticleSystem::new(10, StdRng::seed_from_u64(1));
//! system.step(0.016, Vec3::new(25.0, 10.0, 0.0));
//! assert_eq!(system.buffers().position.count(), 10);
//! ```
//!
//! The system runs without a window, so it can be driven headless from tests
//! and benchmarks.
//!
//! ### Scene host
//!
//! [`Demo`] opens the window, loads the sprite, skybox and model, and runs
//! the frame loop. Missing assets are logged and replaced or skipped; only
//! window and GPU failures abort startup.
//!
//! ### Configuration
//!
//! All tunables live in [`DemoConfig`], which round-trips through JSON.
//! The `pyre` binary takes an optional config path as its first argument.

pub mod buffers;
pub mod camera;
pub mod config;
pub mod controls;
mod demo;
pub mod error;
mod gpu;
pub mod model;
pub mod particle;
pub mod scene;
pub mod shader;
pub mod system;
pub mod textures;
pub mod time;
pub mod visuals;
mod window;

pub use buffers::{AttributeBuffer, AttributeBuffers};
pub use camera::Camera;
pub use config::{AssetConfig, CameraConfig, DemoConfig, LightConfig, ParticleConfig};
pub use controls::OrbitControls;
pub use demo::Demo;
pub use error::{AssetError, ConfigError, DemoError, GpuError};
pub use glam::{Vec3, Vec4};
pub use model::ModelData;
pub use particle::Particle;
pub use scene::{Lighting, Scene, SceneAssets};
pub use system::ParticleSystem;
pub use textures::{CubemapData, TextureData};
pub use time::FrameClock;
pub use visuals::BlendMode;

/// Convenient imports for demo binaries.
///
/// ```ignore
/// use pyre::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::DemoConfig;
    pub use crate::demo::Demo;
    pub use crate::error::DemoError;
    pub use crate::particle::Particle;
    pub use crate::system::ParticleSystem;
    pub use crate::visuals::BlendMode;
    pub use glam::Vec3;
}
