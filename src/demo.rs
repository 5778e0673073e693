//! Demo builder and runner

use std::path::PathBuf;

use winit::event_loop::{ControlFlow, EventLoop};

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::visuals::BlendMode;
use crate::window::App;

/// The fire demo.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Demo::new()
///     .with_particle_count(50)
///     .with_blend(BlendMode::Additive)
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Demo {
    config: DemoConfig,
}

impl Demo {
    /// Create a demo with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn with_config(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Set the number of particles created at startup.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particles.initial_count = count;
        self
    }

    /// Seed the particle generator for a reproducible scene.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.particles.seed = Some(seed);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.config.particles.blend = blend;
        self
    }

    /// Enable or disable 4x multisampling.
    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.config.antialias = antialias;
        self
    }

    /// Set the glTF model drawn at the origin.
    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.assets.model = path.into();
        self
    }

    /// Set the sprite image used for every particle.
    pub fn with_sprite(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.assets.sprite = path.into();
        self
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Run the demo. This blocks until the window is closed or Escape is
    /// pressed.
    pub fn run(self) -> Result<(), DemoError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;

        match app.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_config() {
        let demo = Demo::new()
            .with_particle_count(42)
            .with_seed(3)
            .with_blend(BlendMode::Additive)
            .with_model("models/fox.glb")
            .with_sprite("sprites/spark.png")
            .with_antialias(false);

        let config = demo.config();
        assert_eq!(config.particles.initial_count, 42);
        assert_eq!(config.particles.seed, Some(3));
        assert_eq!(config.particles.blend, BlendMode::Additive);
        assert_eq!(config.assets.model, PathBuf::from("models/fox.glb"));
        assert_eq!(config.assets.sprite, PathBuf::from("sprites/spark.png"));
        assert_eq!(config.sample_count(), 1);
    }

    #[test]
    fn test_default_demo_matches_default_config() {
        assert_eq!(Demo::new().config(), &DemoConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected_before_event_loop() {
        let mut config = DemoConfig::default();
        config.camera.near = 0.0;
        assert!(matches!(
            Demo::with_config(config).run(),
            Err(DemoError::Config(_))
        ));
    }
}
