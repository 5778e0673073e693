//! The particle record and its random spawn distribution.

use glam::Vec3;
use rand::Rng;

/// Half-extent of the spawn cube. Positions fall in `[-SPAWN_EXTENT, SPAWN_EXTENT)`.
pub const SPAWN_EXTENT: f32 = 1.0;

/// Upper bound (exclusive) of a particle's sprite size.
pub const MAX_SIZE: f32 = 2.0;

/// A single point sprite.
///
/// Particles are plain values: once spawned their fields never change, only
/// their position in the owning [`ParticleSystem`](crate::ParticleSystem)
/// does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// Sprite size, scaled by the renderer's point multiplier.
    pub size: f32,
    /// RGB colour, each channel in `[0, 1)`.
    pub colour: Vec3,
    /// Transparency in `[0, 1)`, packed as the fourth colour component.
    pub alpha: f32,
}

impl Particle {
    /// Draw a particle with every attribute independently uniform:
    /// position inside the spawn cube, size in `[0, 2)`, colour channels and
    /// alpha in `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            position: Vec3::new(
                rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
            ),
            size: rng.gen_range(0.0..MAX_SIZE),
            colour: Vec3::new(rng.gen(), rng.gen(), rng.gen()),
            alpha: rng.gen(),
        }
    }

    /// Squared distance from `point` to this particle.
    #[inline]
    pub fn distance_squared_to(&self, point: Vec3) -> f32 {
        self.position.distance_squared(point)
    }

    /// Colour and alpha as a single RGBA vector.
    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.colour.x, self.colour.y, self.colour.z, self.alpha]
    }
}
