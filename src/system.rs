//! Particle store and back-to-front sorter.
//!
//! The system owns its particles and a random source. Each frame the scene
//! calls [`ParticleSystem::step`] with the camera position; particles are
//! reordered farthest-first so that alpha blending composites correctly, then
//! flattened into [`AttributeBuffers`] for the point-sprite pass.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::buffers::AttributeBuffers;
use crate::config::ParticleConfig;
use crate::particle::Particle;

/// Number of particles spawned by a plain [`ParticleSystem::add_particles`] batch.
pub const DEFAULT_BATCH: usize = 10;

/// CPU-side particle collection plus its published attribute buffers.
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    buffers: AttributeBuffers,
    rng: StdRng,
}

impl ParticleSystem {
    /// Create a system with `initial_count` random particles and publish once.
    pub fn new(initial_count: usize, rng: StdRng) -> Self {
        let mut system = Self {
            particles: Vec::with_capacity(initial_count),
            buffers: AttributeBuffers::new(),
            rng,
        };
        system.add_particles(initial_count);
        system.publish_buffers();
        log::debug!("particle system created with {} particles", system.len());
        system
    }

    /// Create a system from configuration, seeding from entropy when no seed is set.
    pub fn from_config(config: &ParticleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config.initial_count, rng)
    }

    /// Wrap an existing set of particles and publish once.
    pub fn from_particles(particles: Vec<Particle>, rng: StdRng) -> Self {
        let mut system = Self {
            particles,
            buffers: AttributeBuffers::new(),
            rng,
        };
        system.publish_buffers();
        system
    }

    /// Append `count` freshly randomised particles.
    ///
    /// The buffers are not republished; that happens on the next
    /// [`step`](Self::step) or an explicit [`publish_buffers`](Self::publish_buffers).
    pub fn add_particles(&mut self, count: usize) {
        self.particles.reserve(count);
        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|_| Particle::random(rng)));
    }

    /// Flatten the particles, in their current order, into the attribute buffers.
    pub fn publish_buffers(&mut self) {
        let n = self.particles.len();
        let mut positions = Vec::with_capacity(n * AttributeBuffers::POSITION_STRIDE);
        let mut sizes = Vec::with_capacity(n * AttributeBuffers::SIZE_STRIDE);
        let mut colours = Vec::with_capacity(n * AttributeBuffers::COLOUR_STRIDE);

        for p in &self.particles {
            positions.extend_from_slice(&p.position.to_array());
            sizes.push(p.size);
            colours.extend_from_slice(&p.rgba());
        }

        self.buffers.position.replace(positions);
        self.buffers.size.replace(sizes);
        self.buffers.colour.replace(colours);
    }

    /// Sort back-to-front relative to `camera_position`, then publish.
    ///
    /// `_delta_time` is accepted for the frame-loop signature; particles do
    /// not animate.
    pub fn step(&mut self, _delta_time: f32, camera_position: Vec3) {
        self.sort_by_camera_distance(camera_position);
        self.publish_buffers();
    }

    /// Order particles by descending distance to `camera_position`.
    ///
    /// Stable: equidistant particles keep their relative order.
    pub fn sort_by_camera_distance(&mut self, camera_position: Vec3) {
        self.particles.sort_by(|a, b| {
            let da = a.distance_squared_to(camera_position);
            let db = b.distance_squared_to(camera_position);
            db.total_cmp(&da)
        });
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn buffers(&self) -> &AttributeBuffers {
        &self.buffers
    }

    /// Mutable buffers, for the uploader to clear dirty flags.
    pub fn buffers_mut(&mut self) -> &mut AttributeBuffers {
        &mut self.buffers
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Particle {
        Particle {
            position: Vec3::new(x, 0.0, 0.0),
            size: x.abs(),
            colour: Vec3::splat(0.5),
            alpha: 0.5,
        }
    }

    #[test]
    fn test_new_publishes_initial_batch() {
        let system = ParticleSystem::new(DEFAULT_BATCH, StdRng::seed_from_u64(1));
        assert_eq!(system.len(), 10);
        assert_eq!(system.buffers().len(), 10);
        assert!(system.buffers().needs_update());
    }

    #[test]
    fn test_add_particles_does_not_publish() {
        let mut system = ParticleSystem::new(2, StdRng::seed_from_u64(1));
        system.add_particles(3);
        assert_eq!(system.len(), 5);
        assert_eq!(system.buffers().len(), 2);
        system.publish_buffers();
        assert_eq!(system.buffers().len(), 5);
    }

    #[test]
    fn test_sort_is_farthest_first() {
        let mut system = ParticleSystem::from_particles(
            vec![at(1.0), at(4.0), at(2.0), at(3.0)],
            StdRng::seed_from_u64(0),
        );
        system.sort_by_camera_distance(Vec3::ZERO);
        let xs: Vec<f32> = system.particles().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        // Both at distance 2, on opposite sides of the camera.
        let mut left = at(-2.0);
        left.size = 10.0;
        let mut right = at(2.0);
        right.size = 20.0;
        let mut system = ParticleSystem::from_particles(
            vec![at(1.0), left, right],
            StdRng::seed_from_u64(0),
        );
        system.sort_by_camera_distance(Vec3::ZERO);
        let sizes: Vec<f32> = system.particles().iter().map(|p| p.size).collect();
        assert_eq!(sizes, vec![10.0, 20.0, 1.0]);
    }

    #[test]
    fn test_sort_with_nan_camera_does_not_panic() {
        let mut system = ParticleSystem::new(10, StdRng::seed_from_u64(3));
        system.step(0.016, Vec3::splat(f32::NAN));
        assert_eq!(system.len(), 10);
    }

    #[test]
    fn test_empty_system() {
        let mut system = ParticleSystem::new(0, StdRng::seed_from_u64(0));
        system.step(0.0, Vec3::ONE);
        assert!(system.is_empty());
        assert!(system.buffers().is_empty());
    }

    #[test]
    fn test_seeded_config_is_deterministic() {
        let config = ParticleConfig {
            initial_count: 10,
            seed: Some(42),
            ..Default::default()
        };
        let a = ParticleSystem::from_config(&config);
        let b = ParticleSystem::from_config(&config);
        assert_eq!(a.particles(), b.particles());
    }
}
