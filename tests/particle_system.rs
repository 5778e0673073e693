//! Integration tests for the particle store and sorter.
//!
//! These drive [`ParticleSystem`] headless through its public API only.

use glam::Vec3;
use pyre::{AttributeBuffers, Particle, ParticleConfig, ParticleSystem};
use rand::{rngs::StdRng, SeedableRng};

fn seeded(count: usize) -> ParticleSystem {
    ParticleSystem::new(count, StdRng::seed_from_u64(0xF1E))
}

fn particle_at(position: Vec3, size: f32) -> Particle {
    Particle {
        position,
        size,
        colour: Vec3::new(0.9, 0.4, 0.1),
        alpha: 0.5,
    }
}

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_default_population_is_ten() {
    let system = ParticleSystem::from_config(&ParticleConfig {
        seed: Some(1),
        ..Default::default()
    });
    assert_eq!(system.len(), 10);
    assert_eq!(system.buffers().len(), 10);
}

#[test]
fn test_add_particles_grows_by_exactly_n() {
    let mut system = seeded(10);
    for n in [0, 1, 7, 25] {
        let before = system.len();
        system.add_particles(n);
        assert_eq!(system.len(), before + n);
    }
}

#[test]
fn test_step_never_changes_population() {
    let mut system = seeded(10);
    for i in 0..20 {
        let camera = Vec3::new(i as f32, 10.0, -(i as f32));
        system.step(0.016, camera);
        assert_eq!(system.len(), 10);
    }
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_every_particle_within_ranges() {
    let mut system = seeded(10);
    system.add_particles(2_000);
    for p in system.particles() {
        assert!((0.0..2.0).contains(&p.size), "size {}", p.size);
        assert!((0.0..1.0).contains(&p.alpha), "alpha {}", p.alpha);
        for c in p.colour.to_array() {
            assert!((0.0..1.0).contains(&c), "colour {}", c);
        }
        for x in p.position.to_array() {
            assert!((-1.0..1.0).contains(&x), "position {}", x);
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_known_distances_sorted_farthest_first() {
    let camera = Vec3::new(0.0, 0.0, 0.0);
    let particles = vec![
        particle_at(Vec3::new(1.0, 0.0, 0.0), 0.1),
        particle_at(Vec3::new(0.0, 5.0, 0.0), 0.2),
        particle_at(Vec3::new(0.0, 0.0, 3.0), 0.3),
        particle_at(Vec3::new(-5.0, 0.0, 0.0), 0.4),
    ];
    let mut system = ParticleSystem::from_particles(particles, StdRng::seed_from_u64(1));
    system.step(0.016, camera);

    let distances: Vec<f32> = system
        .particles()
        .iter()
        .map(|p| p.position.distance(camera))
        .collect();
    assert_eq!(distances, vec![5.0, 5.0, 3.0, 1.0]);

    // The two tied particles are the 5-unit ones, in some order.
    let mut tied: Vec<f32> = system.particles()[..2].iter().map(|p| p.size).collect();
    tied.sort_by(f32::total_cmp);
    assert_eq!(tied, vec![0.2, 0.4]);
}

#[test]
fn test_random_population_sorted_for_moving_camera() {
    let mut system = seeded(10);
    system.add_particles(90);
    for camera in [
        Vec3::new(25.0, 10.0, 0.0),
        Vec3::new(-3.0, 0.5, 2.0),
        Vec3::new(0.0, 0.0, 0.0),
    ] {
        system.step(0.016, camera);
        let distances: Vec<f32> = system
            .particles()
            .iter()
            .map(|p| p.distance_squared_to(camera))
            .collect();
        assert!(
            distances.windows(2).all(|w| w[0] >= w[1]),
            "not sorted for camera {:?}",
            camera
        );
    }
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_buffer_lengths_track_population() {
    let mut system = seeded(10);
    for added in [0, 5, 40] {
        system.add_particles(added);
        system.step(0.016, Vec3::new(25.0, 10.0, 0.0));
        let n = system.len();
        let buffers = system.buffers();
        assert_eq!(buffers.position.as_slice().len(), AttributeBuffers::POSITION_STRIDE * n);
        assert_eq!(buffers.size.as_slice().len(), AttributeBuffers::SIZE_STRIDE * n);
        assert_eq!(buffers.colour.as_slice().len(), AttributeBuffers::COLOUR_STRIDE * n);
    }
}

#[test]
fn test_publish_preserves_particle_order() {
    let mut system = seeded(10);
    system.add_particles(15);
    system.step(0.016, Vec3::new(25.0, 10.0, 0.0));

    let buffers = system.buffers();
    for (i, p) in system.particles().iter().enumerate() {
        assert_eq!(buffers.position.item(i), Some(&p.position.to_array()[..]));
        assert_eq!(buffers.size.item(i), Some(&[p.size][..]));
        assert_eq!(buffers.colour.item(i), Some(&p.rgba()[..]));
    }
}

#[test]
fn test_colour_buffer_packs_colour_not_position() {
    let p = Particle {
        position: Vec3::new(0.25, -0.5, 0.75),
        size: 1.0,
        colour: Vec3::new(0.1, 0.2, 0.3),
        alpha: 0.4,
    };
    let system = ParticleSystem::from_particles(vec![p], StdRng::seed_from_u64(1));
    assert_eq!(system.buffers().colour.as_slice(), &[0.1, 0.2, 0.3, 0.4]);
}

#[test]
fn test_publish_twice_is_identical() {
    let mut system = seeded(10);
    system.step(0.016, Vec3::new(25.0, 10.0, 0.0));

    system.publish_buffers();
    let first = (
        system.buffers().position.as_slice().to_vec(),
        system.buffers().size.as_slice().to_vec(),
        system.buffers().colour.as_slice().to_vec(),
    );
    system.publish_buffers();
    let second = (
        system.buffers().position.as_slice().to_vec(),
        system.buffers().size.as_slice().to_vec(),
        system.buffers().colour.as_slice().to_vec(),
    );
    assert_eq!(first, second);
}

#[test]
fn test_step_flags_buffers_for_upload() {
    let mut system = seeded(10);
    let buffers = system.buffers_mut();
    buffers.position.take_update();
    buffers.size.take_update();
    buffers.colour.take_update();
    assert!(!system.buffers().needs_update());

    system.step(0.016, Vec3::new(25.0, 10.0, 0.0));
    assert!(system.buffers().position.needs_update());
    assert!(system.buffers().size.needs_update());
    assert!(system.buffers().colour.needs_update());
}

#[test]
fn test_empty_system_steps_cleanly() {
    let mut system = seeded(0);
    system.step(0.016, Vec3::new(25.0, 10.0, 0.0));
    assert!(system.is_empty());
    assert!(system.buffers().is_empty());
}
