//! Visual effects: confetti bursts on catches and bonus flashes.
//!
//! Effects are cosmetic. They advance on the game tick but never feed back
//! into scoring or collision state.

mod particle;
mod rng;

pub use particle::Particle;
pub use rng::Rng;

use glam::Vec2;

use crate::renderer::instance::{RenderBuffer, RenderInstance, sprite};

/// Number of palette slots a particle color can take.
pub const PALETTE_SIZE: u8 = 6;

/// Container for all live particles.
/// Generic: games spawn bursts via public methods.
pub struct EffectsState {
    pub particles: Vec<Particle>,
    pub rng: Rng,
    /// Downward acceleration applied to confetti, in units/s².
    pub gravity: f32,
    /// Upper bound on live particles; the oldest are dropped first.
    pub max_particles: usize,
}

impl EffectsState {
    /// Create a new EffectsState with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        EffectsState {
            particles: Vec::with_capacity(128),
            rng: Rng::new(seed.wrapping_add(7919)),
            gravity: 240.0,
            max_particles: 128,
        }
    }

    /// Spawn `count` particles flying out of `center` in random directions.
    pub fn spawn_burst(&mut self, center: Vec2, count: usize, speed: f32, lifetime: f32) {
        for _ in 0..count {
            let angle = self.rng.range_f32(0.0, std::f32::consts::TAU);
            let magnitude = self.rng.range_f32(0.3, 1.0) * speed;
            let velocity = Vec2::new(angle.cos(), angle.sin()) * magnitude;
            let color = self.rng.next_int(PALETTE_SIZE as u32) as u8;
            let size = self.rng.range_f32(3.0, 6.0);
            self.particles
                .push(Particle::new(center, velocity, size, color, lifetime));
        }
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Advance all particles, dropping the expired ones.
    pub fn tick(&mut self, dt: f32) {
        let gravity = self.gravity;
        self.particles.retain_mut(|p| p.tick(gravity, dt));
    }

    /// Append one render instance per live particle.
    pub fn project(&self, buffer: &mut RenderBuffer) {
        for p in &self.particles {
            buffer.push(RenderInstance {
                x: p.position.x,
                y: p.position.y,
                width: p.size,
                height: p.size,
                rotation: 0.0,
                sprite: sprite::PARTICLE,
                variant: p.color as f32,
                alpha: p.alpha(),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remove every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_spawns_requested_count() {
        let mut fx = EffectsState::new(1);
        fx.spawn_burst(Vec2::new(10.0, 10.0), 12, 100.0, 0.5);
        assert_eq!(fx.particles.len(), 12);
        assert!(fx.particles.iter().all(|p| p.color < PALETTE_SIZE));
    }

    #[test]
    fn particles_expire_after_lifetime() {
        let mut fx = EffectsState::new(1);
        fx.spawn_burst(Vec2::ZERO, 5, 50.0, 0.2);
        fx.tick(0.1);
        assert!(!fx.is_empty());
        fx.tick(0.2);
        assert!(fx.is_empty());
    }

    #[test]
    fn burst_respects_particle_cap() {
        let mut fx = EffectsState::new(1);
        fx.max_particles = 10;
        fx.spawn_burst(Vec2::ZERO, 25, 50.0, 1.0);
        assert_eq!(fx.particles.len(), 10);
    }

    #[test]
    fn project_writes_one_instance_per_particle() {
        let mut fx = EffectsState::new(3);
        fx.spawn_burst(Vec2::ZERO, 4, 50.0, 1.0);
        let mut buf = RenderBuffer::new();
        fx.project(&mut buf);
        assert_eq!(buf.instance_count(), 4);
        assert!(buf.instances.iter().all(|i| i.sprite == sprite::PARTICLE));
    }
}
