//! Confetti particles for catch bursts and bonus flashes.

use glam::Vec2;

/// A single particle with motion and fade state.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Palette slot; the renderer maps it to a color.
    pub color: u8,
    pub lifetime: f32,
    pub max_lifetime: f32,
}

impl Particle {
    pub const DEFAULT_DRAG: f32 = 0.02;

    pub fn new(position: Vec2, velocity: Vec2, size: f32, color: u8, lifetime: f32) -> Self {
        Particle {
            position,
            velocity,
            size,
            color,
            lifetime,
            max_lifetime: lifetime,
        }
    }

    /// Advance particle motion. Returns false when expired.
    pub fn tick(&mut self, gravity: f32, dt: f32) -> bool {
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            return false;
        }
        self.velocity.y += gravity * dt;
        self.velocity *= 1.0 - Self::DEFAULT_DRAG;
        self.position += self.velocity * dt;
        true
    }

    /// Remaining life in [0, 1]; used as opacity.
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            0.0
        } else {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        }
    }
}
