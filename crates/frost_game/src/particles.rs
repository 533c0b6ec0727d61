//! Host-owned particle pool. The physics engine only requests particles; the
//! host ages them and drops them when their life runs out.

use frost_physics::config::REFERENCE_TICK_MS;
use frost_physics::particles::ParticleRequest;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: &'static str,
    pub gravity: f32,
    /// Remaining life in reference ticks.
    pub life: f32,
}

impl From<ParticleRequest> for Particle {
    fn from(request: ParticleRequest) -> Self {
        Self {
            position: request.position,
            velocity: request.velocity,
            size: request.size,
            color: request.color,
            gravity: request.gravity,
            life: request.lifetime,
        }
    }
}

pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    pub dropped: u64,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Requests past capacity are counted and discarded.
    pub fn spawn(&mut self, request: ParticleRequest) {
        if self.particles.len() >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.particles.push(request.into());
    }

    pub fn update(&mut self, dt_ms: f64) {
        let ts = (dt_ms / REFERENCE_TICK_MS) as f32;
        for particle in &mut self.particles {
            particle.position += particle.velocity * ts;
            particle.velocity.y += particle.gravity * ts;
            particle.life -= ts;
        }
        self.particles.retain(|particle| particle.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
