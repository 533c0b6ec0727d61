//! Cosmetic particle requests.
//!
//! The engine never simulates particles; it only describes them and hands
//! them to the host through the event sink. Randomness comes from a seeded
//! `Pcg32` owned by the emitter, so particle output is reproducible for a
//! given seed and never feeds back into kinematics.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Jump,
    Death,
    Bounce,
    Land,
    Goal,
    IceSlide,
    IceTransition,
    IceTrail,
    IceAirTrail,
}

/// Ranges are `(min, max)`; speed is the maximum launch speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub count: u32,
    pub color: &'static str,
    pub size: (f32, f32),
    pub speed: f32,
    pub gravity: f32,
    pub lifetime: (f32, f32),
}

impl ParticleKind {
    pub const fn spec(self) -> ParticleSpec {
        match self {
            Self::Jump => ParticleSpec {
                count: 5,
                color: "#ffffff",
                size: (2.0, 4.0),
                speed: 2.0,
                gravity: 0.1,
                lifetime: (20.0, 40.0),
            },
            Self::Death => ParticleSpec {
                count: 30,
                color: "#ff5555",
                size: (3.0, 6.0),
                speed: 3.0,
                gravity: 0.2,
                lifetime: (30.0, 60.0),
            },
            Self::Bounce => ParticleSpec {
                count: 10,
                color: "#aaaaff",
                size: (2.0, 5.0),
                speed: 3.0,
                gravity: 0.1,
                lifetime: (20.0, 40.0),
            },
            Self::Land => ParticleSpec {
                count: 3,
                color: "#cccccc",
                size: (2.0, 4.0),
                speed: 1.0,
                gravity: 0.1,
                lifetime: (10.0, 30.0),
            },
            Self::Goal => ParticleSpec {
                count: 30,
                color: "#ffff00",
                size: (3.0, 8.0),
                speed: 4.0,
                gravity: 0.05,
                lifetime: (40.0, 80.0),
            },
            Self::IceSlide => ParticleSpec {
                count: 2,
                color: "#b0e0ff",
                size: (1.0, 3.0),
                speed: 1.0,
                gravity: 0.05,
                lifetime: (10.0, 20.0),
            },
            Self::IceTransition => ParticleSpec {
                count: 8,
                color: "#b0e0ff",
                size: (2.0, 5.0),
                speed: 2.0,
                gravity: 0.05,
                lifetime: (20.0, 40.0),
            },
            Self::IceTrail => ParticleSpec {
                count: 2,
                color: "#b0e0ff",
                size: (1.0, 3.0),
                speed: 1.0,
                gravity: 0.01,
                lifetime: (10.0, 20.0),
            },
            Self::IceAirTrail => ParticleSpec {
                count: 1,
                color: "#d0f0ff",
                size: (1.0, 2.0),
                speed: 0.5,
                gravity: 0.01,
                lifetime: (5.0, 10.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRequest {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: &'static str,
    pub gravity: f32,
    /// Remaining life in reference ticks.
    pub lifetime: f32,
}

/// Where a trail is emitted from: the trailing edge of the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSource {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_x: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    rng: Pcg32,
}

impl ParticleEmitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.random::<f32>() < p
    }

    /// `spec.count` particles flung in random directions from `origin`.
    pub fn burst(&mut self, kind: ParticleKind, origin: Vec2) -> Vec<ParticleRequest> {
        let spec = kind.spec();
        (0..spec.count)
            .map(|_| {
                let angle = self.rng.random::<f32>() * TAU;
                self.launch(kind, spec, origin, angle)
            })
            .collect()
    }

    /// Spray kicked up behind the body when it first hits ice at speed.
    pub fn ice_transition(&mut self, origin: Vec2, vel_x: f32) -> Vec<ParticleRequest> {
        let kind = ParticleKind::IceTransition;
        let spec = kind.spec();
        let behind = if vel_x > 0.0 { PI } else { 0.0 };
        (0..spec.count)
            .map(|_| {
                let angle = behind + (self.rng.random::<f32>() - 0.5) * FRAC_PI_2;
                self.launch(kind, spec, origin, angle)
            })
            .collect()
    }

    /// One or two flecks from the trailing edge while sliding. Airborne trails
    /// scatter along the body's height and drift downward.
    pub fn ice_trail(&mut self, source: TrailSource, in_air: bool) -> Vec<ParticleRequest> {
        let kind = if in_air {
            ParticleKind::IceAirTrail
        } else {
            ParticleKind::IceTrail
        };
        let spec = kind.spec();
        let direction = if source.vel_x > 0.0 { PI } else { 0.0 };
        let count = if self.chance(0.3) { spec.count } else { 1 };
        let edge_x = if source.vel_x > 0.0 {
            source.x
        } else {
            source.x + source.width
        };

        (0..count)
            .map(|_| {
                let speed = self.rng.random::<f32>() * spec.speed;
                let size = self.sample(spec.size);
                let lifetime = self.sample(spec.lifetime);
                let (y, drift) = if in_air {
                    (source.y + source.height * self.rng.random::<f32>(), 0.3)
                } else {
                    (source.y + source.height - 2.0, 0.0)
                };
                ParticleRequest {
                    kind,
                    position: Vec2::new(edge_x, y),
                    velocity: Vec2::new(direction.cos() * speed, direction.sin() * speed + drift),
                    size,
                    color: spec.color,
                    gravity: spec.gravity,
                    lifetime,
                }
            })
            .collect()
    }

    fn launch(
        &mut self,
        kind: ParticleKind,
        spec: ParticleSpec,
        origin: Vec2,
        angle: f32,
    ) -> ParticleRequest {
        let speed = self.rng.random::<f32>() * spec.speed;
        ParticleRequest {
            kind,
            position: origin,
            velocity: Vec2::from_angle(angle) * speed,
            size: self.sample(spec.size),
            color: spec.color,
            gravity: spec.gravity,
            lifetime: self.sample(spec.lifetime),
        }
    }

    fn sample(&mut self, (min, max): (f32, f32)) -> f32 {
        min + self.rng.random::<f32>() * (max - min)
    }
}
