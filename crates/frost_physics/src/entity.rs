use crate::collision::Aabb;
use crate::config::PhysicsConfig;
use crate::surface::{SurfacePhase, SurfaceState};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    #[default]
    Alive,
    Dead,
    /// Reached the goal; frozen until the host resets the entity.
    Celebrating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpState {
    pub jumping: bool,
    pub angled: bool,
    /// -1 left, 0 straight up, 1 right.
    pub direction: i8,
}

/// The player body. Position is the top-left corner of the AABB; velocities
/// are pixels per reference tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub grounded: bool,
    /// `grounded` at the end of the previous tick, for landing detection.
    pub was_grounded: bool,
    pub facing_right: bool,
    pub liveness: Liveness,
    pub surface: SurfaceState,
    pub jump: JumpState,
    /// Steering intent from the last input snapshot: -1, 0 or 1.
    pub moving_direction: i8,
    /// Tile id under the feet, resolved once per tick.
    pub current_tile: Option<u16>,
    /// Simulated time since the last reset.
    pub level_time_ms: f64,
    pub ticks: u64,
}

impl Entity {
    pub fn new(x: f32, y: f32, config: &PhysicsConfig) -> Self {
        Self {
            x,
            y,
            width: config.player_width,
            height: config.player_height,
            vel_x: 0.0,
            vel_y: 0.0,
            grounded: false,
            was_grounded: false,
            facing_right: true,
            liveness: Liveness::Alive,
            surface: SurfaceState::Normal,
            jump: JumpState::default(),
            moving_direction: 0,
            current_tile: None,
            level_time_ms: 0.0,
            ticks: 0,
        }
    }

    /// Back to a fresh, living entity at `(x, y)`. Size is kept.
    pub fn reset(&mut self, x: f32, y: f32) {
        let (width, height) = (self.width, self.height);
        *self = Self {
            width,
            height,
            ..Self::new(x, y, &PhysicsConfig::default())
        };
    }

    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Left-inset, center and right-inset points on the bottom edge, then one
    /// point two pixels below the center. The last one is the grounded probe.
    pub fn foot_points(&self) -> [(f32, f32); 4] {
        let bottom = self.bottom();
        [
            (self.x + 2.0, bottom),
            (self.center_x(), bottom),
            (self.x + self.width - 2.0, bottom),
            (self.center_x(), bottom + 2.0),
        ]
    }

    pub fn friction(&self, config: &PhysicsConfig) -> f32 {
        self.surface.friction(config)
    }

    pub fn max_speed(&self, config: &PhysicsConfig) -> f32 {
        self.surface.max_speed(config)
    }

    pub fn phase(&self, config: &PhysicsConfig) -> SurfacePhase {
        self.surface.phase(self.grounded, config.ice_jump_duration)
    }

    /// Hex SHA-256 over the kinematic state. Two runs that agree bit for bit
    /// produce the same digest; timers and particles are excluded.
    pub fn state_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for value in [self.x, self.y, self.vel_x, self.vel_y] {
            hasher.update(value.to_bits().to_le_bytes());
        }
        hasher.update([
            self.grounded as u8,
            self.facing_right as u8,
            self.liveness as u8,
            self.jump.jumping as u8,
            self.jump.angled as u8,
        ]);
        hasher.update(self.jump.direction.to_le_bytes());
        let (tag, ice_time, inertia, timer, boost_spent) = match self.surface {
            SurfaceState::Normal => (0u8, 0.0, 0.0, 0.0, false),
            SurfaceState::OnIce(ice) => (1, ice.memory.ice_time, ice.inertia, 0.0, ice.memory.boost_spent),
            SurfaceState::Airborne(residual) => (
                2,
                residual.memory.ice_time,
                residual.inertia,
                residual.timer,
                residual.memory.boost_spent,
            ),
        };
        hasher.update([tag, boost_spent as u8]);
        for value in [ice_time, inertia, timer] {
            hasher.update(value.to_bits().to_le_bytes());
        }
        let digest = hasher.finalize();
        format!("{digest:x}")
    }
}
