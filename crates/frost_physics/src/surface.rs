//! Surface memory: the ice state machine.
//!
//! Ice does not switch off at the tile boundary. After the entity leaves ice
//! airborne, a residual effect keeps friction slippery and bleeds stored
//! momentum back into horizontal velocity, fading out over
//! `ice_jump_duration` ticks. Touching plain ground while grounded clears all
//! of it at once.
//!
//! ```text
//!            touch ice                      leave ice airborne
//!   Normal ─────────────▶ OnIce ───────────────────────────────▶ Airborne(residual)
//!     ▲                     ▲  ◀──────── touch ice ──────────────────┘   │
//!     │                     │                                           │ timer >= duration:
//!     └──── grounded on non-ice (from any state) ◀──────────────────────┘ residual spent
//! ```
//!
//! Combined with the collision-driven `grounded` flag this yields the four
//! observable phases in [`SurfacePhase`].

use crate::config::PhysicsConfig;

/// Memory that survives short trips through the air between ice tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceMemory {
    /// Ticks spent touching ice since the last plain-ground contact.
    pub ice_time: f32,
    /// Set once the entry boost fired; re-armed only by returning to `Normal`.
    pub boost_spent: bool,
}

impl IceMemory {
    const FRESH: Self = Self {
        ice_time: 0.0,
        boost_spent: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceContact {
    pub memory: IceMemory,
    /// Mirrors horizontal velocity while on ice.
    pub inertia: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceResidual {
    pub memory: IceMemory,
    /// Horizontal velocity frozen at the moment the entity left ice.
    pub inertia: f32,
    /// Ticks since leaving ice. Stops advancing once the residual is spent.
    pub timer: f32,
}

impl IceResidual {
    pub fn is_active(&self, duration: f32) -> bool {
        self.timer < duration
    }

    /// 1.0 right after leaving ice, falling linearly to 0.0 at `duration`.
    pub fn strength(&self, duration: f32) -> f32 {
        (1.0 - self.timer / duration).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SurfaceState {
    #[default]
    Normal,
    OnIce(IceContact),
    Airborne(IceResidual),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    GroundedNormal,
    GroundedIce,
    AirborneIceResidual,
    AirborneNormal,
}

/// What the foot probes and the last collision pass reported this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceContact {
    pub touching_ice: bool,
    pub grounded: bool,
}

impl SurfaceState {
    /// Pure transition for one tick. Velocity side effects (entry boost, slide
    /// bonus, inertia bleed) are applied by the engine against the new state.
    pub fn transition(self, contact: SurfaceContact, time_scale: f32, duration: f32) -> Self {
        if contact.touching_ice {
            let (memory, inertia) = match self {
                Self::Normal => (IceMemory::FRESH, 0.0),
                Self::OnIce(ice) => (ice.memory, ice.inertia),
                Self::Airborne(residual) => (residual.memory, residual.inertia),
            };
            return Self::OnIce(IceContact {
                memory: IceMemory {
                    ice_time: memory.ice_time + time_scale,
                    ..memory
                },
                inertia,
            });
        }

        if contact.grounded {
            return Self::Normal;
        }

        match self {
            Self::Normal => Self::Normal,
            Self::OnIce(ice) => Self::Airborne(IceResidual {
                memory: ice.memory,
                inertia: ice.inertia,
                timer: time_scale,
            }),
            Self::Airborne(residual) if residual.is_active(duration) => {
                Self::Airborne(IceResidual {
                    timer: residual.timer + time_scale,
                    ..residual
                })
            }
            spent @ Self::Airborne(_) => spent,
        }
    }

    /// True from the first ice contact until plain ground is touched again,
    /// including after the residual has faded.
    pub fn on_ice(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// True while ice physics are actively in effect: on ice, or airborne with
    /// an unspent residual.
    pub fn was_on_ice(&self, duration: f32) -> bool {
        match self {
            Self::Normal => false,
            Self::OnIce(_) => true,
            Self::Airborne(residual) => residual.is_active(duration),
        }
    }

    pub fn ice_inertia(&self) -> f32 {
        match self {
            Self::Normal => 0.0,
            Self::OnIce(ice) => ice.inertia,
            Self::Airborne(residual) => residual.inertia,
        }
    }

    pub fn ice_time(&self) -> f32 {
        match self {
            Self::Normal => 0.0,
            Self::OnIce(ice) => ice.memory.ice_time,
            Self::Airborne(residual) => residual.memory.ice_time,
        }
    }

    pub fn friction(&self, config: &PhysicsConfig) -> f32 {
        match self {
            Self::Normal => config.default_friction,
            Self::OnIce(_) => config.ice_friction,
            Self::Airborne(residual) if residual.is_active(config.ice_jump_duration) => {
                let strength = residual.strength(config.ice_jump_duration);
                config.default_friction + (config.ice_friction - config.default_friction) * strength
            }
            Self::Airborne(_) => config.default_friction,
        }
    }

    pub fn max_speed(&self, config: &PhysicsConfig) -> f32 {
        if self.on_ice() {
            config.ice_max_speed
        } else {
            config.move_speed
        }
    }

    pub fn jump_factor(&self, config: &PhysicsConfig) -> f32 {
        if self.on_ice() {
            config.ice_horizontal_jump_factor
        } else {
            config.horizontal_jump_factor
        }
    }

    pub fn phase(&self, grounded: bool, duration: f32) -> SurfacePhase {
        match self {
            Self::OnIce(_) => SurfacePhase::GroundedIce,
            Self::Airborne(residual) if residual.is_active(duration) => {
                SurfacePhase::AirborneIceResidual
            }
            _ if grounded => SurfacePhase::GroundedNormal,
            _ => SurfacePhase::AirborneNormal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: f32 = 45.0;

    const ON_ICE: SurfaceContact = SurfaceContact {
        touching_ice: true,
        grounded: true,
    };
    const IN_AIR: SurfaceContact = SurfaceContact {
        touching_ice: false,
        grounded: false,
    };
    const ON_GROUND: SurfaceContact = SurfaceContact {
        touching_ice: false,
        grounded: true,
    };

    fn on_ice_with(inertia: f32, boost_spent: bool) -> SurfaceState {
        SurfaceState::OnIce(IceContact {
            memory: IceMemory {
                ice_time: 12.0,
                boost_spent,
            },
            inertia,
        })
    }

    #[test]
    fn touching_ice_from_normal_starts_fresh_memory() {
        let next = SurfaceState::Normal.transition(ON_ICE, 1.0, DURATION);
        let SurfaceState::OnIce(ice) = next else {
            panic!("expected OnIce, got {next:?}");
        };
        assert_eq!(ice.memory.ice_time, 1.0);
        assert!(!ice.memory.boost_spent);
    }

    #[test]
    fn ice_time_accumulates_while_on_ice() {
        let mut state = SurfaceState::Normal;
        for _ in 0..10 {
            state = state.transition(ON_ICE, 1.0, DURATION);
        }
        assert_eq!(state.ice_time(), 10.0);
    }

    #[test]
    fn leaving_ice_airborne_freezes_inertia_and_starts_timer() {
        let next = on_ice_with(6.5, true).transition(IN_AIR, 1.0, DURATION);
        let SurfaceState::Airborne(residual) = next else {
            panic!("expected Airborne, got {next:?}");
        };
        assert_eq!(residual.inertia, 6.5);
        assert_eq!(residual.timer, 1.0);
        assert!(residual.memory.boost_spent);
        assert_eq!(next.phase(false, DURATION), SurfacePhase::AirborneIceResidual);
    }

    #[test]
    fn residual_expires_after_duration_and_stops_counting() {
        let mut state = on_ice_with(10.0, false);
        for _ in 0..45 {
            state = state.transition(IN_AIR, 1.0, DURATION);
        }
        assert!(!state.was_on_ice(DURATION));
        assert!(state.on_ice(), "ice memory lingers until plain ground");
        assert_eq!(state.phase(false, DURATION), SurfacePhase::AirborneNormal);

        let spent = state.transition(IN_AIR, 1.0, DURATION);
        assert_eq!(spent, state);
    }

    #[test]
    fn grounded_on_plain_ground_resets_from_any_state() {
        let residual = on_ice_with(4.0, true).transition(IN_AIR, 1.0, DURATION);
        for state in [on_ice_with(4.0, true), residual, SurfaceState::Normal] {
            assert_eq!(
                state.transition(ON_GROUND, 1.0, DURATION),
                SurfaceState::Normal
            );
        }
    }

    #[test]
    fn returning_to_ice_from_air_keeps_spent_boost() {
        let airborne = on_ice_with(7.0, true).transition(IN_AIR, 1.0, DURATION);
        let SurfaceState::OnIce(ice) = airborne.transition(ON_ICE, 1.0, DURATION) else {
            panic!("expected OnIce");
        };
        assert!(ice.memory.boost_spent);
        assert_eq!(ice.memory.ice_time, 13.0);
    }

    #[test]
    fn plain_air_stays_normal() {
        assert_eq!(
            SurfaceState::Normal.transition(IN_AIR, 1.0, DURATION),
            SurfaceState::Normal
        );
        assert_eq!(
            SurfaceState::Normal.phase(false, DURATION),
            SurfacePhase::AirborneNormal
        );
        assert_eq!(
            SurfaceState::Normal.phase(true, DURATION),
            SurfacePhase::GroundedNormal
        );
    }

    #[test]
    fn friction_interpolates_during_residual() {
        let config = PhysicsConfig::default();
        let mut state = on_ice_with(5.0, true);
        assert_eq!(state.friction(&config), config.ice_friction);

        state = state.transition(IN_AIR, 1.0, DURATION);
        let friction = state.friction(&config);
        assert!(friction < config.ice_friction);
        assert!(friction > config.default_friction);

        for _ in 0..50 {
            state = state.transition(IN_AIR, 1.0, DURATION);
        }
        assert_eq!(state.friction(&config), config.default_friction);
        assert_eq!(state.max_speed(&config), config.ice_max_speed);
    }

    #[test]
    fn derived_speed_and_jump_factor_follow_ice_memory() {
        let config = PhysicsConfig::default();
        assert_eq!(SurfaceState::Normal.max_speed(&config), config.move_speed);
        assert_eq!(
            SurfaceState::Normal.jump_factor(&config),
            config.horizontal_jump_factor
        );
        let ice = on_ice_with(0.0, false);
        assert_eq!(ice.max_speed(&config), config.ice_max_speed);
        assert_eq!(ice.jump_factor(&config), config.ice_horizontal_jump_factor);
    }
}
