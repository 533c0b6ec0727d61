//! One fixed tick of player physics.
//!
//! [`PhysicsEngine::step`] runs the tick in a fixed order; later stages read
//! what earlier ones wrote:
//!
//! 1. clamp to the top of the playfield
//! 2. classify steering direction
//! 3. sample foot tiles and resolve the current tile
//! 4. advance the surface state machine, apply ice effects and bounce pads
//! 5. jump and horizontal steering
//! 6. friction, gravity (capped only if `max_fall_speed` is set), the
//!    angled-jump nudge, then the speed clamp
//! 7. horizontal move + resolve, vertical move + resolve, kill plane
//! 8. landing effects
//! 9. goal check
//!
//! Steps are no-ops for entities that are not alive, so a dead or celebrating
//! entity stays frozen until the host calls [`Entity::reset`].

use crate::collision::{overlapping_goal, resolve_horizontal, resolve_vertical, Body, ContactState};
use crate::config::{PhysicsConfig, REFERENCE_TICK_MS};
use crate::entity::{Entity, JumpState, Liveness};
use crate::events::{DeathCause, EventSink};
use crate::level::Level;
use crate::particles::{ParticleEmitter, ParticleKind, TrailSource};
use crate::surface::{SurfaceContact, SurfaceState};
use crate::tiles::{GridCell, RoleSet, TileGrid, TileRole};
use frost_core::input::InputSnapshot;
use glam::Vec2;

/// Tiles under the four foot points, with their roles OR'd together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FootContact {
    /// Known tile ids in foot-point order; empty, unknown and out-of-bounds
    /// samples are `None`.
    pub tiles: [Option<u16>; 4],
    pub roles: RoleSet,
}

impl FootContact {
    pub fn sample(grid: &TileGrid, entity: &Entity) -> Self {
        let mut contact = Self::default();
        for (slot, (px, py)) in contact.tiles.iter_mut().zip(entity.foot_points()) {
            if let Some((id, tile)) = grid.tile_at_point(px, py) {
                *slot = Some(id);
                contact.roles = contact.roles.union(tile.roles);
            }
        }
        contact
    }

    pub fn touching(&self, role: TileRole) -> bool {
        self.roles.contains(role)
    }

    /// Grounded entities read the probe below their center; airborne ones the
    /// first foot point that hit anything.
    pub fn current_tile(&self, grounded: bool) -> Option<u16> {
        if grounded {
            self.tiles[3]
        } else {
            self.tiles.iter().flatten().next().copied()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Died(DeathCause),
    ReachedGoal(GridCell),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// False when the entity was not alive and nothing happened.
    pub ran: bool,
    pub foot: FootContact,
    pub contacts: ContactState,
    pub landed: bool,
    pub terminal: Option<Terminal>,
}

pub struct PhysicsEngine<S: EventSink> {
    config: PhysicsConfig,
    sink: S,
    emitter: ParticleEmitter,
}

impl<S: EventSink> PhysicsEngine<S> {
    pub fn new(config: PhysicsConfig, sink: S) -> Self {
        Self {
            emitter: ParticleEmitter::new(config.particle_seed),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Fresh entity at the level's spawn point.
    pub fn spawn(&self, level: &Level) -> Entity {
        let (x, y) = level.spawn_point();
        Entity::new(x, y, &self.config)
    }

    /// Advance `entity` by `dt_ms` against `grid`. Velocities scale by
    /// `dt_ms / REFERENCE_TICK_MS`, so a 60 Hz tick uses them unscaled.
    pub fn step(
        &mut self,
        entity: &mut Entity,
        grid: &TileGrid,
        input: InputSnapshot,
        dt_ms: f64,
    ) -> StepReport {
        if !entity.is_alive() {
            return StepReport::default();
        }
        let cfg = self.config;
        let ts = (dt_ms / REFERENCE_TICK_MS) as f32;
        let mut report = StepReport {
            ran: true,
            ..StepReport::default()
        };
        entity.ticks += 1;
        entity.level_time_ms += dt_ms;

        if entity.y < 0.0 {
            entity.y = 0.0;
            entity.vel_y = entity.vel_y.max(0.0);
        }

        entity.moving_direction = if input.right {
            1
        } else if input.left {
            -1
        } else {
            0
        };

        let foot = FootContact::sample(grid, entity);
        entity.current_tile = foot.current_tile(entity.grounded);
        report.foot = foot;

        self.update_surface(entity, &foot, ts);
        self.apply_bounce(entity, &foot);
        self.handle_input(entity, input, ts);
        self.integrate(entity, ts);

        entity.grounded = false;
        let mut body = Body {
            aabb: entity.aabb(),
            vel_x: entity.vel_x,
            vel_y: entity.vel_y,
        };
        body.aabb.x += body.vel_x * ts;
        let horizontal = resolve_horizontal(grid, &mut body);
        write_back(entity, &body);
        if let Some(cell) = horizontal.hazard {
            report.terminal = Some(self.kill(entity, DeathCause::Hazard { cell }));
            return report;
        }

        let impact_speed = body.vel_y.abs();
        body.aabb.y += body.vel_y * ts;
        let vertical = resolve_vertical(grid, &mut body);
        write_back(entity, &body);
        if let Some(cell) = vertical.hazard {
            report.terminal = Some(self.kill(entity, DeathCause::Hazard { cell }));
            return report;
        }
        report.contacts = horizontal.contacts;
        report.contacts.left |= vertical.contacts.left;
        report.contacts.right |= vertical.contacts.right;
        report.contacts.down = vertical.contacts.down;
        report.contacts.up = vertical.contacts.up;
        if vertical.contacts.down {
            entity.grounded = true;
            entity.jump.jumping = false;
            entity.jump.angled = false;
        }

        let kill_plane = cfg.kill_plane_y.unwrap_or_else(|| grid.pixel_height());
        if entity.y > kill_plane {
            report.terminal = Some(self.kill(entity, DeathCause::FellOut));
            return report;
        }

        if !entity.was_grounded && entity.grounded {
            report.landed = true;
            entity.jump = JumpState::default();
            // Settling onto the floor after a spawn or reset is not an impact.
            if impact_speed > cfg.gravity * ts {
                let batches = (impact_speed / 3.0).min(5.0).ceil() as u32;
                for _ in 0..batches {
                    self.burst(ParticleKind::Land, entity);
                }
            }
        }
        entity.was_grounded = entity.grounded;

        if let Some(cell) = overlapping_goal(grid, &entity.aabb()) {
            entity.liveness = Liveness::Celebrating;
            log::debug!(
                "Goal reached at ({}, {}) after {:.0} ms",
                cell.x,
                cell.y,
                entity.level_time_ms
            );
            self.sink.on_goal(entity.level_time_ms);
            self.burst(ParticleKind::Goal, entity);
            report.terminal = Some(Terminal::ReachedGoal(cell));
            return report;
        }

        if entity.surface.on_ice()
            && entity.grounded
            && entity.vel_x.abs() > 5.0
            && self.emitter.chance(0.2)
        {
            self.burst(ParticleKind::IceSlide, entity);
        }

        report
    }

    fn update_surface(&mut self, entity: &mut Entity, foot: &FootContact, ts: f32) {
        let cfg = self.config;
        let before = entity.surface;
        let contact = SurfaceContact {
            touching_ice: foot.touching(TileRole::Ice),
            grounded: entity.grounded,
        };
        let mut surface = before.transition(contact, ts, cfg.ice_jump_duration);
        if std::mem::discriminant(&before) != std::mem::discriminant(&surface) {
            log::trace!(
                "Surface {:?} -> {:?}",
                before.phase(entity.grounded, cfg.ice_jump_duration),
                surface.phase(entity.grounded, cfg.ice_jump_duration)
            );
        }

        match &mut surface {
            SurfaceState::OnIce(ice) => {
                let max_speed = cfg.ice_max_speed;
                if !ice.memory.boost_spent && entity.vel_x.abs() > cfg.ice_boost_min_speed {
                    entity.vel_x =
                        (entity.vel_x * cfg.ice_boost_multiplier).clamp(-max_speed, max_speed);
                    ice.memory.boost_spent = true;
                    log::debug!("Ice entry boost to {:.2}", entity.vel_x);
                    let origin = Vec2::new(entity.center_x(), entity.bottom() - 2.0);
                    for request in self.emitter.ice_transition(origin, entity.vel_x) {
                        self.sink.on_particle(request);
                    }
                }

                let steering_with_velocity = (entity.moving_direction > 0 && entity.vel_x >= 0.0)
                    || (entity.moving_direction < 0 && entity.vel_x <= 0.0);
                if steering_with_velocity
                    && ice.memory.ice_time > cfg.ice_slide_delay
                    && entity.vel_x.abs() < max_speed
                {
                    let bonus =
                        (ice.memory.ice_time / cfg.ice_slide_ramp).min(1.0) * cfg.ice_slide_bonus;
                    if entity.vel_x > 0.0 {
                        entity.vel_x += bonus * ts;
                    } else if entity.vel_x < 0.0 {
                        entity.vel_x -= bonus * ts;
                    }
                    if self.emitter.chance(0.05) && entity.vel_x.abs() > max_speed * 0.6 {
                        self.trail(entity, false);
                    }
                }

                ice.inertia = entity.vel_x;
            }
            SurfaceState::Airborne(residual) if residual.is_active(cfg.ice_jump_duration) => {
                let strength = residual.strength(cfg.ice_jump_duration);
                if residual.inertia.abs() > 2.0 {
                    entity.vel_x += residual.inertia * cfg.ice_inertia_bleed * strength * ts;
                }
                if self.emitter.chance(0.02 * strength) && entity.vel_x.abs() > 5.0 {
                    self.trail(entity, true);
                }
            }
            SurfaceState::Airborne(_) | SurfaceState::Normal => {}
        }
        entity.surface = surface;
    }

    fn apply_bounce(&mut self, entity: &mut Entity, foot: &FootContact) {
        if !foot.touching(TileRole::Bounce) || entity.vel_y <= 0.0 {
            return;
        }
        let cfg = self.config;
        entity.vel_y = cfg.jump_force * cfg.bounce_multiplier;
        if entity.vel_x.abs() > 2.0 {
            entity.vel_x *= cfg.bounce_horizontal_boost;
        }
        self.burst(ParticleKind::Bounce, entity);
    }

    fn handle_input(&mut self, entity: &mut Entity, input: InputSnapshot, ts: f32) {
        let cfg = self.config;
        let on_ice = entity.surface.on_ice();
        let max_speed = entity.max_speed(&cfg);

        if input.jump && !entity.jump.jumping && entity.grounded {
            entity.jump.jumping = true;
            entity.grounded = false;
            entity.vel_y = cfg.jump_force;
            if let SurfaceState::OnIce(ice) = &mut entity.surface {
                ice.inertia = entity.vel_x;
            }

            let speed = entity.vel_x.abs();
            if speed > cfg.angled_jump_threshold {
                let direction = entity.vel_x.signum();
                entity.jump.angled = true;
                entity.jump.direction = direction as i8;
                let boost = (speed * entity.surface.jump_factor(&cfg)).min(max_speed * 0.5);
                entity.vel_x += direction * boost;
                if on_ice && speed > cfg.angled_jump_fast_speed {
                    entity.vel_y *= cfg.angled_jump_flatten;
                }
            } else {
                entity.jump.angled = false;
                entity.jump.direction = 0;
            }
            self.burst(ParticleKind::Jump, entity);
        }

        let assist = if on_ice {
            cfg.ice_acceleration_multiplier * cfg.ice_control_assist
        } else {
            1.0
        };
        let force = cfg.move_speed / 10.0 * ts * assist;
        if input.right {
            if entity.vel_x < max_speed {
                entity.vel_x += force;
            }
            entity.facing_right = true;
        }
        if input.left {
            if entity.vel_x > -max_speed {
                entity.vel_x -= force;
            }
            entity.facing_right = false;
        }
    }

    fn integrate(&mut self, entity: &mut Entity, ts: f32) {
        let cfg = self.config;
        let friction = entity.friction(&cfg);
        if entity.surface.on_ice() {
            // Ice decays at half rate and snaps tiny drift to rest.
            if entity.vel_x.abs() > 0.5 {
                entity.vel_x *= friction.powf(ts * 0.5);
            } else {
                entity.vel_x = 0.0;
            }
        } else {
            entity.vel_x *= friction.powf(ts);
        }

        entity.vel_y += cfg.gravity * ts;
        if let Some(cap) = cfg.max_fall_speed {
            entity.vel_y = entity.vel_y.min(cap);
        }

        if entity.jump.angled && !entity.grounded && entity.vel_y.abs() < cfg.angled_jump_push_window
        {
            entity.vel_x += f32::from(entity.jump.direction) * cfg.angled_jump_air_push * ts;
        }

        let max_speed = entity.max_speed(&cfg);
        entity.vel_x = entity.vel_x.clamp(-max_speed, max_speed);
    }

    /// Idempotent: only a living entity can die.
    fn kill(&mut self, entity: &mut Entity, cause: DeathCause) -> Terminal {
        if entity.is_alive() {
            entity.liveness = Liveness::Dead;
            log::debug!(
                "Entity died ({cause:?}) at ({:.1}, {:.1}) after {} ticks",
                entity.x,
                entity.y,
                entity.ticks
            );
            self.sink.on_death(cause);
            self.burst(ParticleKind::Death, entity);
        }
        Terminal::Died(cause)
    }

    fn burst(&mut self, kind: ParticleKind, entity: &Entity) {
        let origin = Vec2::new(entity.center_x(), entity.bottom());
        for request in self.emitter.burst(kind, origin) {
            self.sink.on_particle(request);
        }
    }

    fn trail(&mut self, entity: &Entity, in_air: bool) {
        let source = TrailSource {
            x: entity.x,
            y: entity.y,
            width: entity.width,
            height: entity.height,
            vel_x: entity.vel_x,
        };
        for request in self.emitter.ice_trail(source, in_air) {
            self.sink.on_particle(request);
        }
    }
}

fn write_back(entity: &mut Entity, body: &Body) {
    entity.x = body.aabb.x;
    entity.y = body.aabb.y;
    entity.vel_x = body.vel_x;
    entity.vel_y = body.vel_y;
}
