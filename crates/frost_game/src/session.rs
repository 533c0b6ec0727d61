//! One play session on one level: owns the clock, input, engine and entity and
//! turns physics events into deaths, respawns and level completion.

use std::collections::HashSet;

use frost_core::input::{InputState, Key};
use frost_core::time::SimulationClock;
use frost_physics::engine::PhysicsEngine;
use frost_physics::entity::Entity;
use frost_physics::events::{EventLog, PhysicsEvent};
use frost_physics::level::Level;

use crate::config::HostConfig;
use crate::particles::ParticlePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Running,
    Quit,
}

pub struct GameSession {
    level: Level,
    engine: PhysicsEngine<EventLog>,
    entity: Entity,
    input: InputState,
    clock: SimulationClock,
    particles: ParticlePool,
    respawn_delay_ms: f64,
    respawn_in_ms: Option<f64>,
    deaths: u32,
    completed_ms: Option<f64>,
    // Host keys are edge-detected per frame, independent of whether a fixed
    // step ran, so pause toggles exactly once per press.
    previous_held: HashSet<Key>,
}

impl GameSession {
    pub fn new(level: Level, config: HostConfig) -> Self {
        let engine = PhysicsEngine::new(config.physics, EventLog::default());
        let entity = engine.spawn(&level);
        log::info!(
            "Level '{}' ({}x{} tiles), spawn at ({:.0}, {:.0})",
            level.name,
            level.grid.width,
            level.grid.height,
            entity.x,
            entity.y
        );
        Self {
            level,
            engine,
            entity,
            input: InputState::new(),
            clock: SimulationClock::new(config.clock),
            particles: ParticlePool::new(config.max_particles),
            respawn_delay_ms: config.respawn_delay_ms,
            respawn_in_ms: None,
            deaths: 0,
            completed_ms: None,
            previous_held: HashSet::new(),
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
    }

    /// Feed one host frame. `held` is the full set of keys down this frame.
    pub fn frame(&mut self, now_ms: f64, held: &HashSet<Key>) -> FrameOutcome {
        let pressed = |key: Key| held.contains(&key) && !self.previous_held.contains(&key);
        let quit = pressed(Key::Escape);
        let toggle_pause = pressed(Key::P);
        let restart = pressed(Key::R);
        self.previous_held = held.clone();

        if quit {
            log::info!("Escape pressed, exiting.");
            return FrameOutcome::Quit;
        }
        if toggle_pause {
            if self.clock.is_paused() {
                self.clock.resume(now_ms);
                log::info!("Resumed");
            } else {
                self.clock.pause();
                log::info!("Paused");
            }
        }
        if restart {
            self.restart();
        }

        self.input.set_held(held);
        self.clock.begin_frame(now_ms);
        while self.clock.should_step() {
            let dt_ms = self.clock.fixed_interval_ms;
            self.fixed_step(dt_ms);
        }
        self.clock.end_frame();
        if self.clock.steps_this_frame > 0 {
            self.input.end_frame();
        }
        FrameOutcome::Running
    }

    /// Back to the spawn point with the level timer and completion cleared.
    /// The death counter survives.
    pub fn restart(&mut self) {
        let (x, y) = self.level.spawn_point();
        self.entity.reset(x, y);
        self.respawn_in_ms = None;
        self.completed_ms = None;
        self.particles.clear();
        log::info!("Restarted '{}'", self.level.name);
    }

    fn fixed_step(&mut self, dt_ms: f64) {
        match self.respawn_in_ms {
            Some(remaining) if remaining - dt_ms <= 0.0 => {
                self.respawn_in_ms = None;
                let (x, y) = self.level.spawn_point();
                self.entity.reset(x, y);
                log::debug!("Respawned at ({x:.0}, {y:.0})");
            }
            Some(remaining) => self.respawn_in_ms = Some(remaining - dt_ms),
            None => {
                self.engine.step(
                    &mut self.entity,
                    &self.level.grid,
                    self.input.snapshot(),
                    dt_ms,
                );
            }
        }

        for event in self.engine.sink_mut().drain() {
            match event {
                PhysicsEvent::Death(cause) => {
                    self.deaths += 1;
                    self.respawn_in_ms = Some(self.respawn_delay_ms);
                    log::info!("Death #{} ({cause:?})", self.deaths);
                }
                PhysicsEvent::Goal { elapsed_ms } => {
                    self.completed_ms = Some(elapsed_ms);
                    log::info!(
                        "Level '{}' complete in {:.2}s",
                        self.level.name,
                        elapsed_ms / 1000.0
                    );
                }
                PhysicsEvent::Particle(request) => self.particles.spawn(request),
            }
        }
        self.particles.update(dt_ms);
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn completed_ms(&self) -> Option<f64> {
        self.completed_ms
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_in_ms.is_some()
    }
}
