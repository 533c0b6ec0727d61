//! Discrete outputs of a physics step.

use crate::particles::ParticleRequest;
use crate::tiles::GridCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Overlapped a deadly tile.
    Hazard { cell: GridCell },
    /// Dropped below the kill plane.
    FellOut,
}

/// Receives engine events. Injected at engine construction; the host decides
/// what a death or a goal means for lives, score and level flow.
pub trait EventSink {
    fn on_death(&mut self, cause: DeathCause);
    fn on_goal(&mut self, elapsed_ms: f64);
    fn on_particle(&mut self, request: ParticleRequest);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsEvent {
    Death(DeathCause),
    Goal { elapsed_ms: f64 },
    Particle(ParticleRequest),
}

/// Sink that records everything in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<PhysicsEvent>,
}

impl EventLog {
    pub fn deaths(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, PhysicsEvent::Death(_)))
            .count()
    }

    pub fn goals(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, PhysicsEvent::Goal { .. }))
            .count()
    }

    pub fn particles(&self) -> impl Iterator<Item = &ParticleRequest> {
        self.events.iter().filter_map(|event| match event {
            PhysicsEvent::Particle(request) => Some(request),
            _ => None,
        })
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, PhysicsEvent> {
        self.events.drain(..)
    }
}

impl EventSink for EventLog {
    fn on_death(&mut self, cause: DeathCause) {
        self.events.push(PhysicsEvent::Death(cause));
    }

    fn on_goal(&mut self, elapsed_ms: f64) {
        self.events.push(PhysicsEvent::Goal { elapsed_ms });
    }

    fn on_particle(&mut self, request: ParticleRequest) {
        self.events.push(PhysicsEvent::Particle(request));
    }
}
