pub mod collision;
pub mod config;
pub mod engine;
pub mod entity;
pub mod events;
pub mod level;
pub mod particles;
pub mod replay;
pub mod surface;
pub mod tiles;

pub use config::{PhysicsConfig, REFERENCE_TICK_MS};
pub use engine::{PhysicsEngine, StepReport, Terminal};
pub use entity::{Entity, Liveness};
pub use events::{DeathCause, EventLog, EventSink, PhysicsEvent};
pub use particles::{ParticleKind, ParticleRequest};
pub use tiles::{TileGrid, TileRole, TileSet, TileType};
