pub mod config;
pub mod particles;
pub mod session;

pub use config::HostConfig;
pub use session::{FrameOutcome, GameSession};
