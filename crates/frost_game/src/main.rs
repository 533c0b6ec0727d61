//! Frost runner: headless host for the platformer physics.
//!
//! Loads a level and a replay, then feeds the replay's held keys to a
//! `GameSession` one host frame at a time. The session runs the
//! fixed-timestep loop:
//!
//!   1. `begin_frame()` -- feed the frame delta into the accumulator
//!   2. `while should_step()` -- one physics step per fixed slice
//!   3. `end_frame()` -- drop any backlog past the per-frame cap
//!
//! Usage: `frost_game [LEVEL_JSON] [REPLAY_JSON] [HOST_CONFIG_JSON]`
//!
//! If the replay names an `expect_digest`, the final entity state must hash to
//! it or the run fails.

use std::path::PathBuf;

use frost_game::config::{load_host_config_from_path, HostConfig};
use frost_game::session::{FrameOutcome, GameSession};
use frost_physics::level::load_level_from_path;
use frost_physics::replay::load_replay_from_path;

const LEVEL_PATH: &str = "assets/levels/ice_intro.json";
const REPLAY_PATH: &str = "assets/replays/ice_intro.json";

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let level_path = PathBuf::from(args.next().unwrap_or_else(|| LEVEL_PATH.to_string()));
    let replay_path = PathBuf::from(args.next().unwrap_or_else(|| REPLAY_PATH.to_string()));
    let config = match args.next() {
        Some(path) => load_host_config_from_path(&PathBuf::from(path))?,
        None => HostConfig::default(),
    };

    log::info!("Frost runner starting...");
    let level = load_level_from_path(&level_path)?;
    let replay = load_replay_from_path(&replay_path)?;
    let inputs = replay.expanded_inputs();
    log::info!(
        "Replay {}: {} frames at {:.3}ms",
        replay_path.display(),
        inputs.len(),
        replay.frame_ms
    );

    let mut session = GameSession::new(level, config);
    let mut now_ms = 0.0;
    session.start(now_ms);
    for held in &inputs {
        now_ms += replay.frame_ms;
        if session.frame(now_ms, held) == FrameOutcome::Quit {
            break;
        }
    }

    let entity = session.entity();
    let clock = session.clock();
    let digest = entity.state_digest();
    log::info!(
        "Ran {} fixed steps over {} frames ({} backlog drops)",
        clock.fixed_step_count,
        clock.frame_count,
        clock.dropped_backlog_count
    );
    log::info!(
        "Final entity: pos=({:.2}, {:.2}) vel=({:.3}, {:.3}) {:?} surface={:?}",
        entity.x,
        entity.y,
        entity.vel_x,
        entity.vel_y,
        entity.liveness,
        entity.surface
    );
    log::info!(
        "Deaths: {}, particles live: {} (dropped {})",
        session.deaths(),
        session.particles().len(),
        session.particles().dropped
    );
    match session.completed_ms() {
        Some(ms) => log::info!("Level complete in {:.2}s", ms / 1000.0),
        None => log::info!("Level not completed"),
    }
    log::info!("State digest: {digest}");

    if let Some(expected) = &replay.expect_digest {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(format!(
                "Replay digest mismatch: expected {expected}, got {digest}"
            ));
        }
        log::info!("Replay digest matches.");
    }
    Ok(())
}
