use frost_core::input::Key;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    /// Host frame duration fed to the simulation clock for each frame.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    /// Expected `Entity::state_digest` after the last frame.
    #[serde(default)]
    pub expect_digest: Option<String>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during this frame; anything not listed is released.
    #[serde(default)]
    pub keys: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One held-key set per host frame, with repeats unrolled.
    pub fn expanded_inputs(&self) -> Vec<HashSet<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let held: HashSet<Key> = frame.keys.iter().copied().collect();
            for _ in 0..frame.repeat.max(1) {
                out.push(held.clone());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frame_ms <= 0.0 {
        return Err("Replay validation failed: frame_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    if let Some(digest) = &replay.expect_digest {
        let is_hex = digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit());
        if !is_hex {
            return Err(format!(
                "Replay validation failed: expect_digest is not a SHA-256 hex string: {digest}"
            ));
        }
    }
    Ok(())
}

const fn default_frame_ms() -> f64 {
    1000.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhysicsConfig, REFERENCE_TICK_MS};
    use crate::engine::PhysicsEngine;
    use crate::entity::Entity;
    use crate::events::EventLog;
    use crate::tiles::{TileGrid, TileSet, DEFAULT_TILE_SIZE};
    use frost_core::input::InputState;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "frost_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn sample_grid() -> TileGrid {
        let mut rows = vec![vec![0; 24]; 6];
        rows.push((0..24).map(|x| if (6..14).contains(&x) { 7 } else { 1 }).collect());
        TileGrid::from_rows(&rows, DEFAULT_TILE_SIZE, TileSet::standard())
    }

    fn run(replay: &ReplaySequence, grid: &TileGrid) -> Entity {
        let mut engine = PhysicsEngine::new(PhysicsConfig::default(), EventLog::default());
        let mut entity = Entity::new(64.0, 6.0 * DEFAULT_TILE_SIZE - 32.0, engine.config());
        let mut input = InputState::new();
        for held in replay.expanded_inputs() {
            input.set_held(&held);
            engine.step(&mut entity, grid, input.snapshot(), REFERENCE_TICK_MS);
            input.end_frame();
        }
        entity
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "keys": ["right"], "repeat": 3 },
                { "keys": ["right", "space"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.frame_ms, 1000.0 / 60.0);
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert!(expanded[3].contains(&Key::Space));
        assert!(expanded[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_malformed_digest() {
        let path = temp_file_path("digest");
        fs::write(
            &path,
            r#"{ "expect_digest": "abc", "frames": [ { "keys": [] } ] }"#,
        )
        .expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("short digest should fail");
        assert!(err.contains("expect_digest"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "keys": ["right"], "repeat": 40 },
                { "keys": ["right", "up"], "repeat": 1 },
                { "keys": ["right"], "repeat": 60 },
                { "keys": ["a"], "repeat": 45 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let grid = sample_grid();
        let run_a = run(&replay, &grid);
        let run_b = run(&replay, &grid);

        assert_eq!(run_a.state_digest(), run_b.state_digest());
        assert_eq!(run_a, run_b);
        assert!(run_a.ticks > 0);

        let _ = fs::remove_file(path);
    }
}
