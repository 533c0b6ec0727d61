use frost_core::time::ClockConfig;
use frost_physics::config::{validate_config, PhysicsConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything the host can tune from one JSON file. Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub physics: PhysicsConfig,
    pub clock: ClockConfig,
    /// Simulated time between a death and the automatic restart.
    pub respawn_delay_ms: f64,
    pub max_particles: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            clock: ClockConfig::default(),
            respawn_delay_ms: 1000.0,
            max_particles: 512,
        }
    }
}

pub fn load_host_config_from_path(path: &Path) -> Result<HostConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: HostConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse host config {}: {e}", path.display()))?;
    validate_config(&config.physics)?;
    if config.clock.tick_rate_hz <= 0.0 {
        return Err("Config validation failed: clock.tick_rate_hz must be > 0".to_string());
    }
    if config.respawn_delay_ms < 0.0 {
        return Err("Config validation failed: respawn_delay_ms must be >= 0".to_string());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "frost_host_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn nested_sections_override_independently() {
        let path = temp_file_path("nested");
        fs::write(
            &path,
            r#"{ "physics": { "ice_friction": 0.95 }, "clock": { "max_updates_per_frame": 3 } }"#,
        )
        .expect("write temp file");

        let config = load_host_config_from_path(&path).expect("config should load");
        assert_eq!(config.physics.ice_friction, 0.95);
        assert_eq!(config.physics.gravity, 0.5);
        assert_eq!(config.clock.max_updates_per_frame, 3);
        assert_eq!(config.clock.tick_rate_hz, 60.0);
        assert_eq!(config.respawn_delay_ms, 1000.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let path = temp_file_path("tick_rate");
        fs::write(&path, r#"{ "clock": { "tick_rate_hz": 0 } }"#).expect("write temp file");

        let err = load_host_config_from_path(&path).expect_err("zero tick rate should fail");
        assert!(err.contains("tick_rate_hz"));
        let _ = fs::remove_file(path);
    }
}
