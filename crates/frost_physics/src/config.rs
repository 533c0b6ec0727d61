//! Tunable physics constants.
//!
//! Every number the engine uses lives here so a level pack can override any
//! subset from JSON (`#[serde(default)]` fills the rest). Velocities are in
//! pixels per reference tick; `step` scales them by `dt / REFERENCE_TICK_MS`.

use serde::Deserialize;

/// Duration of one reference tick (60 Hz). Velocities and per-tick constants are
/// expressed against this interval.
pub const REFERENCE_TICK_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub player_width: f32,
    pub player_height: f32,

    pub gravity: f32,
    /// Optional terminal velocity. Free fall is uncapped by default.
    pub max_fall_speed: Option<f32>,
    pub jump_force: f32,
    pub move_speed: f32,
    pub default_friction: f32,
    pub bounce_multiplier: f32,
    pub bounce_horizontal_boost: f32,

    pub ice_friction: f32,
    pub ice_max_speed: f32,
    pub ice_acceleration_multiplier: f32,
    /// Extra steering force while any ice memory is active.
    pub ice_control_assist: f32,
    pub ice_boost_multiplier: f32,
    pub ice_boost_min_speed: f32,
    /// Ticks on ice before the sliding bonus starts.
    pub ice_slide_delay: f32,
    /// Ticks on ice until the sliding bonus reaches full strength.
    pub ice_slide_ramp: f32,
    pub ice_slide_bonus: f32,
    /// Ticks the residual ice effect lasts after leaving ice airborne.
    pub ice_jump_duration: f32,
    pub ice_inertia_bleed: f32,

    pub horizontal_jump_factor: f32,
    pub ice_horizontal_jump_factor: f32,
    pub angled_jump_threshold: f32,
    pub angled_jump_fast_speed: f32,
    pub angled_jump_flatten: f32,
    pub angled_jump_air_push: f32,
    pub angled_jump_push_window: f32,

    /// Entities whose top edge passes this line die. `None` uses the grid's
    /// pixel height.
    pub kill_plane_y: Option<f32>,
    pub particle_seed: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_width: 24.0,
            player_height: 32.0,

            gravity: 0.5,
            max_fall_speed: None,
            jump_force: -12.0,
            move_speed: 10.2,
            default_friction: 0.8,
            bounce_multiplier: 1.5,
            bounce_horizontal_boost: 1.2,

            ice_friction: 0.9,
            ice_max_speed: 8.0,
            ice_acceleration_multiplier: 1.1,
            ice_control_assist: 1.5,
            ice_boost_multiplier: 1.6,
            ice_boost_min_speed: 2.0,
            ice_slide_delay: 5.0,
            ice_slide_ramp: 20.0,
            ice_slide_bonus: 0.15,
            ice_jump_duration: 45.0,
            ice_inertia_bleed: 0.03,

            horizontal_jump_factor: 0.3,
            ice_horizontal_jump_factor: 0.2,
            angled_jump_threshold: 3.0,
            angled_jump_fast_speed: 8.0,
            angled_jump_flatten: 0.85,
            angled_jump_air_push: 0.1,
            angled_jump_push_window: 8.0,

            kill_plane_y: None,
            particle_seed: 0x5eed_1ce,
        }
    }
}

pub fn validate_config(config: &PhysicsConfig) -> Result<(), String> {
    if config.player_width <= 0.0 || config.player_height <= 0.0 {
        return Err("Config validation failed: player size must be > 0".to_string());
    }
    if config.ice_jump_duration <= 0.0 {
        return Err("Config validation failed: ice_jump_duration must be > 0".to_string());
    }
    if let Some(cap) = config.max_fall_speed {
        if cap <= 0.0 {
            return Err(format!(
                "Config validation failed: max_fall_speed must be > 0 when set, got {cap}"
            ));
        }
    }
    for (name, value) in [
        ("default_friction", config.default_friction),
        ("ice_friction", config.ice_friction),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            return Err(format!(
                "Config validation failed: {name} must be within (0, 1], got {value}"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PhysicsConfig {
        serde_json::from_str(json).expect("physics config json")
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config = parse(r#"{ "gravity": 0.25, "ice_jump_duration": 30 }"#);
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.gravity, 0.25);
        assert_eq!(config.ice_jump_duration, 30.0);
        assert_eq!(config.move_speed, PhysicsConfig::default().move_speed);
        assert_eq!(config.kill_plane_y, None);
        assert_eq!(config.max_fall_speed, None);
    }

    #[test]
    fn friction_outside_unit_range_is_rejected() {
        let err = validate_config(&parse(r#"{ "ice_friction": 1.4 }"#))
            .expect_err("friction > 1 should fail");
        assert!(err.contains("ice_friction"));

        let err = validate_config(&parse(r#"{ "default_friction": 0.0 }"#))
            .expect_err("zero friction should fail");
        assert!(err.contains("default_friction"));

        assert!(validate_config(&parse(r#"{ "ice_friction": 1.0 }"#)).is_ok());
    }

    #[test]
    fn fall_cap_is_optional_but_positive_when_set() {
        assert!(validate_config(&parse(r#"{ "max_fall_speed": 20 }"#)).is_ok());
        let err = validate_config(&parse(r#"{ "max_fall_speed": 0 }"#))
            .expect_err("zero cap should fail");
        assert!(err.contains("max_fall_speed"));
    }
}
