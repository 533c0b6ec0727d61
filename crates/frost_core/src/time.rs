//! Fixed-timestep simulation clock.
//!
//! The host hands in wall-clock timestamps (milliseconds, e.g. from an
//! animation-frame callback); the clock turns them into a whole number of
//! fixed-interval simulation steps:
//!
//!   1. `begin_frame(now)` -- measure the delta since the last frame, feed the accumulator
//!   2. `while should_step()` -- consume fixed-interval slices, at most
//!      `max_updates_per_frame` of them
//!   3. `end_frame()` -- if the cap was hit, drop whatever backlog remains
//!
//! Dropping the backlog trades determinism under extreme lag for never entering a
//! catch-up spiral. Timestamps are plain `f64` values so the clock stays pure
//! arithmetic and can be driven by synthetic time in tests and replays.

use serde::Deserialize;

const FRAME_SAMPLE_COUNT: usize = 60;

pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;
pub const DEFAULT_MAX_UPDATES_PER_FRAME: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub tick_rate_hz: f64,
    pub max_updates_per_frame: u32,
}

impl ClockConfig {
    pub fn fixed_interval_ms(&self) -> f64 {
        1000.0 / self.tick_rate_hz
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            max_updates_per_frame: DEFAULT_MAX_UPDATES_PER_FRAME,
        }
    }
}

pub struct SimulationClock {
    pub fixed_interval_ms: f64,
    pub max_updates_per_frame: u32,
    accumulator_ms: f64,
    last_update_ms: Option<f64>,
    paused: bool,
    pub total_time_ms: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub dropped_backlog_count: u64,
    pub real_dt_ms: f64,

    frame_samples: [f64; FRAME_SAMPLE_COUNT],
    frame_sample_index: usize,
    pub smoothed_frame_time_ms: f64,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        let fixed_interval_ms = config.fixed_interval_ms();
        Self {
            fixed_interval_ms,
            max_updates_per_frame: config.max_updates_per_frame.max(1),
            accumulator_ms: 0.0,
            last_update_ms: None,
            paused: false,
            total_time_ms: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            dropped_backlog_count: 0,
            real_dt_ms: 0.0,
            frame_samples: [fixed_interval_ms; FRAME_SAMPLE_COUNT],
            frame_sample_index: 0,
            smoothed_frame_time_ms: fixed_interval_ms,
        }
    }

    /// Anchor the clock at `now_ms` with an empty accumulator.
    pub fn start(&mut self, now_ms: f64) {
        self.last_update_ms = Some(now_ms);
        self.accumulator_ms = 0.0;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The time spent paused is discarded rather than
    /// replayed as a catch-up burst.
    pub fn resume(&mut self, now_ms: f64) {
        self.start(now_ms);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }

    pub fn begin_frame(&mut self, now_ms: f64) {
        self.steps_this_frame = 0;
        if self.paused {
            self.real_dt_ms = 0.0;
            return;
        }

        let last = self.last_update_ms.unwrap_or(now_ms);
        self.real_dt_ms = (now_ms - last).max(0.0);
        self.last_update_ms = Some(now_ms);

        self.accumulator_ms += self.real_dt_ms;
        self.frame_count += 1;

        self.frame_samples[self.frame_sample_index] = self.real_dt_ms;
        self.frame_sample_index = (self.frame_sample_index + 1) % FRAME_SAMPLE_COUNT;
        self.smoothed_frame_time_ms =
            self.frame_samples.iter().sum::<f64>() / FRAME_SAMPLE_COUNT as f64;
    }

    pub fn should_step(&mut self) -> bool {
        if self.paused || self.steps_this_frame >= self.max_updates_per_frame {
            return false;
        }
        if self.accumulator_ms >= self.fixed_interval_ms {
            self.accumulator_ms -= self.fixed_interval_ms;
            self.total_time_ms += self.fixed_interval_ms;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        // Spiral-of-death guard: a capped frame never carries its backlog forward.
        if self.steps_this_frame >= self.max_updates_per_frame {
            if self.accumulator_ms >= self.fixed_interval_ms {
                self.dropped_backlog_count += 1;
                log::warn!(
                    "Frame needed more than {} updates -- dropping {:.1}ms of backlog",
                    self.max_updates_per_frame,
                    self.accumulator_ms
                );
            }
            self.accumulator_ms = 0.0;
        }
    }

    /// Run one host frame: every due fixed step calls `update` with the fixed
    /// interval in milliseconds. Returns the number of steps taken.
    pub fn tick(&mut self, now_ms: f64, mut update: impl FnMut(f64)) -> u32 {
        self.begin_frame(now_ms);
        while self.should_step() {
            update(self.fixed_interval_ms);
        }
        self.end_frame();
        self.steps_this_frame
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: f64 = 1000.0 / 60.0;

    fn started_clock() -> SimulationClock {
        let mut clock = SimulationClock::default();
        clock.start(0.0);
        clock
    }

    #[test]
    fn default_interval_is_sixty_hertz() {
        let clock = SimulationClock::default();
        assert!((clock.fixed_interval_ms - INTERVAL).abs() < 1e-9);
        assert_eq!(clock.max_updates_per_frame, 5);
    }

    #[test]
    fn one_interval_runs_one_update() {
        let mut clock = started_clock();
        let mut calls = Vec::new();
        let steps = clock.tick(INTERVAL, |dt| calls.push(dt));
        assert_eq!(steps, 1);
        assert_eq!(calls.len(), 1);
        assert!((calls[0] - INTERVAL).abs() < 1e-9);
    }

    #[test]
    fn partial_interval_accumulates_until_due() {
        let mut clock = started_clock();
        assert_eq!(clock.tick(10.0, |_| {}), 0);
        assert!((clock.accumulator_ms() - 10.0).abs() < 1e-9);
        assert_eq!(clock.tick(20.0, |_| {}), 1);
        assert!((clock.accumulator_ms() - (20.0 - INTERVAL)).abs() < 1e-9);
    }

    #[test]
    fn huge_delta_is_capped_and_backlog_dropped() {
        let mut clock = started_clock();
        let mut calls = 0;
        let steps = clock.tick(INTERVAL * 1000.0, |_| calls += 1);
        assert_eq!(steps, 5);
        assert_eq!(calls, 5);
        assert_eq!(clock.accumulator_ms(), 0.0);
        assert_eq!(clock.dropped_backlog_count, 1);

        // Nothing is carried into the next frame.
        let next = clock.tick(INTERVAL * 1000.0 + 1.0, |_| calls += 1);
        assert_eq!(next, 0);
        assert_eq!(calls, 5);
    }

    #[test]
    fn every_update_receives_identical_interval() {
        let mut clock = started_clock();
        let mut seen = Vec::new();
        clock.tick(INTERVAL * 3.5, |dt| seen.push(dt));
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|dt| *dt == seen[0]));
    }

    #[test]
    fn paused_clock_runs_nothing_and_resume_discards_pause_time() {
        let mut clock = started_clock();
        clock.tick(INTERVAL, |_| {});
        clock.pause();
        assert_eq!(clock.tick(INTERVAL * 50.0, |_| {}), 0);
        assert!(clock.is_paused());

        clock.resume(10_000.0);
        assert_eq!(clock.accumulator_ms(), 0.0);
        assert_eq!(clock.tick(10_020.0, |_| {}), 1);
    }

    #[test]
    fn first_frame_without_start_anchors_instead_of_bursting() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.tick(123_456.0, |_| {}), 0);
        assert_eq!(clock.tick(123_476.0, |_| {}), 1);
    }

    #[test]
    fn backwards_timestamp_is_treated_as_zero_delta() {
        let mut clock = started_clock();
        clock.tick(100.0, |_| {});
        let before = clock.accumulator_ms();
        clock.tick(50.0, |_| {});
        assert_eq!(clock.real_dt_ms, 0.0);
        assert_eq!(clock.accumulator_ms(), before);
    }

    #[test]
    fn step_counters_track_total_time() {
        let mut clock = started_clock();
        for frame in 1..=10 {
            clock.tick(frame as f64 * 17.0, |_| {});
        }
        assert_eq!(clock.fixed_step_count, 10);
        assert!((clock.total_time_ms - 10.0 * INTERVAL).abs() < 1e-6);
    }

    #[test]
    fn config_overrides_tick_rate_and_cap() {
        let config: ClockConfig =
            serde_json::from_str(r#"{"tick_rate_hz": 120.0, "max_updates_per_frame": 2}"#)
                .expect("clock config should parse");
        let mut clock = SimulationClock::new(config);
        clock.start(0.0);
        assert!((clock.fixed_interval_ms - 1000.0 / 120.0).abs() < 1e-9);
        assert_eq!(clock.tick(1000.0, |_| {}), 2);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ClockConfig =
            serde_json::from_str(r#"{"max_updates_per_frame": 3}"#).expect("partial config");
        assert_eq!(config.tick_rate_hz, DEFAULT_TICK_RATE_HZ);
        assert_eq!(config.max_updates_per_frame, 3);
    }
}
