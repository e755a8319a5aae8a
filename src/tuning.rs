//! Data-driven game balance
//!
//! Everything a designer might want to tweak without touching the simulation
//! code. Loaded from JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Playfield
    pub playfield_width: f32,
    pub playfield_height: f32,

    // Session
    pub starting_lives: u32,
    /// Level 1 ball speed; also the base of the level speed curve
    pub base_ball_speed: f32,
    /// Clearing this level wins the game
    pub max_level: u32,
    /// Delay between passing `max_level` and the win screen
    pub win_delay_ms: f64,
    /// How long the level-clear celebration plays before the screen shows
    pub celebration_ms: f64,
    /// Switch between schedule and board data every level
    pub alternate_sources: bool,

    // Random events
    pub event_interval_ms: f64,
    pub event_chance_base: f64,
    pub event_chance_per_level: f64,
    pub event_chance_cap: f64,
    /// Chance an injected block carries a power-up
    pub power_up_chance: f64,
    pub notification_ms: u32,

    // Power-ups
    pub multi_ball_count: u32,
    pub explosion_radius: f32,
    pub chain_targets: usize,
    pub chain_stagger_ms: f64,
    pub chaos_duration_ms: f64,
    pub chaos_pulse_ms: f64,
    pub shrink_duration_ms: f64,
    pub shrink_radius_factor: f32,
    pub shrink_speed_factor: f32,
    pub extra_blocks: usize,

    // Input
    /// Pointer may stray this far outside the playfield before auto-pause
    pub auto_pause_margin: f32,

    // Blocks
    /// Frames a destroyed block lingers before removal
    pub removal_grace_frames: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,

            starting_lives: 3,
            base_ball_speed: BASE_BALL_SPEED,
            max_level: 10,
            win_delay_ms: 100.0,
            celebration_ms: 2000.0,
            alternate_sources: true,

            event_interval_ms: 10_000.0,
            event_chance_base: 0.3,
            event_chance_per_level: 0.2,
            event_chance_cap: 0.9,
            power_up_chance: 0.35,
            notification_ms: 4000,

            multi_ball_count: 2,
            explosion_radius: 100.0,
            chain_targets: 3,
            chain_stagger_ms: 120.0,
            chaos_duration_ms: 8000.0,
            chaos_pulse_ms: 1000.0,
            shrink_duration_ms: 10_000.0,
            shrink_radius_factor: 0.5,
            shrink_speed_factor: 0.7,
            extra_blocks: 3,

            auto_pause_margin: 50.0,

            removal_grace_frames: 50.0,
        }
    }
}

impl Tuning {
    /// Parse from JSON. Missing fields take their defaults; malformed JSON
    /// yields `None`.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(tuning) => Some(tuning),
            Err(e) => {
                log::warn!("Ignoring malformed tuning: {}", e);
                None
            }
        }
    }

    /// Probability of a random event on a given tick at `level`
    pub fn event_chance(&self, level: u32) -> f64 {
        let steps = level.saturating_sub(1) as f64;
        (self.event_chance_base + steps * self.event_chance_per_level)
            .min(self.event_chance_cap)
            .clamp(0.0, 1.0)
    }

    /// Ball speed for `level` given a base speed.
    ///
    /// Early levels ramp faster: the per-level increase is `0.7 + level/10`
    /// through level 3 and `0.4 + level/10` after.
    pub fn level_speed(base_speed: f32, level: u32) -> f32 {
        let level_f = level as f32;
        let increase = if level <= 3 {
            0.7 + level_f * 0.1
        } else {
            0.4 + level_f * 0.1
        };
        base_speed + (level_f - 1.0).max(0.0) * increase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"starting_lives": 5}"#);
        let tuning = tuning.unwrap_or_default();
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.max_level, 10);
        assert_eq!(tuning.explosion_radius, 100.0);
    }

    #[test]
    fn test_malformed_json() {
        assert!(Tuning::from_json("{not json").is_none());
    }

    #[test]
    fn test_event_chance_ramps_and_caps() {
        let tuning = Tuning::default();
        assert!((tuning.event_chance(1) - 0.3).abs() < 1e-9);
        assert!((tuning.event_chance(2) - 0.5).abs() < 1e-9);
        assert!((tuning.event_chance(4) - 0.9).abs() < 1e-9);
        assert!((tuning.event_chance(9) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_level_speed_curve() {
        assert_eq!(Tuning::level_speed(8.0, 1), 8.0);
        // Level 2: 8 + 1 * 0.9
        assert!((Tuning::level_speed(8.0, 2) - 8.9).abs() < 1e-5);
        // Level 3: 8 + 2 * 1.0
        assert!((Tuning::level_speed(8.0, 3) - 10.0).abs() < 1e-5);
        // Level 4: 8 + 3 * 0.8
        assert!((Tuning::level_speed(8.0, 4) - 10.4).abs() < 1e-5);
        // Level 10: 8 + 9 * 1.4
        assert!((Tuning::level_speed(8.0, 10) - 20.6).abs() < 1e-4);
    }
}
