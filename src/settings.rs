//! Match configuration supplied by the host
//!
//! The host sends difficulty and arena setup before a match and may push
//! wave/health overrides later. Values outside the supported range are
//! clamped rather than rejected.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty bounds
pub const MIN_DIFFICULTY: f32 = 1.0;
pub const MAX_DIFFICULTY: f32 = 10.0;

/// Smallest arena edge the simulation accepts
const MIN_ARENA_EDGE: f32 = 200.0;
/// Upper bound for enemy population knobs
const MAX_POPULATION_SETTING: u32 = 50;

/// Match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Difficulty scalar (1-10)
    pub difficulty: f32,
    /// Seed for the match RNG
    pub seed: u64,
    /// Visible play area
    pub arena_width: f32,
    pub arena_height: f32,
    /// Enemies created when the match starts
    pub initial_enemies: u32,
    /// Population floor kept alive by the director (0 disables)
    pub min_enemies: u32,
    /// Chance a projectile kill drops a pickup
    pub powerup_drop_chance: f32,
    /// Wave the match starts on
    pub starting_wave: u32,
    /// Obelisk health at start
    pub starting_health: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: 1.0,
            seed: 0x0BE1_15C0,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            initial_enemies: 10,
            min_enemies: 8,
            powerup_drop_chance: 0.05,
            starting_wave: 1,
            starting_health: OBELISK_MAX_HEALTH,
        }
    }
}

impl Settings {
    /// Settings with a given difficulty (clamped)
    pub fn with_difficulty(difficulty: f32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
        .clamped()
    }

    /// Parse host JSON; missing fields take defaults, all values are clamped
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Return a copy with every field inside its supported range
    pub fn clamped(mut self) -> Self {
        self.difficulty = clamp_difficulty(self.difficulty);
        self.arena_width = finite_or(self.arena_width, ARENA_WIDTH).max(MIN_ARENA_EDGE);
        self.arena_height = finite_or(self.arena_height, ARENA_HEIGHT).max(MIN_ARENA_EDGE);
        self.initial_enemies = self.initial_enemies.min(MAX_POPULATION_SETTING);
        self.min_enemies = self.min_enemies.min(MAX_POPULATION_SETTING);
        self.powerup_drop_chance = finite_or(self.powerup_drop_chance, 0.0).clamp(0.0, 1.0);
        self.starting_wave = self.starting_wave.max(1);
        self.starting_health =
            finite_or(self.starting_health, OBELISK_MAX_HEALTH).clamp(1.0, OBELISK_MAX_HEALTH);
        self
    }
}

/// Clamp a difficulty scalar into [1, 10]; NaN maps to the minimum
pub fn clamp_difficulty(difficulty: f32) -> f32 {
    finite_or(difficulty, MIN_DIFFICULTY).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Mid-match overrides pushed by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostOverrides {
    pub wave: Option<u32>,
    pub obelisk_health: Option<f32>,
}

impl HostOverrides {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_clamped() {
        assert_eq!(Settings::with_difficulty(0.0).difficulty, 1.0);
        assert_eq!(Settings::with_difficulty(42.0).difficulty, 10.0);
        assert_eq!(Settings::with_difficulty(f32::NAN).difficulty, 1.0);
        assert_eq!(Settings::with_difficulty(4.5).difficulty, 4.5);
    }

    #[test]
    fn test_from_json_defaults_and_clamps() {
        let settings =
            Settings::from_json(r#"{"difficulty": 15, "startingHealth": 250, "startingWave": 0}"#)
                .unwrap();
        assert_eq!(settings.difficulty, 10.0);
        assert_eq!(settings.starting_health, 100.0);
        assert_eq!(settings.starting_wave, 1);
        assert_eq!(settings.arena_width, ARENA_WIDTH);
        assert_eq!(settings.min_enemies, 8);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Settings::from_json("{not json").is_err());
    }

    #[test]
    fn test_overrides_parse() {
        let overrides = HostOverrides::from_json(r#"{"wave": 4, "obeliskHealth": 80}"#).unwrap();
        assert_eq!(overrides.wave, Some(4));
        assert_eq!(overrides.obelisk_health, Some(80.0));

        let empty = HostOverrides::from_json("{}").unwrap();
        assert_eq!(empty, HostOverrides::default());
    }
}
