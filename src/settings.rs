//! Simulation tuning
//!
//! Every timing, speed and count the core reads lives in `SimConfig`. Values
//! are loaded from JSON; missing fields fall back to the defaults below, so a
//! config file only needs the values it overrides.

use std::fs;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable simulation parameters (durations in ms, speeds in px/ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Spawn points ===
    /// Player start positions, indexed by player number
    pub player_starts: Vec<IVec2>,
    /// Enemy spawn positions, used round-robin
    pub enemy_starts: Vec<IVec2>,

    // === Round flow ===
    /// Level intro banner duration
    pub level_start_time: u32,
    /// Delay between the last kill and the round finishing
    pub level_end_time: u32,
    /// Enemies to destroy per round
    pub enemy_start_count: u32,
    /// Minimum gap between enemy spawns
    pub enemy_ready_time: u32,
    /// Concurrent enemies allowed on the map
    pub enemy_max_on_map: usize,
    /// Game over banner scroll speed
    pub game_over_entry_speed: f32,
    /// Number of levels before the index wraps back to 1
    pub level_count: u32,

    // === Units ===
    pub tank_default_speed: f32,
    pub projectile_default_speed: f32,
    /// Lives a new player starts with
    pub player_lives: u32,
    /// Minimum gap between player shots
    pub player_reload_time: u32,
    /// How long a unit keeps sliding after leaving input on ice
    pub slip_time: u32,
    /// Minimum ice overlap (px on both axes) to start slipping
    pub ice_overlap_min: i32,
    /// Manhattan distance within which homing enemies prefer a player
    pub homing_cutoff: f32,

    // === Effects ===
    pub shield_time: u32,
    pub frozen_time: u32,
    pub fortify_time: u32,
    pub bonus_show_time: u32,
    pub bonus_blink_time: u32,

    // === Scoring ===
    pub pickup_score: u32,
    /// Awarded per enemy removed by an area-clear power-up
    pub area_clear_score: u32,

    /// Ticks with a larger delta are dropped as stalls
    pub max_tick_ms: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_starts: vec![IVec2::new(128, 384), IVec2::new(256, 384), IVec2::new(256, 320)],
            enemy_starts: vec![IVec2::new(1, 1), IVec2::new(192, 1), IVec2::new(384, 1)],

            level_start_time: 2000,
            level_end_time: 5000,
            enemy_start_count: 20,
            enemy_ready_time: 500,
            enemy_max_on_map: 4,
            game_over_entry_speed: 0.13,
            level_count: 35,

            tank_default_speed: 0.08,
            projectile_default_speed: 0.23,
            player_lives: 3,
            player_reload_time: 120,
            slip_time: 380,
            ice_overlap_min: 10,
            homing_cutoff: 832.0,

            shield_time: 10000,
            frozen_time: 8000,
            fortify_time: 15000,
            bonus_show_time: 10000,
            bonus_blink_time: 350,

            pickup_score: 300,
            area_clear_score: 200,

            max_tick_ms: 40,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded sim config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Sim config saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "slip_time": 500, "enemy_max_on_map": 6 }"#).unwrap();
        assert_eq!(config.slip_time, 500);
        assert_eq!(config.enemy_max_on_map, 6);
        assert_eq!(config.shield_time, SimConfig::default().shield_time);
        assert_eq!(config.player_starts.len(), 3);
    }

    #[test]
    fn test_start_points_parse_as_pairs() {
        let config = SimConfig::from_json(r#"{ "enemy_starts": [[0, 0], [32, 0]] }"#).unwrap();
        assert_eq!(config.enemy_starts, vec![IVec2::new(0, 0), IVec2::new(32, 0)]);
    }

    #[test]
    fn test_malformed_json_is_format_error() {
        let err = SimConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::ConfigFormat(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SimConfig::load("/definitely/not/here/sim.json").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("tank_arena_cfg_{}.json", std::process::id()));
        let mut config = SimConfig::default();
        config.frozen_time = 1234;
        config.save(&path).unwrap();
        let loaded = SimConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
