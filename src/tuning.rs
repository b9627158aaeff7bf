//! Data-driven game balance
//!
//! Every gameplay number lives here so a host can override it from JSON
//! without rebuilding. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Balance values for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    // === Orbs ===
    /// Energy granted by one orb
    pub orb_value: u32,
    /// Orb diameter (pixels)
    pub orb_size: f32,
    /// Orbs may not appear closer than this to any base center
    pub min_orb_distance_from_base: f32,
    /// Keep random spawns this far from the arena edges
    pub spawn_padding: f32,
    /// Placement retries before a random spawn gives up
    pub spawn_attempts: u32,
    /// Period of the automatic orb spawner (ms)
    pub orb_spawn_interval_ms: f32,

    // === UFOs ===
    pub ufo_radius: f32,
    /// Movement per input tick before the keyboard multiplier
    pub ufo_speed: f32,
    /// Random offset (per axis) when a UFO appears near its base
    pub spawn_jitter: f32,

    // === Bases ===
    /// Base diameter (pixels)
    pub base_size: f32,

    // === Combat ===
    pub shoot_cost: u32,
    pub shoot_cooldown_ms: f32,
    /// Pixels per reference frame
    pub projectile_speed: f32,
    pub projectile_ttl_ms: f32,
    /// Orbs dropped where a UFO is destroyed
    pub loot_orbs: u32,
    /// Max distance of a loot orb from the wreck (per axis)
    pub loot_scatter: f32,

    // === Economy ===
    pub starting_energy: u32,
    pub respawn_cost: u32,
    pub respawn_delay_ms: f32,
    pub winning_score: u32,

    // === Classic ruleset ===
    /// Stored energy needed per level (level N needs N x threshold)
    pub level_threshold: u32,
    /// Base diameter gained per level
    pub base_growth_per_level: f32,

    // === Input ===
    /// Keyboard / pad displacement is `ufo.speed * multiplier` per tick
    pub keyboard_speed_multiplier: f32,
    /// Fixed movement tick (ms), ~60 Hz
    pub movement_tick_ms: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            orb_value: 10,
            orb_size: 30.0,
            min_orb_distance_from_base: 150.0,
            spawn_padding: 50.0,
            spawn_attempts: 10,
            orb_spawn_interval_ms: 3000.0,

            ufo_radius: 40.0,
            ufo_speed: 5.0,
            spawn_jitter: 25.0,

            base_size: 100.0,

            shoot_cost: 20,
            shoot_cooldown_ms: 500.0,
            projectile_speed: 10.0,
            projectile_ttl_ms: 1500.0,
            loot_orbs: 3,
            loot_scatter: 40.0,

            starting_energy: 200,
            respawn_cost: 100,
            respawn_delay_ms: 1500.0,
            winning_score: 500,

            level_threshold: 100,
            base_growth_per_level: 20.0,

            keyboard_speed_multiplier: 5.0,
            movement_tick_ms: 16.0,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse overrides, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Loaded game config overrides");
                config
            }
            Err(e) => {
                log::warn!("Invalid game config ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Base diameter at a given classic-ruleset level (level 1 = base size)
    pub fn base_size_at_level(&self, level: u32) -> f32 {
        self.base_size + level.saturating_sub(1) as f32 * self.base_growth_per_level
    }
}
