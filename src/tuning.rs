//! Data-driven game balance
//!
//! Every number that is a design choice rather than a geometric fact lives here so a
//! JSON file can override it. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Game balance values (units are world units and seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Downward acceleration (u/s²)
    pub gravity: f32,
    /// Upward velocity applied by a jump (u/s)
    pub jump_velocity: f32,
    /// Base horizontal speed (u/s)
    pub move_speed: f32,
    /// Per-tick horizontal velocity factor with no movement intent
    pub move_damping: f32,
    pub player_max_health: f32,

    // === Agents ===
    pub agent_health: f32,
    /// Base pursuit speed (u/s), scaled per agent by a random factor
    pub agent_speed: f32,
    pub agent_speed_jitter_min: f32,
    pub agent_speed_jitter_max: f32,
    /// Amplitude of the sideways stagger (u/s)
    pub agent_wobble: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    /// Seconds between two attacks of the same agent
    pub attack_cooldown: f64,
    /// Seconds a dead agent stays in the world for its fall animation
    pub death_removal_delay: f64,

    // === Waves ===
    /// Wave N spawns N * agents_per_wave agents
    pub agents_per_wave: u32,
    /// Seconds between two spawns of the same wave
    pub spawn_stagger: f64,
    /// Agents spawn this far from the center along one map edge
    pub spawn_edge: f32,
    /// Width of the strip along the edge used for spawns
    pub spawn_spread: f32,

    // === Economy ===
    pub wave_reward: u64,
    pub kill_reward: u64,
    pub health_potion_price: u64,
    pub health_potion_heal: f32,
    pub speed_potion_price: u64,
    pub speed_potion_step: f32,
    pub speed_multiplier_cap: f32,

    // === Grenades ===
    pub grenade_throw_speed: f32,
    /// Extra upward velocity added to a throw (u/s)
    pub grenade_lift: f32,
    /// A descending grenade detonates at or below this height
    pub grenade_ground_height: f32,
    /// Seconds before a grenade detonates on its own
    pub grenade_fuse: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 54.0,
            jump_velocity: 15.0,
            move_speed: 6.0,
            move_damping: 0.85,
            player_max_health: 100.0,

            agent_health: 100.0,
            agent_speed: 1.8,
            agent_speed_jitter_min: 0.8,
            agent_speed_jitter_max: 1.2,
            agent_wobble: 1.2,
            attack_range: 2.0,
            attack_damage: 10.0,
            attack_cooldown: 1.0,
            death_removal_delay: 2.25,

            agents_per_wave: 1,
            spawn_stagger: 0.5,
            spawn_edge: 28.0,
            spawn_spread: 50.0,

            wave_reward: 500,
            kill_reward: 100,
            health_potion_price: 500,
            health_potion_heal: 50.0,
            speed_potion_price: 1000,
            speed_potion_step: 0.1,
            speed_multiplier_cap: 2.0,

            grenade_throw_speed: 18.0,
            grenade_lift: 6.0,
            grenade_ground_height: 0.5,
            grenade_fuse: 3.0,
        }
    }
}

impl Tuning {
    /// Number of agents wave `wave` (1-based) spawns
    pub fn wave_target(&self, wave: u32) -> u32 {
        wave.saturating_mul(self.agents_per_wave)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}
