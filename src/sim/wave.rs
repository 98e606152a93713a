//! Wave director: spawn scheduling, clear detection and progression

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::schedule::Deferred;
use super::state::{GameEvent, GamePhase, GameState, Modal};
use crate::error::Rejection;

/// Progress through the current wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Spawn events still pending
    Spawning,
    /// Everything spawned, agents remain
    Active,
    /// All agents gone; waiting for the player to start the next wave
    WaveClear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// 1-based wave number
    pub number: u32,
    /// Agents this wave spawns in total
    pub target: u32,
    pub spawned: u32,
    pub phase: WavePhase,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            number: 1,
            target: 0,
            spawned: 0,
            phase: WavePhase::Spawning,
        }
    }
}

impl WaveState {
    pub fn waiting_for_next(&self) -> bool {
        self.phase == WavePhase::WaveClear
    }
}

/// Leave the title screen and start wave 1
pub fn start_game(state: &mut GameState) {
    if state.phase != GamePhase::Title {
        return;
    }
    log::info!("Game started (seed {})", state.seed);
    state.set_phase(GamePhase::Playing);
    start_wave(state);
}

/// Begin the current wave: reset counters and stagger its spawns
pub fn start_wave(state: &mut GameState) {
    let number = state.wave.number;
    let target = state.tuning.wave_target(number);
    state.wave.target = target;
    state.wave.spawned = 0;
    state.wave.phase = WavePhase::Spawning;

    let stagger = state.tuning.spawn_stagger;
    for i in 0..target {
        let due = state.time + f64::from(i) * stagger;
        state.schedule.push(due, Deferred::SpawnAgent { wave: number });
    }

    log::info!("Wave {number} started: {target} agents");
    state.push_event(GameEvent::WaveStarted {
        wave: number,
        target,
    });
}

/// Handle one staggered spawn. Spawns for a wave that is no longer current are dropped.
pub fn spawn_scheduled_agent(state: &mut GameState, wave: u32) {
    if wave != state.wave.number || state.wave.spawned >= state.wave.target {
        log::debug!("Dropping stale spawn for wave {wave}");
        return;
    }

    let pos = random_edge_position(state);
    let tuning = &state.tuning;
    let (health, base_speed) = (tuning.agent_health, tuning.agent_speed);
    let (jitter_min, jitter_max) = (tuning.agent_speed_jitter_min, tuning.agent_speed_jitter_max);

    let rng = state.rng();
    let speed = base_speed * (jitter_min + rng.random::<f32>() * (jitter_max - jitter_min));
    let anim_offset = rng.random::<f32>() * std::f32::consts::TAU;

    let id = state.next_entity_id();
    state.agents.push(Agent::new(id, pos, health, speed, anim_offset));
    state.wave.spawned += 1;
    if state.wave.spawned == state.wave.target {
        state.wave.phase = WavePhase::Active;
    }

    log::debug!(
        "Spawned agent {id} at {pos} ({}/{})",
        state.wave.spawned,
        state.wave.target
    );
    state.push_event(GameEvent::AgentSpawned { agent: id, pos });
}

/// A point on a random map edge
fn random_edge_position(state: &mut GameState) -> Vec3 {
    let edge = state.tuning.spawn_edge;
    let spread = state.tuning.spawn_spread;
    let rng = state.rng();
    let side = rng.random_range(0..4u8);
    let along = (rng.random::<f32>() - 0.5) * spread;
    match side {
        0 => Vec3::new(along, 0.0, -edge),
        1 => Vec3::new(along, 0.0, edge),
        2 => Vec3::new(-edge, 0.0, along),
        _ => Vec3::new(edge, 0.0, along),
    }
}

/// Mark the wave clear once everything spawned is gone; pays the wave reward once
pub fn check_wave_complete(state: &mut GameState) -> bool {
    let wave = &state.wave;
    let complete = state.agents.is_empty()
        && wave.spawned == wave.target
        && wave.target > 0
        && wave.phase != WavePhase::WaveClear;
    if !complete {
        return false;
    }

    state.wave.phase = WavePhase::WaveClear;
    let number = state.wave.number;
    let reward = state.tuning.wave_reward;
    state.economy.earn(reward);
    log::info!("Wave {number} cleared (+{reward})");
    state.push_event(GameEvent::WaveCleared {
        wave: number,
        reward,
    });
    state.toast(format!("Wave {number} cleared! +{reward}"));
    true
}

/// Advance to the next wave; only valid once the current one is clear
pub fn start_next_wave(state: &mut GameState) -> Result<(), Rejection> {
    match state.phase {
        GamePhase::Title => return Err(Rejection::NotStarted),
        GamePhase::GameOver => return Err(Rejection::GameOver),
        GamePhase::Paused => return Err(Rejection::Paused),
        GamePhase::Playing => {}
    }
    if !state.wave.waiting_for_next() {
        return Err(Rejection::WaveInProgress);
    }
    state.set_modal(Modal::None);
    state.wave.number += 1;
    start_wave(state);
    Ok(())
}

/// Fresh run from wave 1. The balance and owned weapons carry over.
pub fn restart(state: &mut GameState) {
    log::info!("Restarting");
    let max_health = state.tuning.player_max_health;
    state.player.reset(max_health);
    state.cancel_reload();
    state.armory.reset();
    state.economy.reset_session();
    state.kills = 0;
    state.agents.clear();
    state.projectiles.clear();
    state.schedule.clear();
    state.wave = WaveState::default();
    state.set_modal(Modal::None);
    state.set_phase(GamePhase::Playing);
    start_wave(state);
}
