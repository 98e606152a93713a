//! Combat resolution: firing, reloading, explosions and agent death
//!
//! Every entry point checks its preconditions first and returns a `Rejection`
//! without touching any counter when one fails.

use glam::Vec3;
use serde::Serialize;

use super::agent::{Agent, AgentState, BodyPart, PartHit};
use super::projectile::throw_projectile;
use super::schedule::Deferred;
use super::state::{GameEvent, GamePhase, GameState, Modal};
use super::weapon::{Reload, WeaponCategory, WeaponKind, WeaponStats};
use crate::consts::TRACER_LENGTH;
use crate::error::Rejection;

/// Damage dealt by a hitscan shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShotHit {
    pub agent: u32,
    pub part: BodyPart,
    pub damage: f32,
    pub killed: bool,
}

/// What an accepted trigger pull did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FireOutcome {
    Shot { hit: Option<ShotHit> },
    Slash { agent: Option<u32> },
    Thrown { projectile: u32 },
}

/// Gameplay actions need a running, unpaused game with no overlay open
fn phase_gate(state: &GameState) -> Result<(), Rejection> {
    match state.phase {
        GamePhase::GameOver => Err(Rejection::GameOver),
        GamePhase::Title => Err(Rejection::NotStarted),
        GamePhase::Paused => Err(Rejection::Paused),
        GamePhase::Playing if state.modal != Modal::None => Err(Rejection::Paused),
        GamePhase::Playing => Ok(()),
    }
}

/// Pull the trigger of the active weapon
pub fn fire(state: &mut GameState) -> Result<FireOutcome, Rejection> {
    if state.armory.is_reloading() {
        return Err(Rejection::Reloading);
    }
    phase_gate(state)?;

    let now = state.time;
    let weapon = state.armory.active_weapon();
    let kind = weapon.kind;
    let stats = weapon.stats();
    if weapon.current_ammo == 0 {
        return Err(Rejection::OutOfAmmo);
    }
    if weapon.cooldown_remaining(now) > 0.0 {
        return Err(Rejection::Cooldown);
    }

    let weapon = state.armory.get_mut(kind);
    weapon.last_fired = Some(now);
    if stats.consumes_ammo() {
        weapon.current_ammo -= 1;
    }

    let outcome = match stats.category {
        WeaponCategory::Hitscan => FireOutcome::Shot {
            hit: fire_hitscan(state, stats),
        },
        WeaponCategory::Melee { range } => FireOutcome::Slash {
            agent: swing(state, stats, range),
        },
        WeaponCategory::Explosive { .. } => {
            let origin = state.player.eye_position();
            let dir = state.player.look_direction();
            FireOutcome::Thrown {
                projectile: throw_projectile(state, origin, dir),
            }
        }
    };
    Ok(outcome)
}

/// Nearest living agent hit by a ray, with the part it entered
pub fn raycast_agents(agents: &[Agent], origin: Vec3, dir: Vec3) -> Option<(u32, PartHit)> {
    agents
        .iter()
        .filter(|a| a.alive)
        .filter_map(|a| a.ray_hit(origin, dir).map(|hit| (a.id, hit)))
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
}

fn fire_hitscan(state: &mut GameState, stats: &WeaponStats) -> Option<ShotHit> {
    let origin = state.player.eye_position();
    let dir = state.player.look_direction();
    let target = raycast_agents(&state.agents, origin, dir);

    let reach = target.map_or(TRACER_LENGTH, |(_, hit)| hit.distance);
    state.push_event(GameEvent::Tracer {
        from: origin,
        to: origin + dir * reach,
    });
    state.shake(0.05);

    let (agent, hit) = target?;
    let headshot = hit.part == BodyPart::Head;
    let damage = stats.damage_for(headshot);
    let killed = damage_agent(state, agent, damage);
    state.push_event(GameEvent::HitFlash { agent });
    state.damage_number(origin + dir * hit.distance, damage, headshot);

    Some(ShotHit {
        agent,
        part: hit.part,
        damage,
        killed,
    })
}

fn swing(state: &mut GameState, stats: &WeaponStats, range: f32) -> Option<u32> {
    state.shake(0.1);
    let reach_from = state.player.pos;
    let (agent, pos) = state
        .agents
        .iter()
        .find(|a| a.alive && a.pos.distance(reach_from) <= range)
        .map(|a| (a.id, a.pos))?;

    damage_agent(state, agent, stats.damage);
    state.push_event(GameEvent::HitFlash { agent });
    state.damage_number(pos, stats.damage, false);
    Some(agent)
}

/// Start reloading the active weapon
pub fn reload(state: &mut GameState) -> Result<(), Rejection> {
    if state.armory.is_reloading() {
        return Err(Rejection::Reloading);
    }
    phase_gate(state)?;

    let weapon = state.armory.active_weapon();
    if weapon.magazine_deficit() == 0 {
        return Err(Rejection::MagazineFull);
    }
    if weapon.reserve_ammo == 0 {
        return Err(Rejection::NoReserveAmmo);
    }

    let kind = weapon.kind;
    let until = state.time + weapon.stats().reload_duration;
    state.armory.reloading = Some(Reload { weapon: kind, until });
    state.schedule.push(until, Deferred::ReloadComplete(kind));
    state.push_event(GameEvent::ReloadStateChanged {
        weapon: kind,
        reloading: true,
    });
    log::debug!("Reloading {:?} until {until:.2}", kind);
    Ok(())
}

/// Finish the reload of `kind` if it is the one in progress
pub fn complete_reload(state: &mut GameState, kind: WeaponKind) {
    match state.armory.reloading {
        Some(reload) if reload.weapon == kind => {}
        _ => return,
    }
    state.armory.reloading = None;
    let moved = state.armory.get_mut(kind).refill_magazine();
    state.push_event(GameEvent::ReloadStateChanged {
        weapon: kind,
        reloading: false,
    });
    log::debug!("Reloaded {moved} rounds into {:?}", kind);
}

/// Area damage with no line-of-sight check; returns the number of agents hit
pub fn explode(state: &mut GameState, center: Vec3, radius: f32, damage: f32) -> usize {
    let targets: Vec<(u32, Vec3)> = state
        .agents
        .iter()
        .filter(|a| a.alive && a.pos.distance(center) <= radius)
        .map(|a| (a.id, a.pos))
        .collect();

    for &(agent, pos) in &targets {
        damage_agent(state, agent, damage);
        state.push_event(GameEvent::HitFlash { agent });
        state.damage_number(pos, damage, false);
    }

    state.push_event(GameEvent::Explosion { center, radius });
    state.shake(0.5);
    log::debug!("Explosion at {center} hit {} agents", targets.len());
    targets.len()
}

/// Apply damage to an agent; returns true if it died from this hit
pub fn damage_agent(state: &mut GameState, id: u32, damage: f32) -> bool {
    let Some(agent) = state.agent_mut(id) else {
        return false;
    };
    let lethal = agent.apply_damage(damage);
    if lethal {
        kill_agent(state, id);
    }
    lethal
}

/// Flip an agent to dying, schedule its removal and pay the kill reward
pub fn kill_agent(state: &mut GameState, id: u32) {
    let now = state.time;
    let Some(agent) = state.agent_mut(id) else {
        return;
    };
    if agent.died_at.is_some() {
        return;
    }
    agent.alive = false;
    agent.state = AgentState::Dying;
    agent.died_at = Some(now);

    let removal = now + state.tuning.death_removal_delay;
    state.schedule.push(removal, Deferred::RemoveAgent(id));

    state.kills += 1;
    let reward = state.tuning.kill_reward;
    state.economy.earn(reward);
    state.push_event(GameEvent::AgentKilled { agent: id, reward });
    log::debug!("Agent {id} killed ({} total)", state.kills);
}

/// Switch to the weapon on hotkey `slot` (1..=8). Unknown slots are ignored.
pub fn select_slot(state: &mut GameState, slot: u8) -> Result<(), Rejection> {
    phase_gate(state)?;
    let Some(kind) = WeaponKind::from_slot(slot) else {
        return Ok(());
    };
    if !state.economy.owns(kind) {
        return Err(Rejection::WeaponNotOwned);
    }
    if state.armory.active != kind {
        state.armory.active = kind;
        state.push_event(GameEvent::WeaponSwitched(kind));
    }
    Ok(())
}
