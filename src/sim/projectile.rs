//! Thrown grenades
//!
//! Ballistic flight under gravity. A grenade detonates when it comes down to the
//! ground height or when its fuse runs out, whichever happens first, and never
//! twice: `active` is cleared before the explosion is resolved.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::combat::explode;
use super::schedule::Deferred;
use super::state::{GameEvent, GameState};
use super::weapon::{WeaponCategory, WeaponKind};

/// A grenade in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub spawned_at: f64,
    /// Cleared on detonation; inactive projectiles are compacted away
    pub active: bool,
}

/// Launch a grenade from `origin` along `dir` and arm its fuse
pub fn throw_projectile(state: &mut GameState, origin: Vec3, dir: Vec3) -> u32 {
    let id = state.next_entity_id();
    let now = state.time;
    let vel = dir * state.tuning.grenade_throw_speed + Vec3::new(0.0, state.tuning.grenade_lift, 0.0);

    state.projectiles.push(Projectile {
        id,
        pos: origin,
        vel,
        spawned_at: now,
        active: true,
    });
    state
        .schedule
        .push(now + state.tuning.grenade_fuse, Deferred::FuseExpired(id));
    state.push_event(GameEvent::GrenadeThrown { projectile: id });
    id
}

/// Integrate every active grenade and detonate the ones that reached the ground
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let gravity = state.tuning.gravity;
    let ground = state.tuning.grenade_ground_height;
    let mut landed = Vec::new();

    for projectile in state.projectiles.iter_mut().filter(|p| p.active) {
        projectile.vel.y -= gravity * dt;
        projectile.pos += projectile.vel * dt;
        if projectile.vel.y < 0.0 && projectile.pos.y <= ground {
            landed.push(projectile.id);
        }
    }

    for id in landed {
        detonate(state, id);
    }
    compact(state);
}

/// Blow up an active grenade. Returns the number of agents hit, `None` if the
/// grenade was already gone.
pub fn detonate(state: &mut GameState, id: u32) -> Option<usize> {
    let projectile = state
        .projectiles
        .iter_mut()
        .find(|p| p.id == id && p.active)?;
    projectile.active = false;
    let center = projectile.pos;

    let stats = WeaponKind::Grenade.stats();
    let radius = match stats.category {
        WeaponCategory::Explosive { radius } => radius,
        _ => 0.0,
    };
    Some(explode(state, center, radius, stats.damage))
}

/// Fuse ran out. Detonates while the game is live, otherwise just disarms.
pub fn expire_fuse(state: &mut GameState, id: u32, live: bool) {
    if live {
        detonate(state, id);
    } else if let Some(projectile) = state.projectiles.iter_mut().find(|p| p.id == id) {
        projectile.active = false;
    }
    compact(state);
}

fn compact(state: &mut GameState) {
    state.projectiles.retain(|p| p.active);
}
