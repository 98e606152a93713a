//! Hostile agents: pursuit/attack state machine and sub-part hit boxes
//!
//! Agents chase the player on the ground plane. Within attack range they stop and
//! strike on a cooldown. Death is immediate; the body stays in the world for the
//! removal delay so the renderer can play the fall.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{Body, agent_step};
use super::geometry::Aabb;
use super::state::{GameEvent, GameState};
use crate::planar_distance;

/// Behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Pursuing,
    Attacking,
    /// Dead, waiting for removal
    Dying,
}

/// Named hit-box sub-parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::LeftArm,
        BodyPart::RightArm,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
    ];

    /// Rest-pose box in agent-local space (feet at origin, +Z toward the target)
    pub fn local_bounds(self) -> Aabb {
        let (center, size) = match self {
            BodyPart::Head => (Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.55, 0.65, 0.5)),
            BodyPart::Torso => (Vec3::new(0.0, 0.7, 0.0), Vec3::new(0.7, 1.0, 0.4)),
            BodyPart::LeftArm => (Vec3::new(-0.45, 0.8, 0.3), Vec3::new(0.18, 0.85, 0.18)),
            BodyPart::RightArm => (Vec3::new(0.45, 0.8, 0.3), Vec3::new(0.18, 0.85, 0.18)),
            BodyPart::LeftLeg => (Vec3::new(-0.2, 0.0, 0.0), Vec3::new(0.2, 0.7, 0.2)),
            BodyPart::RightLeg => (Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.2, 0.7, 0.2)),
        };
        Aabb::from_center_size(center, size)
    }
}

/// Nearest part a ray enters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartHit {
    pub part: BodyPart,
    /// Distance along the ray (world units for a unit direction)
    pub distance: f32,
}

/// A hostile agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    /// Feet position
    pub pos: Vec3,
    /// Yaw toward the player, `atan2(dx, dz)`
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub state: AgentState,
    /// Pursuit speed (u/s)
    pub speed: f32,
    /// Time of the last attack, also drives the lunge pose
    pub last_attack: Option<f64>,
    /// Walk-cycle phase offset in [0, 2π)
    pub anim_offset: f32,
    pub died_at: Option<f64>,
}

impl Agent {
    pub fn new(id: u32, pos: Vec3, health: f32, speed: f32, anim_offset: f32) -> Self {
        Self {
            id,
            pos,
            facing: 0.0,
            health,
            max_health: health,
            alive: true,
            state: AgentState::Pursuing,
            speed,
            last_attack: None,
            anim_offset,
            died_at: None,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.facing)
    }

    /// Nearest body part hit by a ray, if any
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<PartHit> {
        let inverse = self.rotation().inverse();
        let local_origin = inverse * (origin - self.pos);
        let local_dir = inverse * dir;

        BodyPart::ALL
            .iter()
            .filter_map(|&part| {
                part.local_bounds()
                    .ray_hit(local_origin, local_dir)
                    .map(|distance| PartHit { part, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Subtract damage, clamped at zero. Returns true if this hit was lethal.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }
}

/// Advance every living agent one tick, then resolve their attacks on the player
pub fn update_agents(state: &mut GameState, dt: f32) {
    let now = state.time;
    let target = state.player.pos;
    let tuning = &state.tuning;
    let world = &state.world;
    let mut attackers = Vec::new();

    for agent in state.agents.iter_mut().filter(|a| a.alive) {
        let dx = target.x - agent.pos.x;
        let dz = target.z - agent.pos.z;
        agent.facing = dx.atan2(dz);
        let distance = planar_distance(agent.pos, target);

        if distance < tuning.attack_range {
            agent.state = AgentState::Attacking;
            let ready = agent
                .last_attack
                .is_none_or(|t| now - t > tuning.attack_cooldown);
            if ready {
                agent.last_attack = Some(now);
                attackers.push(agent.id);
            }
        } else {
            agent.state = AgentState::Pursuing;
            let dir = Vec3::new(dx / distance, 0.0, dz / distance);
            let step = agent.speed * dt;
            let jitter = ((now * 3.0) as f32 + agent.anim_offset).sin() * tuning.agent_wobble * dt;
            agent.pos = agent_step(world, Body::AGENT, agent.pos, dir, step, jitter).pos;
        }
    }

    let damage = state.tuning.attack_damage;
    for agent in attackers {
        if !state.player.is_alive() {
            break;
        }
        let health = state.player.take_damage(damage);
        state.push_event(GameEvent::AgentAttack { agent });
        state.push_event(GameEvent::PlayerHurt { damage, health });
        state.shake(0.3);

        if health <= 0.0 {
            state.enter_game_over();
        }
    }
}

/// Drop a dead agent from the active set once its removal delay has passed
pub fn remove_agent(state: &mut GameState, id: u32) {
    let before = state.agents.len();
    state.agents.retain(|a| a.id != id);
    if state.agents.len() != before {
        state.push_event(GameEvent::AgentRemoved { agent: id });
    }
}
