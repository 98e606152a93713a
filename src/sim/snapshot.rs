//! Plain-data frame for the render sink
//!
//! Captured after a tick. Holds everything a renderer or UI needs to draw the
//! frame without touching `GameState`: camera, posed agent parts, grenades and HUD
//! values. Animation here is presentation only and never feeds back into the sim.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_8};

use glam::{Quat, Vec3};
use serde::Serialize;

use super::agent::{Agent, AgentState, BodyPart};
use super::state::{GamePhase, GameState, Modal};
use super::wave::WavePhase;
use super::weapon::WeaponKind;

/// Seconds the death fall takes
const FALL_DURATION: f32 = 0.25;
/// How far the body sinks while falling
const FALL_DROP: f32 = 0.8;
const LUNGE_DURATION: f32 = 0.2;
const LUNGE_DISTANCE: f32 = 0.2;
const WALK_BOB: f32 = 0.08;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub aiming: bool,
    /// Vertical field of view (narrower while aiming)
    pub fov_degrees: f32,
}

/// World transform of one hit-box part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartPose {
    pub part: BodyPart,
    pub center: Vec3,
    pub rotation: Quat,
    pub size: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPose {
    pub id: u32,
    pub root: Vec3,
    pub rotation: Quat,
    pub state: AgentState,
    /// Remaining health in [0, 1]
    pub health_fraction: f32,
    pub parts: Vec<PartPose>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectilePose {
    pub id: u32,
    pub pos: Vec3,
    /// Tumble while in flight
    pub spin: Quat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub modal: Modal,
    pub health: f32,
    pub max_health: f32,
    pub weapon: WeaponKind,
    pub weapon_name: &'static str,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub reloading: bool,
    pub balance: u64,
    pub wave: u32,
    pub wave_phase: WavePhase,
    /// Agents still alive in the world
    pub agents_remaining: usize,
    pub kills: u32,
    pub speed_multiplier: f32,
    pub owned: Vec<WeaponKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub time: f64,
    pub camera: CameraPose,
    pub agents: Vec<AgentPose>,
    pub projectiles: Vec<ProjectilePose>,
    pub hud: Hud,
}

impl RenderFrame {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let weapon = state.armory.active_weapon();
        let now = state.time;

        Self {
            time: now,
            camera: CameraPose {
                eye: player.eye_position(),
                yaw: player.yaw,
                pitch: player.pitch,
                aiming: player.aiming,
                fov_degrees: if player.aiming { 50.0 } else { 75.0 },
            },
            agents: state.agents.iter().map(|a| pose_agent(a, now)).collect(),
            projectiles: state
                .projectiles
                .iter()
                .filter(|p| p.active)
                .map(|p| {
                    let age = (now - p.spawned_at) as f32;
                    ProjectilePose {
                        id: p.id,
                        pos: p.pos,
                        spin: Quat::from_rotation_x(age * 6.0) * Quat::from_rotation_y(age * 6.0),
                    }
                })
                .collect(),
            hud: Hud {
                phase: state.phase,
                modal: state.modal,
                health: player.health,
                max_health: player.max_health,
                weapon: weapon.kind,
                weapon_name: weapon.stats().name,
                current_ammo: weapon.current_ammo,
                reserve_ammo: weapon.reserve_ammo,
                reloading: state.armory.is_reloading(),
                balance: state.economy.balance(),
                wave: state.wave.number,
                wave_phase: state.wave.phase,
                agents_remaining: state.alive_agents(),
                kills: state.kills,
                speed_multiplier: state.economy.speed_multiplier,
                owned: state.economy.owned().collect(),
            },
        }
    }
}

fn pose_agent(agent: &Agent, now: f64) -> AgentPose {
    let facing = Quat::from_rotation_y(agent.facing);
    let mut lift = 0.0;
    let mut tilt = Quat::IDENTITY;
    let mut head_turn = Quat::IDENTITY;
    let mut forward = 0.0;

    match agent.state {
        AgentState::Pursuing => {
            let cycle = now as f32 * 4.0 + agent.anim_offset;
            lift = (cycle.sin() * WALK_BOB).abs();
            tilt = Quat::from_rotation_x((cycle * 0.7).sin() * 0.05)
                * Quat::from_rotation_z((cycle * 0.5).sin() * 0.1);
            head_turn = Quat::from_rotation_y((cycle * 0.8).sin() * 0.15)
                * Quat::from_rotation_z((cycle * 0.6).sin() * 0.1);
        }
        AgentState::Attacking => {
            if let Some(at) = agent.last_attack {
                let since = (now - at) as f32;
                if since < LUNGE_DURATION {
                    forward = LUNGE_DISTANCE;
                }
            }
        }
        AgentState::Dying => {
            let since = agent.died_at.map_or(0.0, |t| (now - t) as f32);
            let progress = (since / FALL_DURATION).clamp(0.0, 1.0);
            lift = -FALL_DROP * progress;
            tilt = Quat::from_rotation_x(FRAC_PI_2 * progress);
        }
    }

    let rotation = facing * tilt;
    let root = agent.pos + facing * Vec3::new(0.0, lift, forward);

    let parts = BodyPart::ALL
        .iter()
        .map(|&part| {
            let bounds = part.local_bounds();
            let local_rotation = match part {
                BodyPart::Head => head_turn * Quat::from_rotation_x(-0.1),
                BodyPart::LeftArm => {
                    Quat::from_rotation_x(-FRAC_PI_3) * Quat::from_rotation_z(FRAC_PI_8)
                }
                BodyPart::RightArm => {
                    Quat::from_rotation_x(-FRAC_PI_3) * Quat::from_rotation_z(-FRAC_PI_8)
                }
                _ => Quat::IDENTITY,
            };
            PartPose {
                part,
                center: root + rotation * bounds.center(),
                rotation: rotation * local_rotation,
                size: bounds.size(),
            }
        })
        .collect();

    AgentPose {
        id: agent.id,
        root,
        rotation,
        state: agent.state,
        health_fraction: if agent.max_health > 0.0 {
            agent.health / agent.max_health
        } else {
            0.0
        },
        parts,
    }
}
