//! Player controller: movement intent, gravity, jumping and look
//!
//! Position is the feet; the camera sits `PLAYER_HEIGHT` above them.

use std::ops::{BitOr, BitOrAssign};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{Body, resolve_body};
use super::state::GameState;
use crate::consts::{MAP_BOUND, MAX_PITCH, PLAYER_HEIGHT};
use crate::settings::Settings;
use crate::{look_direction, yaw_forward, yaw_right};

/// Held movement keys as a bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent(u8);

impl MoveIntent {
    pub const NONE: MoveIntent = MoveIntent(0);
    pub const FORWARD: MoveIntent = MoveIntent(1);
    pub const BACK: MoveIntent = MoveIntent(1 << 1);
    pub const LEFT: MoveIntent = MoveIntent(1 << 2);
    pub const RIGHT: MoveIntent = MoveIntent(1 << 3);

    /// Build from raw key bits; unknown bits are dropped
    pub const fn from_bits(bits: u8) -> Self {
        MoveIntent(bits & 0b1111)
    }

    #[inline]
    pub fn contains(self, other: MoveIntent) -> bool {
        self.0 & other.0 == other.0
    }

    /// Normalized planar direction for a yaw, zero if opposing keys cancel out
    pub fn wish_dir(self, yaw: f32) -> Vec3 {
        let mut forward = 0.0;
        let mut strafe = 0.0;
        if self.contains(Self::FORWARD) {
            forward += 1.0;
        }
        if self.contains(Self::BACK) {
            forward -= 1.0;
        }
        if self.contains(Self::RIGHT) {
            strafe += 1.0;
        }
        if self.contains(Self::LEFT) {
            strafe -= 1.0;
        }
        (yaw_forward(yaw) * forward + yaw_right(yaw) * strafe).normalize_or_zero()
    }
}

impl BitOr for MoveIntent {
    type Output = MoveIntent;

    fn bitor(self, rhs: MoveIntent) -> MoveIntent {
        MoveIntent(self.0 | rhs.0)
    }
}

impl BitOrAssign for MoveIntent {
    fn bitor_assign(&mut self, rhs: MoveIntent) {
        self.0 |= rhs.0;
    }
}

/// The player-controlled camera body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Feet position
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub vel: Vec3,
    pub on_ground: bool,
    pub health: f32,
    pub max_health: f32,
    /// Aim-down-sights held (presentation only)
    pub aiming: bool,
}

impl Player {
    pub fn new(max_health: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            vel: Vec3::ZERO,
            on_ground: true,
            health: max_health,
            max_health,
            aiming: false,
        }
    }

    /// Back to the spawn point at full health
    pub fn reset(&mut self, max_health: f32) {
        *self = Self::new(max_health);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn eye_position(&self) -> Vec3 {
        self.pos + Vec3::new(0.0, PLAYER_HEIGHT, 0.0)
    }

    pub fn look_direction(&self) -> Vec3 {
        look_direction(self.yaw, self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        yaw_right(self.yaw)
    }

    /// Apply damage, clamped at zero; returns remaining health
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health = (self.health - amount).max(0.0);
        self.health
    }

    /// Heal up to max; returns the amount actually recovered
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }
}

/// Turn the view by a mouse delta (pixels)
pub fn apply_look(player: &mut Player, delta: Vec2, settings: &Settings) {
    let dy = if settings.invert_y { -delta.y } else { delta.y };
    player.yaw -= delta.x * settings.mouse_sensitivity;
    player.pitch = (player.pitch - dy * settings.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
}

/// Advance the player one tick
pub fn update_player(state: &mut GameState, intent: MoveIntent, jump: bool, dt: f32) {
    let tuning = &state.tuning;
    let speed = tuning.move_speed * state.economy.speed_multiplier;
    let player = &mut state.player;

    if !player.on_ground {
        player.vel.y -= tuning.gravity * dt;
    }

    let wish = intent.wish_dir(player.yaw);
    if wish != Vec3::ZERO {
        player.vel.x = wish.x * speed;
        player.vel.z = wish.z * speed;
    } else {
        player.vel.x *= tuning.move_damping;
        player.vel.z *= tuning.move_damping;
    }

    if jump && player.on_ground {
        player.vel.y = tuning.jump_velocity;
        player.on_ground = false;
    }

    let prev = player.pos;
    let proposed = prev + player.vel * dt;
    let resolution = resolve_body(&state.world, Body::PLAYER, prev, proposed, player.vel.y);

    if resolution.blocked.y {
        player.vel.y = 0.0;
    }
    player.pos = resolution.pos;
    player.pos.x = player.pos.x.clamp(-MAP_BOUND, MAP_BOUND);
    player.pos.z = player.pos.z.clamp(-MAP_BOUND, MAP_BOUND);
    player.on_ground = resolution.grounded;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::geometry::{Material, Obstacle};

    fn run(state: &mut GameState, intent: MoveIntent, jump: bool, ticks: usize) {
        for _ in 0..ticks {
            update_player(state, intent, jump, SIM_DT);
        }
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let straight = MoveIntent::FORWARD.wish_dir(0.0);
        let diagonal = (MoveIntent::FORWARD | MoveIntent::RIGHT).wish_dir(0.0);
        assert!((straight.length() - 1.0).abs() < 1e-6);
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert_eq!((MoveIntent::LEFT | MoveIntent::RIGHT).wish_dir(1.0), Vec3::ZERO);
    }

    #[test]
    fn test_walks_forward_at_move_speed() {
        let (mut state, _) = GameState::for_test(0);
        run(&mut state, MoveIntent::FORWARD, false, 60);
        // One second at 6 u/s down -Z
        assert!((state.player.pos.z + 6.0).abs() < 1e-3);
        assert_eq!(state.player.pos.y, 0.0);
        assert!(state.player.on_ground);
    }

    #[test]
    fn test_speed_multiplier_scales_movement() {
        let (mut state, _) = GameState::for_test(0);
        state.economy.speed_multiplier = 1.5;
        run(&mut state, MoveIntent::RIGHT, false, 60);
        assert!((state.player.pos.x - 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_damping_without_intent() {
        let (mut state, _) = GameState::for_test(0);
        state.player.vel.x = 6.0;
        update_player(&mut state, MoveIntent::NONE, false, SIM_DT);
        assert!((state.player.vel.x - 5.1).abs() < 1e-5);
    }

    #[test]
    fn test_jump_lands_back_on_ground() {
        let (mut state, _) = GameState::for_test(0);
        update_player(&mut state, MoveIntent::NONE, true, SIM_DT);
        assert!(!state.player.on_ground);
        assert!(state.player.pos.y > 0.0);

        // Holding jump in the air does nothing
        run(&mut state, MoveIntent::NONE, true, 20);
        let mut peak = state.player.pos.y;
        for _ in 0..60 {
            update_player(&mut state, MoveIntent::NONE, false, SIM_DT);
            peak = peak.max(state.player.pos.y);
        }
        assert!(peak < 2.5);
        assert!(state.player.on_ground);
        assert_eq!(state.player.pos.y, 0.0);
        assert_eq!(state.player.vel.y, 0.0);
    }

    #[test]
    fn test_crate_blocks_walking() {
        let (mut state, _) = GameState::for_test(0);
        state.world.push(Obstacle::new(
            Vec3::new(0.0, 1.0, -3.0),
            Vec3::new(3.0, 2.0, 1.0),
            Material::Crate,
        ));
        run(&mut state, MoveIntent::FORWARD, false, 120);
        // Front face at z = -2.5, body radius 0.5
        assert!(state.player.pos.z >= -2.0 - 1e-4);
        assert!(state.player.pos.z < -1.8);
    }

    #[test]
    fn test_map_bound_clamps() {
        let (mut state, _) = GameState::for_test(0);
        state.player.pos.x = 28.95;
        run(&mut state, MoveIntent::RIGHT, false, 30);
        assert_eq!(state.player.pos.x, MAP_BOUND);
    }

    #[test]
    fn test_look_clamps_pitch_and_inverts() {
        let mut player = Player::new(100.0);
        let mut settings = Settings::default();
        apply_look(&mut player, Vec2::new(0.0, -10_000.0), &settings);
        assert_eq!(player.pitch, MAX_PITCH);

        settings.invert_y = true;
        apply_look(&mut player, Vec2::new(100.0, -10_000.0), &settings);
        assert_eq!(player.pitch, -MAX_PITCH);
        assert!((player.yaw + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_heal_reports_actual_amount() {
        let mut player = Player::new(100.0);
        player.take_damage(30.0);
        assert_eq!(player.heal(50.0), 30.0);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.take_damage(250.0), 0.0);
    }
}
