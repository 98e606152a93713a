//! Deadblock - first-person zombie wave survival in a block world
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (movement, collision, agents, combat, waves, economy)
//! - `persistence`: Currency storage behind a small trait
//! - `platform`: Native/web logging setup
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, PersistenceError, Rejection};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playable area is clamped to [-MAP_BOUND, MAP_BOUND] on x and z
    pub const MAP_BOUND: f32 = 29.0;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 0.5;
    pub const PLAYER_HEIGHT: f32 = 1.8;

    /// Agent body
    pub const AGENT_RADIUS: f32 = 0.5;
    pub const AGENT_HEIGHT: f32 = 2.0;

    /// Tallest ledge a body walks onto without jumping
    pub const STEP_HEIGHT: f32 = 0.3;
    /// Tolerance used to tell floor/ceiling slabs from walls
    pub const SLAB_TOLERANCE: f32 = 0.1;
    /// Floor contact window: feet may sink this far below a top and still snap up
    pub const FLOOR_SNAP_DEPTH: f32 = 0.5;
    /// Gap left between the head and a ceiling after a bump
    pub const CEILING_GAP: f32 = 0.01;

    /// Pitch limit (straight up / straight down)
    pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2;

    /// Length of the tracer drawn when a shot hits nothing
    pub const TRACER_LENGTH: f32 = 100.0;
}

/// Horizontal forward vector for a yaw angle (yaw 0 looks down -Z)
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right vector for a yaw angle
#[inline]
pub fn yaw_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Unit view direction from yaw and pitch
#[inline]
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_p, cos_p) = pitch.sin_cos();
    Vec3::new(-yaw.sin() * cos_p, sin_p, -yaw.cos() * cos_p)
}

/// Distance on the XZ plane
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_right_are_perpendicular() {
        for yaw in [0.0, 0.7, -2.1, 3.0] {
            let f = yaw_forward(yaw);
            let r = yaw_right(yaw);
            assert!(f.dot(r).abs() < 1e-5);
            assert!((f.length() - 1.0).abs() < 1e-5);
        }
        // Yaw 0: forward is -Z, right is +X
        assert!((yaw_forward(0.0) - Vec3::NEG_Z).length() < 1e-6);
        assert!((yaw_right(0.0) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_look_direction_pitch() {
        let up = look_direction(0.0, consts::MAX_PITCH);
        assert!((up - Vec3::Y).length() < 1e-5);
        let level = look_direction(1.0, 0.0);
        assert!((level - yaw_forward(1.0)).length() < 1e-6);
    }

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -5.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-6);
    }
}
