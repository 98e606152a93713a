//! Collision resolution against the block world
//!
//! Bodies are upright boxes (`radius` half-width, `height` tall, origin at the feet).
//! Resolution is axis-separated: vertical first against the previous footprint, then
//! X and Z independently. Bodies that start inside geometry are not pushed out.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Obstacle, WorldGeometry};
use crate::consts::{
    AGENT_HEIGHT, AGENT_RADIUS, CEILING_GAP, FLOOR_SNAP_DEPTH, PLAYER_HEIGHT, PLAYER_RADIUS,
    SLAB_TOLERANCE, STEP_HEIGHT,
};

/// Half-extents of a moving body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub radius: f32,
    pub height: f32,
}

impl Body {
    pub const PLAYER: Body = Body {
        radius: PLAYER_RADIUS,
        height: PLAYER_HEIGHT,
    };

    pub const AGENT: Body = Body {
        radius: AGENT_RADIUS,
        height: AGENT_HEIGHT,
    };
}

/// Which axes were stopped by geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

/// Result of resolving one move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Corrected feet position
    pub pos: Vec3,
    pub blocked: BlockedAxes,
    /// Feet rest on a surface
    pub grounded: bool,
}

/// A solid counts as a wall for a body spanning `feet..head` if it rises above the
/// feet and starts below the head (floor and ceiling slabs excluded)
#[inline]
pub fn is_vertical_wall(obstacle: &Obstacle, feet: f32, head: f32) -> bool {
    obstacle.top() > feet + SLAB_TOLERANCE && obstacle.bottom() < head - SLAB_TOLERANCE
}

/// Resolve a move from `prev` to `proposed` (feet positions).
///
/// `vertical_velocity` selects floor (<= 0) or ceiling (> 0) handling; the caller zeroes
/// its vertical velocity when `blocked.y` is set.
pub fn resolve_body(
    world: &WorldGeometry,
    body: Body,
    prev: Vec3,
    proposed: Vec3,
    vertical_velocity: f32,
) -> Resolution {
    let mut blocked = BlockedAxes::default();
    let mut grounded = false;

    // Y against the previous footprint, so sliding along a wall can't change the floor
    let mut y = proposed.y;
    for obstacle in world.obstacles() {
        let volume = Aabb::body(Vec3::new(prev.x, y, prev.z), body.radius, body.height);
        if !obstacle.bounds.overlaps_footprint(&volume) || !obstacle.bounds.touches_vertically(&volume) {
            continue;
        }

        if vertical_velocity <= 0.0 {
            if y <= obstacle.top() + SLAB_TOLERANCE && y > obstacle.bottom() - FLOOR_SNAP_DEPTH {
                y = obstacle.top();
                grounded = true;
                blocked.y = true;
            }
        } else {
            let head = y + body.height;
            if head > obstacle.bottom() && head < obstacle.top() {
                y = obstacle.bottom() - body.height - CEILING_GAP;
                blocked.y = true;
            }
        }
    }

    let feet = y;
    let head = y + body.height;
    let steps_blocked = |pos: Vec3| {
        let volume = Aabb::body(pos, body.radius, body.height);
        world.obstacles().iter().any(|o| {
            is_vertical_wall(o, feet, head)
                && o.top() - feet > STEP_HEIGHT
                && o.bounds.intersects(&volume)
        })
    };

    let mut x = proposed.x;
    if x != prev.x && steps_blocked(Vec3::new(x, y, prev.z)) {
        x = prev.x;
        blocked.x = true;
    }

    let mut z = proposed.z;
    if z != prev.z && steps_blocked(Vec3::new(x, y, z)) {
        z = prev.z;
        blocked.z = true;
    }

    Resolution {
        pos: Vec3::new(x, y, z),
        blocked,
        grounded,
    }
}

/// Result of one agent pursuit step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStep {
    pub pos: Vec3,
    pub blocked: BlockedAxes,
}

/// Avoidance variant used by agents.
///
/// Moves `step` along the planar `dir` plus `jitter` on both axes. If one axis is
/// blocked, the other axis gets 1.5x its step to slide around the obstacle. Both axes
/// blocked means no movement.
pub fn agent_step(
    world: &WorldGeometry,
    body: Body,
    pos: Vec3,
    dir: Vec3,
    step: f32,
    jitter: f32,
) -> AgentStep {
    let feet = pos.y;
    let head = pos.y + body.height;
    let wall_at = |x: f32, z: f32| {
        let volume = Aabb::body(Vec3::new(x, feet, z), body.radius, body.height);
        world
            .obstacles()
            .iter()
            .any(|o| is_vertical_wall(o, feet, head) && o.bounds.intersects(&volume))
    };

    let nx = pos.x + dir.x * step + jitter;
    let nz = pos.z + dir.z * step + jitter;
    let blocked = BlockedAxes {
        x: wall_at(nx, pos.z),
        y: false,
        z: wall_at(pos.x, nz),
    };

    let (x, z) = match (blocked.x, blocked.z) {
        (false, false) => {
            if wall_at(nx, nz) {
                (nx, pos.z)
            } else {
                (nx, nz)
            }
        }
        (true, false) => {
            let boosted = pos.z + dir.z * step * 1.5 + jitter;
            if wall_at(pos.x, boosted) {
                (pos.x, nz)
            } else {
                (pos.x, boosted)
            }
        }
        (false, true) => {
            let boosted = pos.x + dir.x * step * 1.5 + jitter;
            if wall_at(boosted, pos.z) {
                (nx, pos.z)
            } else {
                (boosted, pos.z)
            }
        }
        (true, true) => (pos.x, pos.z),
    };

    AgentStep {
        pos: Vec3::new(x, pos.y, z),
        blocked,
    }
}
