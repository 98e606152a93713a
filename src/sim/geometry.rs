//! Static block-world geometry
//!
//! Every solid in the map is an axis-aligned box. Obstacles are built once with the
//! map and never change.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of `size` centered on `center`
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Upright body box: `feet` is the bottom center
    pub fn body(feet: Vec3, radius: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(feet.x - radius, feet.y, feet.z - radius),
            max: Vec3::new(feet.x + radius, feet.y + height, feet.z + radius),
        }
    }

    /// Interiors overlap (touching faces do not count)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Interiors overlap on X and Z
    #[inline]
    pub fn overlaps_footprint(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Vertical ranges overlap or touch
    #[inline]
    pub fn touches_vertically(&self, other: &Aabb) -> bool {
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Distance along `dir` at which a ray from `origin` enters the box (slab method).
    ///
    /// Returns 0 if the origin is inside. `dir` need not be normalized; the result is
    /// in units of `dir`.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if d.abs() < 1e-8 {
                // Parallel to this slab: must already be inside it
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

/// Surface tag, only meaningful to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Ground,
    Wall,
    Crate,
    Platform,
}

/// An immutable solid box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub bounds: Aabb,
    pub material: Material,
}

impl Obstacle {
    pub fn new(center: Vec3, size: Vec3, material: Material) -> Self {
        Self {
            bounds: Aabb::from_center_size(center, size),
            material,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.bounds.max.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.bounds.min.y
    }
}

/// The static obstacle set every collision query runs against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldGeometry {
    obstacles: Vec<Obstacle>,
}

impl WorldGeometry {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Ground slab only (top at y = 0), `size` wide on x and z
    pub fn flat(size: f32) -> Self {
        Self::new(vec![Obstacle::new(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(size, 1.0, size),
            Material::Ground,
        )])
    }

    /// The default 60x60 arena: ground, boundary walls, sixteen crates and two
    /// raised platforms
    pub fn arena() -> Self {
        let mut world = Self::flat(60.0);

        let walls = [
            (Vec3::new(0.0, 2.0, -30.0), Vec3::new(60.0, 4.0, 1.0)),
            (Vec3::new(0.0, 2.0, 30.0), Vec3::new(60.0, 4.0, 1.0)),
            (Vec3::new(-30.0, 2.0, 0.0), Vec3::new(1.0, 4.0, 60.0)),
            (Vec3::new(30.0, 2.0, 0.0), Vec3::new(1.0, 4.0, 60.0)),
        ];
        for (center, size) in walls {
            world.push(Obstacle::new(center, size, Material::Wall));
        }

        let crates: [(f32, f32); 16] = [
            (-15.0, -15.0),
            (15.0, -15.0),
            (-15.0, 15.0),
            (15.0, 15.0),
            (0.0, -20.0),
            (0.0, 20.0),
            (-20.0, 0.0),
            (20.0, 0.0),
            (-8.0, -8.0),
            (8.0, 8.0),
            (-8.0, 8.0),
            (8.0, -8.0),
            (-10.0, 0.0),
            (10.0, 0.0),
            (0.0, -10.0),
            (0.0, 10.0),
        ];
        for (x, z) in crates {
            world.push(Obstacle::new(
                Vec3::new(x, 1.0, z),
                Vec3::new(3.0, 2.0, 3.0),
                Material::Crate,
            ));
        }

        for (x, z) in [(-20.0, -20.0), (20.0, 20.0)] {
            world.push(Obstacle::new(
                Vec3::new(x, 3.0, z),
                Vec3::new(5.0, 1.0, 5.0),
                Material::Platform,
            ));
        }

        world
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// True if an upright body at `feet` overlaps any solid
    pub fn body_intersects(&self, feet: Vec3, radius: f32, height: f32) -> bool {
        let body = Aabb::body(feet, radius, height);
        self.obstacles.iter().any(|o| o.bounds.intersects(&body))
    }
}
