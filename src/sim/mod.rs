//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod agent;
pub mod collision;
pub mod combat;
pub mod economy;
pub mod geometry;
pub mod player;
pub mod projectile;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wave;
pub mod weapon;

pub use agent::{Agent, AgentState, BodyPart};
pub use collision::{Body, resolve_body};
pub use combat::{FireOutcome, ShotHit, fire, reload, select_slot};
pub use economy::{Economy, ShopItem, purchase};
pub use geometry::{Aabb, Material, Obstacle, WorldGeometry};
pub use player::{MoveIntent, Player};
pub use projectile::Projectile;
pub use schedule::{Deferred, Schedule};
pub use snapshot::RenderFrame;
pub use state::{GameEvent, GamePhase, GameState, Modal};
pub use tick::{TickInput, tick};
pub use wave::{WavePhase, WaveState, restart, start_game, start_next_wave};
pub use weapon::{Armory, Weapon, WeaponKind, WeaponStats};
