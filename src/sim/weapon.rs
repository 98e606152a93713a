//! Weapons: static stat table and mutable ammo counters
//!
//! One `Weapon` per `WeaponKind`, held by the `Armory`. Stats never change; ammo
//! counters reset on restart.

use serde::{Deserialize, Serialize};

/// Every weapon in the game, in hotkey order (slot 1..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Assault,
    Pistol,
    Knife,
    Grenade,
    Revolver,
    AutoPistol,
    Crossbow,
    Sniper,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 8] = [
        WeaponKind::Assault,
        WeaponKind::Pistol,
        WeaponKind::Knife,
        WeaponKind::Grenade,
        WeaponKind::Revolver,
        WeaponKind::AutoPistol,
        WeaponKind::Crossbow,
        WeaponKind::Sniper,
    ];

    /// Weapons owned at the start of every session
    pub const STARTER: [WeaponKind; 4] = [
        WeaponKind::Assault,
        WeaponKind::Pistol,
        WeaponKind::Knife,
        WeaponKind::Grenade,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weapon bound to hotkey `slot` (1-based)
    pub fn from_slot(slot: u8) -> Option<Self> {
        let index = usize::from(slot).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn stats(self) -> &'static WeaponStats {
        &WEAPON_TABLE[self.index()]
    }
}

/// How a head hit is scored. A weapon has exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeadshotRule {
    /// Base damage times this factor
    Multiplier(f32),
    /// Fixed damage, ignoring base damage
    Absolute(f32),
}

/// Per-category fire behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponCategory {
    /// Instant ray along the view direction
    Hitscan,
    /// Strikes the first living agent within `range`
    Melee { range: f32 },
    /// Throws a grenade that deals damage within `radius` on detonation
    Explosive { radius: f32 },
}

/// Ammo sold in the shop for a weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmmoPack {
    pub rounds: u32,
    pub price: u64,
}

/// Static weapon stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeaponStats {
    pub name: &'static str,
    pub damage: f32,
    pub headshot: HeadshotRule,
    pub magazine_size: u32,
    pub starting_reserve: u32,
    /// Minimum seconds between two shots
    pub fire_interval: f64,
    /// Seconds a reload takes
    pub reload_duration: f64,
    /// Shop price (0 = starter weapon)
    pub price: u64,
    pub ammo_pack: Option<AmmoPack>,
    pub category: WeaponCategory,
}

impl WeaponStats {
    /// Damage dealt by a hit, depending on whether it landed on the head
    pub fn damage_for(&self, headshot: bool) -> f32 {
        if !headshot {
            return self.damage;
        }
        match self.headshot {
            HeadshotRule::Multiplier(factor) => self.damage * factor,
            HeadshotRule::Absolute(amount) => amount,
        }
    }

    /// Melee and explosive weapons never use ammo packs from the magazine
    pub fn consumes_ammo(&self) -> bool {
        !matches!(self.category, WeaponCategory::Melee { .. })
    }
}

const WEAPON_TABLE: [WeaponStats; 8] = [
    WeaponStats {
        name: "Assault Rifle",
        damage: 13.0,
        headshot: HeadshotRule::Multiplier(1.0),
        magazine_size: 30,
        starting_reserve: 90,
        fire_interval: 0.1,
        reload_duration: 2.0,
        price: 0,
        ammo_pack: Some(AmmoPack { rounds: 30, price: 300 }),
        category: WeaponCategory::Hitscan,
    },
    WeaponStats {
        name: "Pistol",
        damage: 20.0,
        headshot: HeadshotRule::Multiplier(1.5),
        magazine_size: 12,
        starting_reserve: 48,
        fire_interval: 0.3,
        reload_duration: 1.5,
        price: 0,
        ammo_pack: Some(AmmoPack { rounds: 12, price: 150 }),
        category: WeaponCategory::Hitscan,
    },
    WeaponStats {
        name: "Knife",
        damage: 60.0,
        headshot: HeadshotRule::Multiplier(1.0),
        magazine_size: 1,
        starting_reserve: 999,
        fire_interval: 0.5,
        reload_duration: 0.0,
        price: 0,
        ammo_pack: None,
        category: WeaponCategory::Melee { range: 3.0 },
    },
    WeaponStats {
        name: "Grenade",
        damage: 150.0,
        headshot: HeadshotRule::Multiplier(1.0),
        magazine_size: 1,
        starting_reserve: 3,
        fire_interval: 1.0,
        reload_duration: 1.0,
        price: 0,
        ammo_pack: Some(AmmoPack { rounds: 1, price: 400 }),
        category: WeaponCategory::Explosive { radius: 5.0 },
    },
    WeaponStats {
        name: "Revolver",
        damage: 45.0,
        headshot: HeadshotRule::Absolute(90.0),
        magazine_size: 6,
        starting_reserve: 24,
        fire_interval: 0.6,
        reload_duration: 2.0,
        price: 3000,
        ammo_pack: Some(AmmoPack { rounds: 6, price: 200 }),
        category: WeaponCategory::Hitscan,
    },
    WeaponStats {
        name: "Auto Pistol",
        damage: 18.0,
        headshot: HeadshotRule::Multiplier(1.2),
        magazine_size: 20,
        starting_reserve: 60,
        fire_interval: 0.08,
        reload_duration: 1.8,
        price: 2500,
        ammo_pack: Some(AmmoPack { rounds: 15, price: 200 }),
        category: WeaponCategory::Hitscan,
    },
    WeaponStats {
        name: "Crossbow",
        damage: 49.0,
        headshot: HeadshotRule::Absolute(70.0),
        magazine_size: 1,
        starting_reserve: 20,
        fire_interval: 1.0,
        reload_duration: 1.5,
        price: 4000,
        ammo_pack: Some(AmmoPack { rounds: 5, price: 250 }),
        category: WeaponCategory::Hitscan,
    },
    WeaponStats {
        name: "Sniper Rifle",
        damage: 50.0,
        headshot: HeadshotRule::Absolute(500.0),
        magazine_size: 5,
        starting_reserve: 15,
        fire_interval: 0.8,
        reload_duration: 2.5,
        price: 7000,
        ammo_pack: Some(AmmoPack { rounds: 5, price: 500 }),
        category: WeaponCategory::Hitscan,
    },
];

/// Mutable per-weapon state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    /// Simulation time of the last accepted shot
    pub last_fired: Option<f64>,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            current_ammo: stats.magazine_size,
            reserve_ammo: stats.starting_reserve,
            last_fired: None,
        }
    }

    #[inline]
    pub fn stats(&self) -> &'static WeaponStats {
        self.kind.stats()
    }

    pub fn magazine_deficit(&self) -> u32 {
        self.stats().magazine_size.saturating_sub(self.current_ammo)
    }

    /// Seconds left before the weapon may fire again
    pub fn cooldown_remaining(&self, now: f64) -> f64 {
        match self.last_fired {
            Some(t) => (t + self.stats().fire_interval - now).max(0.0),
            None => 0.0,
        }
    }

    /// Move rounds from reserve into the magazine; returns rounds moved
    pub fn refill_magazine(&mut self) -> u32 {
        let moved = self.magazine_deficit().min(self.reserve_ammo);
        self.current_ammo += moved;
        self.reserve_ammo -= moved;
        moved
    }
}

/// A reload in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reload {
    pub weapon: WeaponKind,
    /// Simulation time it completes
    pub until: f64,
}

/// All weapons, the active one, and the (single) reload in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armory {
    weapons: Vec<Weapon>,
    pub active: WeaponKind,
    pub reloading: Option<Reload>,
}

impl Default for Armory {
    fn default() -> Self {
        Self {
            weapons: WeaponKind::ALL.iter().map(|&k| Weapon::new(k)).collect(),
            active: WeaponKind::Assault,
            reloading: None,
        }
    }
}

impl Armory {
    pub fn get(&self, kind: WeaponKind) -> &Weapon {
        &self.weapons[kind.index()]
    }

    pub fn get_mut(&mut self, kind: WeaponKind) -> &mut Weapon {
        &mut self.weapons[kind.index()]
    }

    pub fn active_weapon(&self) -> &Weapon {
        self.get(self.active)
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading.is_some()
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Back to starting ammo with the assault rifle drawn
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_map_to_kinds() {
        assert_eq!(WeaponKind::from_slot(1), Some(WeaponKind::Assault));
        assert_eq!(WeaponKind::from_slot(8), Some(WeaponKind::Sniper));
        assert_eq!(WeaponKind::from_slot(0), None);
        assert_eq!(WeaponKind::from_slot(9), None);
        for (i, kind) in WeaponKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_absolute_headshot_ignores_multiplier() {
        let sniper = WeaponKind::Sniper.stats();
        assert_eq!(sniper.damage_for(true), 500.0);
        assert_eq!(sniper.damage_for(false), 50.0);

        let pistol = WeaponKind::Pistol.stats();
        assert_eq!(pistol.damage_for(true), 30.0);
        assert_eq!(WeaponKind::Assault.stats().damage_for(true), 13.0);
    }

    #[test]
    fn test_refill_moves_min_of_deficit_and_reserve() {
        let mut rifle = Weapon::new(WeaponKind::Assault);
        rifle.current_ammo = 10;
        assert_eq!(rifle.refill_magazine(), 20);
        assert_eq!((rifle.current_ammo, rifle.reserve_ammo), (30, 70));

        let mut sniper = Weapon::new(WeaponKind::Sniper);
        sniper.current_ammo = 0;
        sniper.reserve_ammo = 3;
        assert_eq!(sniper.refill_magazine(), 3);
        assert_eq!((sniper.current_ammo, sniper.reserve_ammo), (3, 0));
    }

    #[test]
    fn test_cooldown_remaining() {
        let mut pistol = Weapon::new(WeaponKind::Pistol);
        assert_eq!(pistol.cooldown_remaining(5.0), 0.0);
        pistol.last_fired = Some(5.0);
        assert!((pistol.cooldown_remaining(5.1) - 0.2).abs() < 1e-9);
        assert_eq!(pistol.cooldown_remaining(6.0), 0.0);
    }
}
