//! Currency, owned weapons and the shop
//!
//! The balance is persisted through a `CurrencyStore` after every change. A failing
//! store is logged and otherwise ignored; the in-memory balance stays authoritative.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use super::weapon::WeaponKind;
use crate::error::Rejection;
use crate::persistence::CurrencyStore;
use crate::tuning::Tuning;

/// Something the shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    Weapon(WeaponKind),
    Ammo(WeaponKind),
    HealthPotion,
    SpeedPotion,
}

impl ShopItem {
    /// Listed price, `None` if the item is not for sale
    pub fn price(self, tuning: &Tuning) -> Option<u64> {
        match self {
            ShopItem::Weapon(kind) => Some(kind.stats().price),
            ShopItem::Ammo(kind) => kind.stats().ammo_pack.map(|pack| pack.price),
            ShopItem::HealthPotion => Some(tuning.health_potion_price),
            ShopItem::SpeedPotion => Some(tuning.speed_potion_price),
        }
    }
}

#[derive(Debug)]
pub struct Economy {
    balance: u64,
    owned: BTreeSet<WeaponKind>,
    /// Player move speed factor, raised by speed potions
    pub speed_multiplier: f32,
    store: Box<dyn CurrencyStore>,
}

impl Economy {
    /// Read the stored balance (absent or unreadable means 0)
    pub fn load(store: Box<dyn CurrencyStore>) -> Self {
        let balance = match store.load() {
            Ok(Some(amount)) => amount,
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Failed to load currency, starting from 0: {e}");
                0
            }
        };
        log::info!("Loaded balance: {balance}");
        Self {
            balance,
            owned: WeaponKind::STARTER.into_iter().collect(),
            speed_multiplier: 1.0,
            store,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn owns(&self, kind: WeaponKind) -> bool {
        self.owned.contains(&kind)
    }

    /// Owned weapons in hotkey order
    pub fn owned(&self) -> impl Iterator<Item = WeaponKind> + '_ {
        self.owned.iter().copied()
    }

    /// Add a weapon without charging for it; returns false if already owned
    pub fn grant(&mut self, kind: WeaponKind) -> bool {
        self.owned.insert(kind)
    }

    pub fn earn(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
        self.persist();
    }

    pub fn spend(&mut self, amount: u64) -> Result<(), Rejection> {
        if self.balance < amount {
            return Err(Rejection::InsufficientFunds);
        }
        self.balance -= amount;
        self.persist();
        Ok(())
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Per-run bonuses go away on restart; balance and weapons stay
    pub fn reset_session(&mut self) {
        self.speed_multiplier = 1.0;
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.balance) {
            log::warn!("Failed to save currency: {e}");
        }
    }
}

/// Buy a weapon and draw it
pub fn purchase_weapon(state: &mut GameState, kind: WeaponKind) -> Result<(), Rejection> {
    if state.economy.owns(kind) {
        return Err(Rejection::AlreadyOwned);
    }
    state.economy.spend(kind.stats().price)?;
    state.economy.grant(kind);
    state.armory.active = kind;
    state.push_event(GameEvent::WeaponSwitched(kind));
    Ok(())
}

/// Buy one ammo pack; returns the rounds added to reserve
pub fn purchase_ammo(state: &mut GameState, kind: WeaponKind) -> Result<u32, Rejection> {
    if !state.economy.owns(kind) {
        return Err(Rejection::WeaponNotOwned);
    }
    let pack = kind.stats().ammo_pack.ok_or(Rejection::NoAmmoForSale)?;
    state.economy.spend(pack.price)?;
    let weapon = state.armory.get_mut(kind);
    weapon.reserve_ammo = weapon.reserve_ammo.saturating_add(pack.rounds);
    Ok(pack.rounds)
}

/// Returns the health actually recovered
pub fn purchase_health_potion(state: &mut GameState) -> Result<f32, Rejection> {
    state.economy.spend(state.tuning.health_potion_price)?;
    Ok(state.player.heal(state.tuning.health_potion_heal))
}

/// Returns the new speed multiplier
pub fn purchase_speed_potion(state: &mut GameState) -> Result<f32, Rejection> {
    let tuning = &state.tuning;
    let (price, step, cap) = (
        tuning.speed_potion_price,
        tuning.speed_potion_step,
        tuning.speed_multiplier_cap,
    );
    if !state.economy.can_afford(price) {
        return Err(Rejection::InsufficientFunds);
    }
    // Repeated 0.1 steps do not land exactly on the cap
    if state.economy.speed_multiplier >= cap - 1e-4 {
        return Err(Rejection::SpeedMaxed);
    }
    state.economy.spend(price)?;
    let next = state.economy.speed_multiplier + step;
    state.economy.speed_multiplier = if next >= cap - 1e-4 { cap } else { next };
    Ok(state.economy.speed_multiplier)
}

/// Run a shop purchase and report the result as an event
pub fn purchase(state: &mut GameState, item: ShopItem) -> Result<(), Rejection> {
    let result = match item {
        ShopItem::Weapon(kind) => purchase_weapon(state, kind),
        ShopItem::Ammo(kind) => purchase_ammo(state, kind).map(|_| ()),
        ShopItem::HealthPotion => purchase_health_potion(state).map(|healed| {
            state.toast(format!("Recovered {healed:.0} health"));
        }),
        ShopItem::SpeedPotion => purchase_speed_potion(state).map(|_| ()),
    };

    match result {
        Ok(()) => {
            let balance = state.economy.balance();
            log::info!("Purchased {item:?} ({balance} left)");
            state.push_event(GameEvent::Purchased { item, balance });
        }
        Err(reason) => {
            log::debug!("Purchase of {item:?} failed: {reason:?}");
            state.push_event(GameEvent::PurchaseFailed { item, reason });
        }
    }
    result
}
