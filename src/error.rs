//! Error and rejection types
//!
//! `Rejection` is not a fault: it is the reason an action was refused, shown to the
//! player and otherwise ignored. The other types cover the I/O edges (storage,
//! config files) and are logged by callers, never fatal.

use serde::Serialize;
use thiserror::Error;

/// Why a player action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum Rejection {
    #[error("Reloading...")]
    Reloading,
    #[error("Game over")]
    GameOver,
    #[error("The game has not started yet")]
    NotStarted,
    #[error("Game is paused")]
    Paused,
    #[error("Out of ammo! Press R to reload")]
    OutOfAmmo,
    #[error("Weapon is not ready")]
    Cooldown,
    #[error("Magazine is already full")]
    MagazineFull,
    #[error("No reserve ammo")]
    NoReserveAmmo,
    #[error("Not enough money")]
    InsufficientFunds,
    #[error("You already own this weapon")]
    AlreadyOwned,
    #[error("Buy the weapon first")]
    WeaponNotOwned,
    #[error("No ammo is sold for this weapon")]
    NoAmmoForSale,
    #[error("Movement speed is already at its maximum")]
    SpeedMaxed,
    #[error("The current wave is still in progress")]
    WaveInProgress,
}

impl Rejection {
    /// Quiet rejections are not surfaced as toasts (holding the trigger between shots)
    pub fn is_quiet(&self) -> bool {
        matches!(self, Rejection::Cooldown)
    }
}

/// Errors from the currency/settings storage backends
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored value under {key:?} is not a valid amount: {value}")]
    Corrupt { key: String, value: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors while loading a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
