//! Game settings and preferences
//!
//! Persisted separately from the currency balance (JSON file natively, LocalStorage
//! on the web).

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Controls ===
    /// Radians of turn per pixel of mouse movement
    pub mouse_sensitivity: f32,
    /// Invert vertical look
    pub invert_y: bool,

    // === Feedback ===
    /// Screen shake on shots and explosions
    pub screen_shake: bool,
    /// Floating damage numbers
    pub damage_numbers: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses shake regardless of `screen_shake`)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
            invert_y: false,
            screen_shake: true,
            damage_numbers: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Storage key / file stem
    const STORAGE_KEY: &'static str = "deadblock_settings";

    /// Load settings from LocalStorage, defaults if absent or invalid
    #[cfg(target_arch = "wasm32")]
    pub fn load_local() -> Self {
        let json = match local_storage().map(|s| s.get_item(Self::STORAGE_KEY)) {
            Ok(Ok(Some(json))) => json,
            Ok(Ok(None)) => {
                log::info!("Using default settings");
                return Self::default();
            }
            Ok(Err(_)) | Err(_) => {
                log::warn!("LocalStorage unavailable, using default settings");
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring invalid stored settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save_local(&self) -> Result<(), crate::PersistenceError> {
        let json = serde_json::to_string(self)?;
        local_storage()?
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| crate::PersistenceError::Unavailable("LocalStorage write".to_string()))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Load settings from `<dir>/deadblock_settings.json`, defaults if absent or invalid
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(dir: &std::path::Path) -> Self {
        let path = dir.join(format!("{}.json", Self::STORAGE_KEY));
        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to `<dir>/deadblock_settings.json`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, dir: &std::path::Path) -> Result<(), crate::PersistenceError> {
        let path = dir.join(format!("{}.json", Self::STORAGE_KEY));
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, crate::PersistenceError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| crate::PersistenceError::Unavailable("LocalStorage".to_string()))
}
