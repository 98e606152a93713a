//! Platform abstraction layer
//!
//! Handles browser/native differences for logging setup and picks the storage
//! backends: a JSON file in the working directory natively, LocalStorage on the web.

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use crate::persistence::CurrencyStore;
use crate::settings::Settings;

/// Install the global logger.
///
/// Natively this is `env_logger` honoring `RUST_LOG`; `verbose` only changes the
/// default filter. On the web, logs go to the browser console and panics are
/// forwarded there too. Calling it twice is harmless.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    // Fails only if a logger is already installed
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(level);
}

/// Save file for the currency balance (native)
#[cfg(not(target_arch = "wasm32"))]
pub const SAVE_FILE: &str = "deadblock_save.json";

/// Currency store for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn currency_store() -> Box<dyn CurrencyStore> {
    Box::new(crate::persistence::FileStore::new(SAVE_FILE))
}

#[cfg(target_arch = "wasm32")]
pub fn currency_store() -> Box<dyn CurrencyStore> {
    Box::new(crate::persistence::LocalStorageStore)
}

/// Stored preferences, defaults if missing or unreadable
#[cfg(not(target_arch = "wasm32"))]
pub fn load_settings() -> Settings {
    Settings::load_from(Path::new("."))
}

#[cfg(target_arch = "wasm32")]
pub fn load_settings() -> Settings {
    Settings::load_local()
}

/// Persist preferences; failures are logged and otherwise ignored
pub fn save_settings(settings: &Settings) {
    #[cfg(not(target_arch = "wasm32"))]
    let result = settings.save_to(Path::new("."));
    #[cfg(target_arch = "wasm32")]
    let result = settings.save_local();

    if let Err(e) = result {
        log::warn!("Failed to save settings: {e}");
    }
}
