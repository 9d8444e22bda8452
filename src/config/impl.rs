use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from "config.toml" in the current directory.
/// If the file doesn't exist, uses in-memory defaults.
///
/// # Examples
/// ```no_run
/// use scanty::config::init_config;
/// init_config().unwrap();
/// ```
pub fn init_config() -> Result<()> {
    init_config_from("config.toml")
}

/// Initialize the global configuration from an explicit TOML path
///
/// Only the first successful call has any effect.
pub fn init_config_from(path: &str) -> Result<()> {
    if CONFIG.get().is_some() {
        return Ok(());
    }

    let config = StaticConfig::load_from(path)?;
    let _ = CONFIG.set(ArcSwap::from_pointee(config));
    Ok(())
}
