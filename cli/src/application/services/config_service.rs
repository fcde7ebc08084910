//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::KeelConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<KeelConfig> {
    store.load()
}

/// Validate `key`/`value`, apply it, and persist the result.
///
/// The file is only written when validation succeeds.
///
/// # Errors
///
/// Returns an error if validation fails or the config cannot be saved.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<KeelConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
