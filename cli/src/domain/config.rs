//! Domain types and validators for keel configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::vm::DEFAULT_HOSTS_PATH;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "cpi.command",
    "cpi.timeout_secs",
    "hosts.enabled",
    "hosts.path",
];

pub const DEFAULT_CPI_COMMAND: &str = "keel-cpi";
pub const DEFAULT_CPI_TIMEOUT_SECS: u64 = 600;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.keel/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KeelConfig {
    pub cpi: CpiConfig,
    pub hosts: HostsConfig,
}

/// External CPI executable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CpiConfig {
    /// Executable invoked once per cloud call.
    pub command: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CpiConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_CPI_COMMAND.to_string(),
            timeout_secs: DEFAULT_CPI_TIMEOUT_SECS,
        }
    }
}

/// Local name resolution for the created VM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostsConfig {
    /// Rewrite the hosts file with the VM's hostname after creation.
    pub enabled: bool,
    pub path: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: DEFAULT_HOSTS_PATH.to_string(),
        }
    }
}

impl KeelConfig {
    /// Render a single key as a display string.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_config_key(key)?;
        Ok(match key {
            "cpi.command" => self.cpi.command.clone(),
            "cpi.timeout_secs" => self.cpi.timeout_secs.to_string(),
            "hosts.enabled" => self.hosts.enabled.to_string(),
            _ => self.hosts.path.clone(),
        })
    }

    /// Validate and apply a single key/value pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "cpi.command" => value.clone_into(&mut self.cpi.command),
            "cpi.timeout_secs" => self.cpi.timeout_secs = value.parse()?,
            "hosts.enabled" => self.hosts.enabled = value.parse()?,
            _ => value.clone_into(&mut self.hosts.path),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |hint: &str| -> Result<()> {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            hint: hint.to_string(),
        }
        .into())
    };
    match key {
        "hosts.enabled" if value != "true" && value != "false" => invalid("Valid values: true, false"),
        "cpi.timeout_secs" if !value.parse::<u64>().is_ok_and(|n| n > 0) => {
            invalid("Expected a positive number of seconds")
        }
        "cpi.command" | "hosts.path" if value.trim().is_empty() => invalid("Value must not be empty"),
        _ => Ok(()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
