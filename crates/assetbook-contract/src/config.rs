use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What `CreateAsset` does when the key already holds a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreatePolicy {
    /// Write unconditionally; the new record replaces the old one.
    #[default]
    Overwrite,
    /// Read first and fail with `AlreadyExists` if the key is taken.
    RejectExisting,
}

/// Configuration for the asset contract.
///
/// Loaded from TOML, for example:
///
/// ```toml
/// create_policy = "reject-existing"
/// allow_negative_balance = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Behaviour of `CreateAsset` on an existing key.
    pub create_policy: CreatePolicy,
    /// Whether a transaction may leave the balance below zero.
    pub allow_negative_balance: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            create_policy: CreatePolicy::Overwrite,
            allow_negative_balance: true,
        }
    }
}

impl ContractConfig {
    /// No overwrites on create and no overdrafts.
    pub fn strict() -> Self {
        Self {
            create_policy: CreatePolicy::RejectExisting,
            allow_negative_balance: false,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
