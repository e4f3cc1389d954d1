//! Pool settings loading
//!
//! A JSON document describing one pool: parameters, roles, the initial
//! reserve counters and the recenter cooldown.

use dnmm_core::{ConfigError, PoolParams, Reserves};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::model::Roles;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(default)]
    pub params: PoolParams,

    #[serde(default)]
    pub roles: Roles,

    /// Starting reserve counters, in raw token units
    #[serde(default)]
    pub initial_reserves: Reserves,

    #[serde(default)]
    pub recenter_cooldown_sec: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] ConfigError),
}

impl PoolSettings {
    pub fn new(params: PoolParams, roles: Roles, initial_reserves: Reserves) -> Self {
        Self {
            params,
            roles,
            initial_reserves,
            recenter_cooldown_sec: 0,
        }
    }

    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| SettingsError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.params.validate()?;
        Ok(settings)
    }

    pub fn with_recenter_cooldown(mut self, cooldown_sec: u64) -> Self {
        self.recenter_cooldown_sec = cooldown_sec;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "params": {
                "fee": { "base_bps": 10, "cap_bps": 100 },
                "features": { "enable_aomq": true }
            },
            "roles": { "governance": "gov", "pauser": "ops" },
            "initial_reserves": { "base": 1000, "quote": 2000 },
            "recenter_cooldown_sec": 30
        }"#;

        let settings = PoolSettings::from_json(json).unwrap();
        assert_eq!(settings.params.fee.base_bps, 10);
        assert_eq!(settings.params.fee.decay_pct_per_block, 20);
        assert!(settings.params.features.enable_aomq);
        assert!(!settings.params.features.blend_on);
        assert_eq!(settings.roles.governance.as_str(), "gov");
        assert_eq!(settings.initial_reserves, Reserves::new(1_000, 2_000));
        assert_eq!(settings.recenter_cooldown_sec, 30);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let json = r#"{ "params": { "inventory": { "floor_bps": 6000 } } }"#;
        assert!(matches!(
            PoolSettings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_cooldown_builder() {
        let settings =
            PoolSettings::new(PoolParams::default(), Roles::default(), Reserves::default())
                .with_recenter_cooldown(90);
        assert_eq!(settings.recenter_cooldown_sec, 90);
        assert_eq!(settings.roles.governance.as_str(), "governance");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PoolSettings::from_json("{"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = PoolSettings::from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }
}
