//! Pool configuration
//!
//! Every struct is replaced wholesale by governance and re-validated on
//! write. `PoolParams` bundles them and adds the cross-struct checks.

mod aomq;
mod features;
mod fee;
mod inventory;
mod maker;
mod oracle;
mod token;

pub use aomq::AomqConfig;
pub use features::FeatureFlags;
pub use fee::FeeConfig;
pub use inventory::InventoryConfig;
pub use maker::MakerConfig;
pub use oracle::{DivergenceThresholds, OracleConfig};
pub use token::TokenConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest value any basis-point field may take
pub const MAX_BPS: u32 = 10_000;

/// Largest inventory floor (50% of target)
pub const MAX_FLOOR_BPS: u32 = 5_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} out of range: {value} > {max}")]
    OutOfRange {
        field: &'static str,
        value: u128,
        max: u128,
    },

    #[error("{field} must be non-zero")]
    Zero { field: &'static str },

    #[error("Divergence tiers out of order: accept={accept} soft={soft} hard={hard}")]
    DivergenceTiers { accept: u32, soft: u32, hard: u32 },

    #[error("Haircut curve reaches {max_bps} bps (must stay below 10000)")]
    HaircutCurve { max_bps: u128 },

    #[error("Fee base {base_bps} bps above cap {cap_bps} bps")]
    FeeBaseAboveCap { base_bps: u32, cap_bps: u32 },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub(crate) fn ensure_max(field: &'static str, value: u128, max: u128) -> ConfigResult<()> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value, max });
    }
    Ok(())
}

pub(crate) fn ensure_below(field: &'static str, value: u128, limit: u128) -> ConfigResult<()> {
    if value >= limit {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            max: limit.saturating_sub(1),
        });
    }
    Ok(())
}

pub(crate) fn ensure_non_zero(field: &'static str, value: u128) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::Zero { field });
    }
    Ok(())
}

/// Complete parameter set for one pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolParams {
    pub token: TokenConfig,
    pub inventory: InventoryConfig,
    pub oracle: OracleConfig,
    pub fee: FeeConfig,
    pub maker: MakerConfig,
    pub aomq: AomqConfig,
    pub features: FeatureFlags,
}

impl PoolParams {
    /// Validate every struct and the invariants that span them
    pub fn validate(&self) -> ConfigResult<()> {
        self.token.validate()?;
        self.inventory.validate()?;
        self.oracle.validate()?;
        self.fee.validate()?;
        self.maker.validate()?;
        self.aomq.validate()?;

        ensure_max(
            "aomq.emergency_spread_bps",
            self.aomq.emergency_spread_bps as u128,
            self.fee.cap_bps as u128,
        )?;
        ensure_max(
            "inventory.floor_bps + aomq.floor_epsilon_bps",
            self.inventory.floor_bps as u128 + self.aomq.floor_epsilon_bps as u128,
            MAX_FLOOR_BPS as u128,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(PoolParams::default().validate().is_ok());
    }

    #[test]
    fn test_emergency_spread_must_fit_fee_cap() {
        let mut params = PoolParams::default();
        params.aomq.emergency_spread_bps = params.fee.cap_bps + 1;

        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange {
                field: "aomq.emergency_spread_bps",
                ..
            })
        ));
    }

    #[test]
    fn test_floor_plus_epsilon_bounded() {
        let mut params = PoolParams::default();
        params.inventory.floor_bps = 4_900;
        params.aomq.floor_epsilon_bps = 200;

        assert!(params.validate().is_err());

        params.aomq.floor_epsilon_bps = 100;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_json_round_trip() {
        let params = PoolParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: PoolParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
