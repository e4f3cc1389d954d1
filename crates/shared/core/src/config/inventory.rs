use serde::{Deserialize, Serialize};

use super::{ConfigResult, MAX_BPS, MAX_FLOOR_BPS, ensure_max};
use crate::values::Amount;

/// Inventory target, floor, recenter threshold and tilt shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Target base holding (raw base units)
    pub target_base_xstar: Amount,
    /// Reserve floor as a fraction of target (max 5000 = 50%)
    pub floor_bps: u32,
    /// Price drift, in whole percent, that allows a recenter
    pub recenter_threshold_pct: u32,
    /// Tilt charged per 1% of inventory deviation
    pub inv_tilt_bps_per_1pct: u32,
    /// Hard cap on the tilt adjustment
    pub inv_tilt_max_bps: u32,
    /// Extra tilt weight from confidence
    pub tilt_conf_weight_bps: u32,
    /// Extra tilt weight from the book spread
    pub tilt_spread_weight_bps: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            target_base_xstar: 0,
            floor_bps: 300,
            recenter_threshold_pct: 5,
            inv_tilt_bps_per_1pct: 0,
            inv_tilt_max_bps: 0,
            tilt_conf_weight_bps: 0,
            tilt_spread_weight_bps: 0,
        }
    }
}

impl InventoryConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_max(
            "inventory.floor_bps",
            self.floor_bps as u128,
            MAX_FLOOR_BPS as u128,
        )?;
        ensure_max(
            "inventory.recenter_threshold_pct",
            self.recenter_threshold_pct as u128,
            100,
        )?;
        ensure_max(
            "inventory.inv_tilt_max_bps",
            self.inv_tilt_max_bps as u128,
            MAX_BPS as u128,
        )?;
        ensure_max(
            "inventory.tilt_conf_weight_bps",
            self.tilt_conf_weight_bps as u128,
            MAX_BPS as u128,
        )?;
        ensure_max(
            "inventory.tilt_spread_weight_bps",
            self.tilt_spread_weight_bps as u128,
            MAX_BPS as u128,
        )
    }

    /// Recenter threshold converted to bps
    pub fn recenter_threshold_bps(&self) -> u32 {
        self.recenter_threshold_pct.saturating_mul(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_floor_limit() {
        let mut cfg = InventoryConfig {
            floor_bps: 5_000,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());

        cfg.floor_bps = 5_001;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::OutOfRange {
                field: "inventory.floor_bps",
                value: 5_001,
                max: 5_000,
            })
        );
    }

    #[test]
    fn test_tilt_weights_bounded() {
        let cfg = InventoryConfig {
            tilt_spread_weight_bps: 10_001,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_threshold_in_bps() {
        let cfg = InventoryConfig {
            recenter_threshold_pct: 7,
            ..Default::default()
        };
        assert_eq!(cfg.recenter_threshold_bps(), 700);
    }
}
