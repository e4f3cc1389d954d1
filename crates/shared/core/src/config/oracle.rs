use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult, MAX_BPS, ensure_max, ensure_non_zero};

/// Oracle freshness, confidence and divergence policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Maximum primary/secondary age accepted (seconds)
    pub max_age_sec: u64,
    /// Maximum EMA age accepted when falling back (seconds)
    pub stall_window_sec: u64,
    /// Confidence cap in Spot mode; also the spread gate for the primary book
    pub conf_cap_bps_spot: u32,
    /// Confidence cap in Strict mode (or whenever the secondary feed contributes)
    pub conf_cap_bps_strict: u32,
    /// Legacy single divergence threshold (0 = disabled)
    pub divergence_bps: u32,
    /// Allow the EMA feed when the primary spot is stale or too wide
    pub allow_ema_fallback: bool,
    pub conf_weight_spread_bps: u32,
    pub conf_weight_sigma_bps: u32,
    pub conf_weight_secondary_bps: u32,
    /// EWMA decay for sigma; 10000 freezes sigma at its first value
    pub sigma_ewma_lambda_bps: u32,
    pub divergence_accept_bps: u32,
    pub divergence_soft_bps: u32,
    pub divergence_hard_bps: u32,
    pub haircut_min_bps: u32,
    pub haircut_slope_bps: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_age_sec: 60,
            stall_window_sec: 10,
            conf_cap_bps_spot: 100,
            conf_cap_bps_strict: 100,
            divergence_bps: 50,
            allow_ema_fallback: true,
            conf_weight_spread_bps: MAX_BPS,
            conf_weight_sigma_bps: MAX_BPS,
            conf_weight_secondary_bps: MAX_BPS,
            sigma_ewma_lambda_bps: 9_000,
            divergence_accept_bps: 0,
            divergence_soft_bps: 0,
            divergence_hard_bps: 0,
            haircut_min_bps: 0,
            haircut_slope_bps: 0,
        }
    }
}

/// Divergence tiers after legacy defaults are filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivergenceThresholds {
    pub accept_bps: u32,
    pub soft_bps: u32,
    /// 0 means no hard tier
    pub hard_bps: u32,
}

impl OracleConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_non_zero("oracle.max_age_sec", self.max_age_sec as u128)?;
        for (field, value) in [
            ("oracle.conf_cap_bps_spot", self.conf_cap_bps_spot),
            ("oracle.conf_cap_bps_strict", self.conf_cap_bps_strict),
            ("oracle.conf_weight_spread_bps", self.conf_weight_spread_bps),
            ("oracle.conf_weight_sigma_bps", self.conf_weight_sigma_bps),
            (
                "oracle.conf_weight_secondary_bps",
                self.conf_weight_secondary_bps,
            ),
            ("oracle.sigma_ewma_lambda_bps", self.sigma_ewma_lambda_bps),
        ] {
            ensure_max(field, value as u128, MAX_BPS as u128)?;
        }

        let tiers = self.resolved_thresholds();
        let ordered = tiers.accept_bps <= tiers.soft_bps
            && (tiers.hard_bps == 0 || tiers.soft_bps <= tiers.hard_bps);
        if !ordered {
            return Err(ConfigError::DivergenceTiers {
                accept: tiers.accept_bps,
                soft: tiers.soft_bps,
                hard: tiers.hard_bps,
            });
        }

        let span = (tiers.soft_bps - tiers.accept_bps) as u128;
        let max_haircut = self.haircut_min_bps as u128 + self.haircut_slope_bps as u128 * span;
        if max_haircut >= MAX_BPS as u128 {
            return Err(ConfigError::HaircutCurve {
                max_bps: max_haircut,
            });
        }
        Ok(())
    }

    /// Fill unset tiers from the legacy threshold
    pub fn resolved_thresholds(&self) -> DivergenceThresholds {
        let or_legacy = |value: u32| {
            if value == 0 {
                self.divergence_bps
            } else {
                value
            }
        };
        DivergenceThresholds {
            accept_bps: or_legacy(self.divergence_accept_bps),
            soft_bps: or_legacy(self.divergence_soft_bps),
            hard_bps: or_legacy(self.divergence_hard_bps),
        }
    }

    /// Maximum age accepted for the EMA fallback
    pub fn ema_max_age_sec(&self) -> u64 {
        self.max_age_sec.min(self.stall_window_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiered() -> OracleConfig {
        OracleConfig {
            divergence_accept_bps: 10,
            divergence_soft_bps: 30,
            divergence_hard_bps: 50,
            haircut_min_bps: 5,
            haircut_slope_bps: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_tiers_default_to_legacy() {
        let cfg = OracleConfig {
            divergence_bps: 40,
            ..Default::default()
        };
        let tiers = cfg.resolved_thresholds();
        assert_eq!(tiers.accept_bps, 40);
        assert_eq!(tiers.soft_bps, 40);
        assert_eq!(tiers.hard_bps, 40);
    }

    #[test]
    fn test_tier_order_enforced() {
        assert!(tiered().validate().is_ok());

        let cfg = OracleConfig {
            divergence_soft_bps: 60,
            ..tiered()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DivergenceTiers {
                accept: 10,
                soft: 60,
                hard: 50,
            })
        );
    }

    #[test]
    fn test_no_hard_tier_allowed() {
        let cfg = OracleConfig {
            divergence_bps: 0,
            divergence_hard_bps: 0,
            ..tiered()
        };
        assert_eq!(cfg.resolved_thresholds().hard_bps, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_haircut_curve_below_full_fee() {
        // 5 + 2 * 20 = 45, fine
        assert!(tiered().validate().is_ok());

        let cfg = OracleConfig {
            haircut_slope_bps: 500,
            ..tiered()
        };
        // 5 + 500 * 20 = 10005
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::HaircutCurve { max_bps: 10_005 })
        );
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let cfg = OracleConfig {
            max_age_sec: 0,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Zero {
                field: "oracle.max_age_sec"
            })
        );
    }

    #[test]
    fn test_ema_age_window() {
        let cfg = OracleConfig {
            max_age_sec: 60,
            stall_window_sec: 15,
            ..Default::default()
        };
        assert_eq!(cfg.ema_max_age_sec(), 15);
    }
}
