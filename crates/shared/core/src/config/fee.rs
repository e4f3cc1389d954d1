use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult, MAX_BPS, ensure_below, ensure_max, ensure_non_zero};

/// Dynamic fee coefficients
///
/// `fee = base + conf * alpha + inventory_deviation * beta`, decayed per block,
/// plus the optional size term. Everything is clamped to `cap_bps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    pub base_bps: u32,
    pub alpha_conf_numerator: u32,
    pub alpha_conf_denominator: u32,
    pub beta_inv_dev_numerator: u32,
    pub beta_inv_dev_denominator: u32,
    pub cap_bps: u32,
    /// Percentage of the excess over target shed per block (0 = no decay state)
    pub decay_pct_per_block: u32,
    pub gamma_size_lin_bps: u32,
    pub gamma_size_quad_bps: u32,
    pub size_fee_cap_bps: u32,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            base_bps: 15,
            alpha_conf_numerator: 60,
            alpha_conf_denominator: 100,
            beta_inv_dev_numerator: 10,
            beta_inv_dev_denominator: 100,
            cap_bps: 150,
            decay_pct_per_block: 20,
            gamma_size_lin_bps: 0,
            gamma_size_quad_bps: 0,
            size_fee_cap_bps: 0,
        }
    }
}

impl FeeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_below("fee.cap_bps", self.cap_bps as u128, MAX_BPS as u128)?;
        if self.base_bps > self.cap_bps {
            return Err(ConfigError::FeeBaseAboveCap {
                base_bps: self.base_bps,
                cap_bps: self.cap_bps,
            });
        }
        ensure_non_zero(
            "fee.alpha_conf_denominator",
            self.alpha_conf_denominator as u128,
        )?;
        ensure_non_zero(
            "fee.beta_inv_dev_denominator",
            self.beta_inv_dev_denominator as u128,
        )?;
        ensure_max(
            "fee.decay_pct_per_block",
            self.decay_pct_per_block as u128,
            100,
        )?;
        ensure_max(
            "fee.size_fee_cap_bps",
            self.size_fee_cap_bps as u128,
            self.cap_bps as u128,
        )
    }
}
