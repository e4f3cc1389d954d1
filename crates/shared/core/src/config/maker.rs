use serde::{Deserialize, Serialize};

use super::{ConfigResult, MAX_BPS, ensure_below, ensure_max, ensure_non_zero};

/// Top-of-book quoting shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakerConfig {
    /// Reference notional (quote units) for size fees and default quotes
    pub s0_notional: u128,
    /// Lifetime of a served quote
    pub ttl_ms: u32,
    /// Share of the observed spread used as a fee floor
    pub alpha_bbo_bps: u32,
    /// Absolute fee floor
    pub beta_floor_bps: u32,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            s0_notional: 0,
            ttl_ms: 200,
            alpha_bbo_bps: 0,
            beta_floor_bps: 0,
        }
    }
}

impl MakerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_non_zero("maker.ttl_ms", self.ttl_ms as u128)?;
        ensure_max(
            "maker.alpha_bbo_bps",
            self.alpha_bbo_bps as u128,
            MAX_BPS as u128,
        )?;
        ensure_below(
            "maker.beta_floor_bps",
            self.beta_floor_bps as u128,
            MAX_BPS as u128,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maker_bounds() {
        assert!(MakerConfig::default().validate().is_ok());

        let cfg = MakerConfig {
            ttl_ms: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = MakerConfig {
            beta_floor_bps: 10_000,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
