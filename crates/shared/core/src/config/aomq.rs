use serde::{Deserialize, Serialize};

use super::{ConfigResult, MAX_BPS, MAX_FLOOR_BPS, ensure_below, ensure_max};

/// Emergency quoting near the floor or under oracle stress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AomqConfig {
    /// Largest fill notional (quote units) while in emergency; 0 = unlimited
    pub min_quote_notional: u128,
    pub emergency_spread_bps: u32,
    /// Extra floor headroom while in emergency
    pub floor_epsilon_bps: u32,
}

impl AomqConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_below(
            "aomq.emergency_spread_bps",
            self.emergency_spread_bps as u128,
            MAX_BPS as u128,
        )?;
        ensure_max(
            "aomq.floor_epsilon_bps",
            self.floor_epsilon_bps as u128,
            MAX_FLOOR_BPS as u128,
        )
    }
}
