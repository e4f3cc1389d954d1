use serde::{Deserialize, Serialize};

use super::{ConfigResult, ensure_max};
use crate::math::{MAX_DECIMALS, MathResult, Rounding, WAD, scaled_mul_div};
use crate::values::{Amount, Wad};

/// Token decimals, fixed for the lifetime of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub base_decimals: u8,
    pub quote_decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            base_decimals: 18,
            quote_decimals: 6,
        }
    }
}

impl TokenConfig {
    pub fn new(base_decimals: u8, quote_decimals: u8) -> Self {
        Self {
            base_decimals,
            quote_decimals,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        ensure_max(
            "token.base_decimals",
            self.base_decimals as u128,
            MAX_DECIMALS as u128,
        )?;
        ensure_max(
            "token.quote_decimals",
            self.quote_decimals as u128,
            MAX_DECIMALS as u128,
        )
    }

    fn quote_minus_base(&self) -> i32 {
        self.quote_decimals as i32 - self.base_decimals as i32
    }

    /// Value of `base` units in quote units at `mid`
    pub fn base_to_quote(&self, base: Amount, mid: Wad, rounding: Rounding) -> MathResult<Amount> {
        scaled_mul_div(base, mid, WAD, self.quote_minus_base(), rounding)
    }

    /// Base units purchasable with `quote` units at `mid`
    pub fn quote_to_base(&self, quote: Amount, mid: Wad, rounding: Rounding) -> MathResult<Amount> {
        scaled_mul_div(quote, WAD, mid, -self.quote_minus_base(), rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_decimals_conversion() {
        let token = TokenConfig::new(18, 18);
        let mid = 2 * WAD;

        assert_eq!(token.base_to_quote(10, mid, Rounding::Down).unwrap(), 20);
        assert_eq!(token.quote_to_base(20, mid, Rounding::Down).unwrap(), 10);
        assert_eq!(token.quote_to_base(21, mid, Rounding::Down).unwrap(), 10);
        assert_eq!(token.quote_to_base(21, mid, Rounding::Up).unwrap(), 11);
    }

    #[test]
    fn test_mixed_decimals_conversion() {
        // HYPE/USDC style: 18 base decimals, 6 quote decimals, mid = 25.0
        let token = TokenConfig::default();
        let mid = 25 * WAD;
        let one_base = 1_000_000_000_000_000_000u128;

        assert_eq!(
            token.base_to_quote(one_base, mid, Rounding::Down).unwrap(),
            25_000_000
        );
        assert_eq!(
            token.quote_to_base(25_000_000, mid, Rounding::Down).unwrap(),
            one_base
        );
    }

    #[test]
    fn test_decimals_bounded() {
        assert!(TokenConfig::new(31, 6).validate().is_err());
        assert!(TokenConfig::new(30, 0).validate().is_ok());
    }
}
