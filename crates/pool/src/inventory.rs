//! Inventory engine
//!
//! Valuation of the reserves at mid, the deviation and tilt terms used by the
//! fee policy, and the floor-aware fill computation.

use dnmm_core::math::{Rounding, apply_bps_up, mul_div, saturate_bps};
use dnmm_core::{Amount, BPS, Bps, InventoryConfig, Reserves, TokenConfig, Wad};
use log::debug;

use crate::error::{PoolError, PoolResult};
use crate::model::ReasonCode;

/// Reserves valued in quote units at `mid`
pub fn total_value(token: &TokenConfig, reserves: &Reserves, mid: Wad) -> PoolResult<Amount> {
    let base_value = token.base_to_quote(reserves.base, mid, Rounding::Down)?;
    Ok(reserves.quote.saturating_add(base_value))
}

/// Base holding worth half the portfolio at `mid`
pub fn balanced_base(token: &TokenConfig, reserves: &Reserves, mid: Wad) -> PoolResult<Amount> {
    let total = total_value(token, reserves, mid)?;
    Ok(token.quote_to_base(total, mid, Rounding::Down)? / 2)
}

/// Distance between the base holding and the target, as a share of total value
pub fn deviation_bps(
    token: &TokenConfig,
    reserves: &Reserves,
    target_base: Amount,
    mid: Wad,
) -> PoolResult<Bps> {
    let total = total_value(token, reserves, mid)?;
    if total == 0 {
        return Ok(0);
    }
    let base_value = token.base_to_quote(reserves.base, mid, Rounding::Down)?;
    let target_value = token.base_to_quote(target_base, mid, Rounding::Down)?;
    let gap = base_value.abs_diff(target_value);
    Ok(saturate_bps(mul_div(gap, BPS, total, Rounding::Down)?))
}

/// Market context that widens the tilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TiltContext {
    pub conf_bps: Bps,
    pub spread_bps: Bps,
}

/// Signed fee adjustment discouraging trades that grow the heavier side
///
/// Positive is a surcharge, negative a discount.
pub fn inventory_tilt(
    token: &TokenConfig,
    config: &InventoryConfig,
    reserves: &Reserves,
    mid: Wad,
    is_base_in: bool,
    ctx: TiltContext,
) -> PoolResult<i64> {
    let x_star = balanced_base(token, reserves, mid)?;
    if x_star == 0 || config.inv_tilt_bps_per_1pct == 0 {
        return Ok(0);
    }

    let dev_bps = mul_div(reserves.base.abs_diff(x_star), BPS, x_star, Rounding::Down)?;
    let raw = mul_div(dev_bps, config.inv_tilt_bps_per_1pct as u128, 100, Rounding::Down)?;

    let widen = BPS
        + mul_div(
            ctx.conf_bps as u128,
            config.tilt_conf_weight_bps as u128,
            BPS,
            Rounding::Down,
        )?
        + mul_div(
            ctx.spread_bps as u128,
            config.tilt_spread_weight_bps as u128,
            BPS,
            Rounding::Down,
        )?;
    let tilt = mul_div(raw, widen, BPS, Rounding::Down)?.min(config.inv_tilt_max_bps as u128);
    let tilt = tilt as i64;

    let base_heavy = reserves.base > x_star;
    Ok(if base_heavy == is_base_in { tilt } else { -tilt })
}

/// Fill constraints for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillLimits {
    pub target_base: Amount,
    pub floor_bps: Bps,
    /// Largest output notional in quote units (emergency quoting)
    pub max_quote_notional: Option<Amount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub amount_out: Amount,
    /// Input actually consumed (≤ requested)
    pub applied_in: Amount,
    pub partial: bool,
    /// `Floor` or `Aomq` when clamped
    pub reason: Option<ReasonCode>,
}

/// Reserve the pool keeps back on the output side
pub fn floor_amount(
    token: &TokenConfig,
    target_base: Amount,
    floor_bps: Bps,
    out_is_base: bool,
    mid: Wad,
) -> PoolResult<Amount> {
    if out_is_base {
        return Ok(apply_bps_up(target_base, floor_bps)?);
    }
    let target_value = token.base_to_quote(target_base, mid, Rounding::Down)?;
    Ok(apply_bps_up(target_value, floor_bps)?)
}

fn convert_out(
    token: &TokenConfig,
    amount: Amount,
    is_base_in: bool,
    mid: Wad,
    rounding: Rounding,
) -> PoolResult<Amount> {
    let converted = if is_base_in {
        token.base_to_quote(amount, mid, rounding)?
    } else {
        token.quote_to_base(amount, mid, rounding)?
    };
    Ok(converted)
}

/// Input needed (rounded up) to receive `amount_out`, never above `requested`
fn gross_up(
    token: &TokenConfig,
    amount_out: Amount,
    requested: Amount,
    is_base_in: bool,
    mid: Wad,
    fee_bps: Bps,
) -> PoolResult<Amount> {
    let net_in = if is_base_in {
        token.quote_to_base(amount_out, mid, Rounding::Up)?
    } else {
        token.base_to_quote(amount_out, mid, Rounding::Up)?
    };
    let gross = mul_div(net_in, BPS, BPS - fee_bps as u128, Rounding::Up)?;
    Ok(gross.min(requested))
}

/// Output and applied input for a trade against the reserves
pub fn compute_fill(
    token: &TokenConfig,
    reserves: &Reserves,
    limits: &FillLimits,
    amount_in: Amount,
    is_base_in: bool,
    mid: Wad,
    fee_bps: Bps,
) -> PoolResult<FillPlan> {
    let out_is_base = !is_base_in;
    let reserve_out = if out_is_base {
        reserves.base
    } else {
        reserves.quote
    };
    if reserve_out == 0 {
        return Err(PoolError::FloorBreach);
    }

    if fee_bps as u128 >= BPS {
        return Err(PoolError::FeeCapExceeded { fee_bps });
    }
    let after_fee = mul_div(amount_in, BPS - fee_bps as u128, BPS, Rounding::Down)?;
    let mut plan = FillPlan {
        amount_out: convert_out(token, after_fee, is_base_in, mid, Rounding::Down)?,
        applied_in: amount_in,
        partial: false,
        reason: None,
    };

    let floor = floor_amount(token, limits.target_base, limits.floor_bps, out_is_base, mid)?;
    let available = reserve_out.saturating_sub(floor);
    if available == 0 {
        return Err(PoolError::FloorBreach);
    }
    if plan.amount_out > available {
        debug!(
            "Fill clamped at floor: out={} available={} floor={}",
            plan.amount_out, available, floor
        );
        plan.amount_out = available;
        plan.applied_in = gross_up(token, available, amount_in, is_base_in, mid, fee_bps)?;
        plan.partial = true;
        plan.reason = Some(ReasonCode::Floor);
    }

    if let Some(max_notional) = limits.max_quote_notional.filter(|n| *n > 0) {
        let out_notional = if out_is_base {
            token.base_to_quote(plan.amount_out, mid, Rounding::Down)?
        } else {
            plan.amount_out
        };
        if out_notional > max_notional {
            let capped_out = if out_is_base {
                token.quote_to_base(max_notional, mid, Rounding::Down)?
            } else {
                max_notional
            };
            plan.amount_out = capped_out;
            plan.applied_in = gross_up(token, capped_out, amount_in, is_base_in, mid, fee_bps)?;
            plan.partial = true;
            plan.reason = Some(ReasonCode::Aomq);
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnmm_core::WAD;

    /// Same decimals on both sides keeps the arithmetic readable
    fn token() -> TokenConfig {
        TokenConfig::new(18, 18)
    }

    fn units(n: u128) -> Amount {
        n * WAD
    }

    fn limits(target: u128, floor_bps: Bps) -> FillLimits {
        FillLimits {
            target_base: units(target),
            floor_bps,
            max_quote_notional: None,
        }
    }

    #[test]
    fn test_calm_fill_charges_fee() {
        let reserves = Reserves::new(units(1_000), units(1_000));
        let plan = compute_fill(
            &token(),
            &reserves,
            &limits(1_000, 300),
            units(100),
            false,
            WAD,
            10,
        )
        .unwrap();

        assert_eq!(plan.amount_out, units(100) * 9_990 / 10_000);
        assert_eq!(plan.applied_in, units(100));
        assert!(!plan.partial);
        assert_eq!(plan.reason, None);
    }

    #[test]
    fn test_floor_clamps_to_partial() {
        let reserves = Reserves::new(units(150), units(50));
        let plan = compute_fill(
            &token(),
            &reserves,
            &limits(1_000, 1_000),
            units(100),
            false,
            WAD,
            10,
        )
        .unwrap();

        // Floor is 10% of a 1000 target: only 50 base above it
        assert_eq!(plan.amount_out, units(50));
        assert!(plan.partial);
        assert_eq!(plan.reason, Some(ReasonCode::Floor));
        assert!(plan.applied_in < units(100));
        // 50 / 0.999, rounded up
        assert_eq!(plan.applied_in, (units(50) * 10_000).div_ceil(9_990));
        assert!(reserves.base - plan.amount_out >= units(100));
    }

    #[test]
    fn test_empty_side_breaches() {
        let reserves = Reserves::new(0, units(1_000));
        let result = compute_fill(&token(), &reserves, &limits(1_000, 0), units(1), false, WAD, 10);
        assert_eq!(result, Err(PoolError::FloorBreach));
    }

    #[test]
    fn test_at_floor_breaches() {
        let reserves = Reserves::new(units(100), units(1_000));
        let result =
            compute_fill(&token(), &reserves, &limits(1_000, 1_000), units(1), false, WAD, 10);
        assert_eq!(result, Err(PoolError::FloorBreach));
    }

    #[test]
    fn test_quote_floor_valued_at_mid() {
        // Target 1000 base at mid 2.0 is worth 2000 quote; 10% floor = 200 quote
        let floor = floor_amount(&token(), units(1_000), 1_000, false, 2 * WAD).unwrap();
        assert_eq!(floor, units(200));
    }

    #[test]
    fn test_emergency_notional_cap() {
        let reserves = Reserves::new(units(1_000), units(1_000));
        let limits = FillLimits {
            max_quote_notional: Some(units(10)),
            ..limits(1_000, 0)
        };
        let plan = compute_fill(&token(), &reserves, &limits, units(100), true, WAD, 0).unwrap();

        assert_eq!(plan.amount_out, units(10));
        assert_eq!(plan.applied_in, units(10));
        assert_eq!(plan.reason, Some(ReasonCode::Aomq));
    }

    #[test]
    fn test_deviation_and_balance() {
        let token = token();
        let reserves = Reserves::new(units(1_500), units(500));

        assert_eq!(total_value(&token, &reserves, WAD).unwrap(), units(2_000));
        assert_eq!(balanced_base(&token, &reserves, WAD).unwrap(), units(1_000));
        // |1500 - 1000| / 2000
        assert_eq!(deviation_bps(&token, &reserves, units(1_000), WAD).unwrap(), 2_500);
    }

    #[test]
    fn test_tilt_sign_follows_heavy_side() {
        let token = token();
        let config = InventoryConfig {
            inv_tilt_bps_per_1pct: 2,
            inv_tilt_max_bps: 1_000,
            ..Default::default()
        };
        // x* = 1000; base 1100 -> 10% heavy -> 1000 bps dev -> 20 bps tilt
        let reserves = Reserves::new(units(1_100), units(900));
        let ctx = TiltContext::default();

        assert_eq!(inventory_tilt(&token, &config, &reserves, WAD, true, ctx).unwrap(), 20);
        assert_eq!(inventory_tilt(&token, &config, &reserves, WAD, false, ctx).unwrap(), -20);

        let light = Reserves::new(units(900), units(1_100));
        assert_eq!(inventory_tilt(&token, &config, &light, WAD, false, ctx).unwrap(), 20);
    }

    #[test]
    fn test_tilt_widened_and_capped() {
        let token = token();
        let config = InventoryConfig {
            inv_tilt_bps_per_1pct: 2,
            inv_tilt_max_bps: 25,
            tilt_conf_weight_bps: 10_000,
            tilt_spread_weight_bps: 0,
            ..Default::default()
        };
        let reserves = Reserves::new(units(1_100), units(900));
        let ctx = TiltContext {
            conf_bps: 1_000,
            spread_bps: 500,
        };
        // 20 * (10000 + 1000) / 10000 = 22
        assert_eq!(inventory_tilt(&token, &config, &reserves, WAD, true, ctx).unwrap(), 22);

        let ctx = TiltContext {
            conf_bps: 5_000,
            spread_bps: 0,
        };
        // 20 * 1.5 = 30, capped at 25
        assert_eq!(inventory_tilt(&token, &config, &reserves, WAD, true, ctx).unwrap(), 25);
    }
}
