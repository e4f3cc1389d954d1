//! Fee composition
//!
//! Applied left to right, each step clamped to the configured cap:
//! decayed base (confidence + inventory terms), size fee, inventory tilt,
//! divergence haircut, aggregator rebate, emergency spread, BBO floor.

use dnmm_core::math::{Rounding, mul_div};
use dnmm_core::{
    Amount, BPS, BlockNumber, Bps, FeeConfig, FeeState, MakerConfig, PoolParams, WAD,
};

use crate::error::{PoolError, PoolResult};

/// Largest rebate an executor can be granted
pub const MAX_AGGREGATOR_DISCOUNT_BPS: Bps = 50;

/// Undecayed fee for the current conditions
pub fn target_fee(config: &FeeConfig, conf_bps: Bps, inventory_dev_bps: Bps) -> PoolResult<Bps> {
    let conf_term = mul_div(
        conf_bps as u128,
        config.alpha_conf_numerator as u128,
        config.alpha_conf_denominator as u128,
        Rounding::Down,
    )?;
    let inv_term = mul_div(
        inventory_dev_bps as u128,
        config.beta_inv_dev_numerator as u128,
        config.beta_inv_dev_denominator as u128,
        Rounding::Down,
    )?;
    let fee = config.base_bps as u128 + conf_term + inv_term;
    Ok(fee.min(config.cap_bps as u128) as Bps)
}

/// Decay a previous fee toward `target`
///
/// Within one block the fee never drops below what was already charged;
/// across blocks the excess over target shrinks by `decay_pct_per_block` per
/// block elapsed.
pub fn decayed_fee(
    config: &FeeConfig,
    state: &FeeState,
    target: Bps,
    block: BlockNumber,
) -> Bps {
    let decay = config.decay_pct_per_block;
    let Some(last_block) = state.last_block.filter(|_| decay > 0) else {
        return target;
    };
    if block <= last_block {
        return target.max(state.last_fee_bps);
    }
    if state.last_fee_bps <= target {
        return target;
    }

    let keep = 100u64.saturating_sub(decay as u64);
    let mut excess = (state.last_fee_bps - target) as u64;
    let mut elapsed = block - last_block;
    while elapsed > 0 && excess > 0 {
        excess = excess * keep / 100;
        elapsed -= 1;
    }
    target + excess as Bps
}

/// Size-dependent surcharge for a trade of `notional` quote units
pub fn size_fee(config: &FeeConfig, maker: &MakerConfig, notional: Amount) -> PoolResult<Bps> {
    if maker.s0_notional == 0 || config.size_fee_cap_bps == 0 {
        return Ok(0);
    }
    let u = mul_div(notional, WAD, maker.s0_notional, Rounding::Down)?;
    let linear = mul_div(config.gamma_size_lin_bps as u128, u, WAD, Rounding::Down)?;
    let u_squared = mul_div(u, u, WAD, Rounding::Down)?;
    let quadratic = mul_div(config.gamma_size_quad_bps as u128, u_squared, WAD, Rounding::Down)?;
    let fee = linear.saturating_add(quadratic);
    Ok(fee.min(config.size_fee_cap_bps as u128) as Bps)
}

/// Per-request inputs to the fee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeInputs {
    pub block: BlockNumber,
    pub conf_bps: Bps,
    pub inventory_dev_bps: Bps,
    pub spread_bps: Bps,
    /// Trade notional in quote units
    pub notional: Amount,
    pub tilt_bps: i64,
    pub haircut_bps: Bps,
    pub discount_bps: Bps,
    pub emergency: bool,
}

/// Every step of the composition, for logging and debug events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub target_bps: Bps,
    pub decayed_bps: Bps,
    pub size_bps: Bps,
    pub tilt_bps: i64,
    pub haircut_bps: Bps,
    pub fee_bps: Bps,
    /// Decay state to commit if the request settles
    pub next_state: FeeState,
}

pub fn compose(
    params: &PoolParams,
    state: &FeeState,
    inputs: &FeeInputs,
) -> PoolResult<FeeBreakdown> {
    let config = &params.fee;
    let flags = &params.features;
    let cap = config.cap_bps;
    let clamp = |fee: u64| fee.min(cap as u64) as Bps;

    let target = target_fee(config, inputs.conf_bps, inputs.inventory_dev_bps)?;
    let decayed = decayed_fee(config, state, target, inputs.block).min(cap);
    let mut fee = decayed;

    let size_bps = if flags.enable_size_fee {
        size_fee(config, &params.maker, inputs.notional)?
    } else {
        0
    };
    fee = clamp(fee as u64 + size_bps as u64);

    let tilt_bps = if flags.enable_inv_tilt { inputs.tilt_bps } else { 0 };
    fee = clamp((fee as i64 + tilt_bps).max(0) as u64);

    fee = clamp(fee as u64 + inputs.haircut_bps as u64);

    if flags.enable_rebates {
        fee = fee.saturating_sub(inputs.discount_bps.min(MAX_AGGREGATOR_DISCOUNT_BPS));
    }

    if flags.enable_aomq && inputs.emergency {
        fee = clamp(fee.max(params.aomq.emergency_spread_bps) as u64);
    }

    if flags.enable_bbo_floor {
        let bbo = mul_div(
            params.maker.alpha_bbo_bps as u128,
            inputs.spread_bps as u128,
            BPS,
            Rounding::Down,
        )? as Bps;
        let floor = bbo.max(params.maker.beta_floor_bps);
        fee = clamp(fee.max(floor) as u64);
    }

    if fee as u128 >= BPS {
        return Err(PoolError::FeeCapExceeded { fee_bps: fee });
    }

    Ok(FeeBreakdown {
        target_bps: target,
        decayed_bps: decayed,
        size_bps,
        tilt_bps,
        haircut_bps: inputs.haircut_bps,
        fee_bps: fee,
        next_state: FeeState {
            last_block: Some(inputs.block),
            last_fee_bps: decayed,
        },
    })
}
