//! Confidence estimation
//!
//! Blends the book spread, realised volatility (EWMA sigma) and the
//! secondary feed's confidence into one capped score. Everything here is a
//! pure function of config, state and inputs; the caller decides whether the
//! returned state is committed.

use dnmm_core::math::{Rounding, drift_bps, mul_div};
use dnmm_core::{BPS, BlockNumber, Bps, ConfidenceState, FeatureFlags, OracleConfig, Wad};
use dnmm_ports::OracleMode;

use crate::error::PoolResult;

/// Weighted terms feeding the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceTerms {
    pub spread_bps: Bps,
    pub sigma_bps: Bps,
    pub secondary_bps: Bps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceEstimate {
    pub conf_bps: Bps,
    pub cap_bps: Bps,
    pub terms: ConfidenceTerms,
    /// State to commit if the request settles
    pub next_state: ConfidenceState,
}

/// Advance the EWMA sigma for `block`
///
/// At most one update per block: a second call in the same block returns the
/// state unchanged.
pub fn next_sigma(
    config: &OracleConfig,
    state: &ConfidenceState,
    block: BlockNumber,
    spread_bps: Bps,
    mid: Wad,
) -> PoolResult<ConfidenceState> {
    if state.last_mid != 0 && state.last_block == block {
        return Ok(*state);
    }

    let cap = config.conf_cap_bps_spot;
    let drift = if state.last_mid == 0 {
        0
    } else {
        drift_bps(mid, state.last_mid)?
    };
    let sample = spread_bps.max(drift).min(cap);

    let lambda = config.sigma_ewma_lambda_bps;
    let sigma = if state.last_mid == 0 {
        sample
    } else if lambda as u128 >= BPS {
        state.sigma_bps
    } else {
        let weighted = state.sigma_bps as u128 * lambda as u128
            + sample as u128 * (BPS - lambda as u128);
        (weighted / BPS) as Bps
    };

    Ok(ConfidenceState {
        last_block: block,
        sigma_bps: sigma.min(cap),
        last_mid: mid,
    })
}

/// Cap for the request
///
/// The strict cap applies in Strict mode, and also in Spot mode whenever the
/// secondary feed contributes a non-zero confidence.
pub fn mode_cap(config: &OracleConfig, mode: OracleMode, secondary_conf: Option<Bps>) -> Bps {
    let secondary_contributes = secondary_conf.is_some_and(|c| c > 0);
    if mode == OracleMode::Strict || secondary_contributes {
        config.conf_cap_bps_strict
    } else {
        config.conf_cap_bps_spot
    }
}

fn weighted(term: Bps, cap: Bps, weight_bps: u32) -> PoolResult<Bps> {
    Ok(mul_div(term.min(cap) as u128, weight_bps as u128, BPS, Rounding::Down)? as Bps)
}

/// Observation the score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceInput {
    pub block: BlockNumber,
    pub mode: OracleMode,
    pub spread_bps: Bps,
    pub mid: Wad,
    /// Confidence of a fresh secondary reading
    pub secondary_conf: Option<Bps>,
}

pub fn estimate(
    config: &OracleConfig,
    flags: &FeatureFlags,
    state: &ConfidenceState,
    input: &ConfidenceInput,
) -> PoolResult<ConfidenceEstimate> {
    let spread_bps = input.spread_bps;
    let next_state = next_sigma(config, state, input.block, spread_bps, input.mid)?;
    let cap = mode_cap(config, input.mode, input.secondary_conf);
    let secondary_bps = input.secondary_conf.unwrap_or(0);

    let (conf_bps, terms) = if flags.blend_on {
        let terms = ConfidenceTerms {
            spread_bps: weighted(spread_bps, cap, config.conf_weight_spread_bps)?,
            sigma_bps: weighted(next_state.sigma_bps, cap, config.conf_weight_sigma_bps)?,
            secondary_bps: weighted(secondary_bps, cap, config.conf_weight_secondary_bps)?,
        };
        let conf = terms
            .spread_bps
            .max(terms.sigma_bps)
            .max(terms.secondary_bps);
        (conf.min(cap), terms)
    } else {
        let terms = ConfidenceTerms {
            spread_bps,
            sigma_bps: next_state.sigma_bps,
            secondary_bps,
        };
        (spread_bps.max(secondary_bps).min(cap), terms)
    };

    Ok(ConfidenceEstimate {
        conf_bps,
        cap_bps: cap,
        terms,
        next_state,
    })
}
