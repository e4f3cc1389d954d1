//! Per-request pricing pipeline
//!
//! oracle read -> confidence (+ divergence) -> fee -> fill. Every function
//! here reads committed state and returns the state a settlement would
//! write, so the preview and commit paths share one computation.

use dnmm_core::math::Rounding;
use dnmm_core::{ActorId, Amount, BlockNumber, Bps, PoolParams, PoolState, UnixSeconds, Wad};
use dnmm_ports::OracleMode;
use log::debug;

use crate::confidence::{self, ConfidenceEstimate, ConfidenceInput};
use crate::divergence::{self, DivergenceCheck};
use crate::error::{PoolError, PoolResult};
use crate::fee_policy::{self, FeeBreakdown, FeeInputs};
use crate::inventory::{self, FillLimits, FillPlan, TiltContext};
use crate::model::{QuoteRequest, QuoteResult, ReasonCode};
use crate::oracle_reader::OracleRead;

/// Block and time the request is evaluated at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingContext {
    pub block: BlockNumber,
    pub now: UnixSeconds,
}

/// Everything known about the oracle for one request
///
/// Recomputed from scratch on every call and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleOutcome {
    pub mid: Wad,
    pub conf_bps: Bps,
    pub spread_bps: Bps,
    pub age_sec: u64,
    pub sigma_bps: Bps,
    pub divergence_bps: Option<Bps>,
    pub haircut_bps: Bps,
    pub used_fallback: bool,
    pub reason: ReasonCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub outcome: OracleOutcome,
    pub confidence: ConfidenceEstimate,
    pub divergence: DivergenceCheck,
}

impl Assessment {
    /// Oracle stress that puts emergency quoting in force
    pub fn stressed(&self, params: &PoolParams) -> bool {
        params.features.enable_aomq
            && (self.divergence.next_state.active || self.outcome.used_fallback)
    }
}

pub fn assess(
    params: &PoolParams,
    state: &PoolState,
    read: &OracleRead,
    mode: OracleMode,
    ctx: PricingContext,
) -> PoolResult<Assessment> {
    let confidence = confidence::estimate(
        &params.oracle,
        &params.features,
        &state.confidence,
        &ConfidenceInput {
            block: ctx.block,
            mode,
            spread_bps: read.spread_bps,
            mid: read.mid,
            secondary_conf: read.secondary.map(|s| s.conf_bps),
        },
    )?;

    let secondary_mid = if read.is_primary() {
        read.secondary.map(|s| s.mid)
    } else {
        None
    };
    let divergence = divergence::evaluate(
        &params.oracle,
        params.features.enable_soft_divergence,
        &state.divergence,
        read.mid,
        secondary_mid,
        ctx.now,
    )?;

    Ok(Assessment {
        outcome: OracleOutcome {
            mid: read.mid,
            conf_bps: confidence.conf_bps,
            spread_bps: read.spread_bps,
            age_sec: read.age_sec,
            sigma_bps: confidence.next_state.sigma_bps,
            divergence_bps: divergence.delta_bps,
            haircut_bps: divergence.haircut_bps,
            used_fallback: read.used_fallback,
            reason: read.reason,
        },
        confidence,
        divergence,
    })
}

/// Side and size of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeIntent<'a> {
    pub amount_in: Amount,
    pub is_base_in: bool,
    pub executor: Option<&'a ActorId>,
}

pub fn fee_for(
    params: &PoolParams,
    state: &PoolState,
    assessment: &Assessment,
    trade: &TradeIntent<'_>,
    emergency: bool,
    ctx: PricingContext,
) -> PoolResult<FeeBreakdown> {
    let outcome = &assessment.outcome;
    let mid = outcome.mid;
    let token = &params.token;
    let reserves = &state.reserves;

    let notional = if trade.is_base_in {
        token.base_to_quote(trade.amount_in, mid, Rounding::Down)?
    } else {
        trade.amount_in
    };
    let inventory_dev_bps =
        inventory::deviation_bps(token, reserves, params.inventory.target_base_xstar, mid)?;
    let tilt_bps = if params.features.enable_inv_tilt {
        inventory::inventory_tilt(
            token,
            &params.inventory,
            reserves,
            mid,
            trade.is_base_in,
            TiltContext {
                conf_bps: outcome.conf_bps,
                spread_bps: outcome.spread_bps,
            },
        )?
    } else {
        0
    };

    fee_policy::compose(
        params,
        &state.fee,
        &FeeInputs {
            block: ctx.block,
            conf_bps: outcome.conf_bps,
            inventory_dev_bps,
            spread_bps: outcome.spread_bps,
            notional,
            tilt_bps,
            haircut_bps: outcome.haircut_bps,
            discount_bps: state.aggregator_discount(trade.executor),
            emergency,
        },
    )
}

fn fill_limits(params: &PoolParams, emergency: bool) -> FillLimits {
    let epsilon = if emergency {
        params.aomq.floor_epsilon_bps
    } else {
        0
    };
    FillLimits {
        target_base: params.inventory.target_base_xstar,
        floor_bps: params.inventory.floor_bps + epsilon,
        max_quote_notional: emergency.then_some(params.aomq.min_quote_notional),
    }
}

/// Fully priced request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priced {
    pub assessment: Assessment,
    pub fee: FeeBreakdown,
    pub fill: FillPlan,
    pub emergency: bool,
}

impl Priced {
    pub fn quote_result(&self) -> QuoteResult {
        let outcome = &self.assessment.outcome;
        QuoteResult {
            amount_out: self.fill.amount_out,
            mid_used: outcome.mid,
            fee_bps_used: self.fee.fee_bps,
            partial_fill_amount_in: if self.fill.partial {
                self.fill.applied_in
            } else {
                0
            },
            used_fallback: outcome.used_fallback,
            reason: self.fill.reason.unwrap_or(outcome.reason),
        }
    }

    /// Write the per-request state this pricing produced
    pub fn commit_to(&self, state: &mut PoolState) {
        state.confidence = self.assessment.confidence.next_state;
        state.divergence = self.assessment.divergence.next_state;
        state.fee = self.fee.next_state;
    }
}

pub fn price(
    params: &PoolParams,
    state: &PoolState,
    read: &OracleRead,
    request: &QuoteRequest,
    ctx: PricingContext,
) -> PoolResult<Priced> {
    let assessment = assess(params, state, read, request.mode, ctx)?;
    let trade = TradeIntent {
        amount_in: request.amount_in,
        is_base_in: request.is_base_in,
        executor: request.executor.as_ref(),
    };
    let mid = assessment.outcome.mid;

    let mut emergency = assessment.stressed(params);
    let mut fee = fee_for(params, state, &assessment, &trade, emergency, ctx)?;
    let mut fill = inventory::compute_fill(
        &params.token,
        &state.reserves,
        &fill_limits(params, emergency),
        trade.amount_in,
        trade.is_base_in,
        mid,
        fee.fee_bps,
    )?;

    // A floor clamp is itself an emergency, unless the epsilon buffer leaves
    // nothing to fill where the plain floor still allows a partial trade
    if !emergency && params.features.enable_aomq && fill.partial {
        let emergency_fee = fee_for(params, state, &assessment, &trade, true, ctx)?;
        let emergency_fill = inventory::compute_fill(
            &params.token,
            &state.reserves,
            &fill_limits(params, true),
            trade.amount_in,
            trade.is_base_in,
            mid,
            emergency_fee.fee_bps,
        );
        match emergency_fill {
            Ok(plan) => {
                emergency = true;
                fee = emergency_fee;
                fill = plan;
            }
            Err(PoolError::FloorBreach) => {
                debug!("[POOL] Emergency floor buffer exhausted, keeping the plain partial fill");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Priced {
        assessment,
        fee,
        fill,
        emergency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnmm_core::{Reserves, TokenConfig, WAD};
    use dnmm_ports::SecondaryReading;

    fn params() -> PoolParams {
        let mut params = PoolParams::default();
        params.token = TokenConfig::new(18, 18);
        params.inventory.target_base_xstar = 1_000 * WAD;
        params.inventory.floor_bps = 1_000;
        params.fee.base_bps = 10;
        params
    }

    fn state() -> PoolState {
        PoolState::new(Reserves::new(1_000 * WAD, 1_000 * WAD), 0)
    }

    fn read(secondary: Option<SecondaryReading>) -> OracleRead {
        OracleRead {
            mid: WAD,
            age_sec: 0,
            spread_bps: 0,
            reason: ReasonCode::None,
            used_fallback: false,
            secondary,
        }
    }

    const CTX: PricingContext = PricingContext { block: 1, now: 100 };

    #[test]
    fn test_calm_quote() {
        let request = QuoteRequest::new(100 * WAD, false);
        let priced = price(&params(), &state(), &read(None), &request, CTX).unwrap();
        let result = priced.quote_result();

        assert_eq!(result.fee_bps_used, 10);
        assert_eq!(result.amount_out, 100 * WAD * 9_990 / 10_000);
        assert_eq!(result.partial_fill_amount_in, 0);
        assert_eq!(result.reason, ReasonCode::None);
        assert!(!priced.emergency);
    }

    #[test]
    fn test_soft_divergence_adds_haircut() {
        let mut params = params();
        params.features.enable_soft_divergence = true;
        params.oracle.divergence_accept_bps = 10;
        params.oracle.divergence_soft_bps = 30;
        params.oracle.divergence_hard_bps = 50;
        params.oracle.haircut_min_bps = 5;
        params.oracle.haircut_slope_bps = 2;

        let secondary = SecondaryReading {
            mid: WAD + WAD * 25 / 10_000,
            age_sec: 0,
            conf_bps: 0,
        };
        let request = QuoteRequest::new(WAD, true);
        let priced = price(&params, &state(), &read(Some(secondary)), &request, CTX).unwrap();

        assert_eq!(priced.assessment.outcome.haircut_bps, 35);
        assert_eq!(priced.fee.fee_bps, 45);
        assert!(priced.assessment.divergence.next_state.active);
    }

    #[test]
    fn test_floor_clamp_triggers_emergency() {
        let mut params = params();
        params.features.enable_aomq = true;
        params.aomq.emergency_spread_bps = 50;
        // Keep the inventory term out of the way
        params.fee.beta_inv_dev_numerator = 0;
        let mut state = state();
        state.reserves = Reserves::new(150 * WAD, 50 * WAD);

        let priced = price(&params, &state, &read(None), &QuoteRequest::new(100 * WAD, false), CTX)
            .unwrap();

        assert!(priced.emergency);
        assert_eq!(priced.fee.fee_bps, 50);
        assert_eq!(priced.fill.amount_out, 50 * WAD);
        assert_eq!(priced.quote_result().reason, ReasonCode::Floor);
    }

    #[test]
    fn test_floor_clamp_within_epsilon_keeps_partial_fill() {
        let mut params = params();
        params.features.enable_aomq = true;
        params.aomq.floor_epsilon_bps = 100;
        let mut state = state();
        // 5 base of headroom above the 100 floor, less than the 1% epsilon
        state.reserves = Reserves::new(105 * WAD, 1_000 * WAD);
        let request = QuoteRequest::new(100 * WAD, false);

        let plain = {
            let mut params = params.clone();
            params.features.enable_aomq = false;
            price(&params, &state, &read(None), &request, CTX).unwrap()
        };
        let priced = price(&params, &state, &read(None), &request, CTX).unwrap();

        assert!(!priced.emergency);
        assert_eq!(priced.fill.amount_out, 5 * WAD);
        assert_eq!(priced.fill, plain.fill);
        assert_eq!(priced.quote_result().reason, ReasonCode::Floor);
    }

    #[test]
    fn test_commit_writes_next_state() {
        let params = params();
        let mut state = state();
        let request = QuoteRequest::new(WAD, true);
        let priced = price(&params, &state, &read(None), &request, CTX).unwrap();
        priced.commit_to(&mut state);

        assert_eq!(state.confidence.last_block, 1);
        assert_eq!(state.confidence.last_mid, WAD);
        assert_eq!(state.fee.last_block, Some(1));
        assert_eq!(state.fee.last_fee_bps, 10);
    }
}
