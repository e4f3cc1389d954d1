//! DnmPool: the oracle-anchored market maker
//!
//! Every mutating call works on a copy of the params and state plus a local
//! event buffer, and writes both back only when the call succeeds.

use dnmm_core::math::{Rounding, mul_div, wad_to_decimal};
use dnmm_core::{
    ActorId, Amount, Asset, BPS, Bps, ConfigError, MathError, PoolParams, PoolState, Reserves, Wad,
};
use dnmm_ports::{Clock, OracleMode, PrimaryOracle, SecondaryOracle, TokenCustody};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{PoolError, PoolResult};
use crate::events::PoolEvent;
use crate::fee_policy::MAX_AGGREGATOR_DISCOUNT_BPS;
use crate::governor::{self, ParamKind, ParamUpdate};
use crate::guard::ReentrancyGuard;
use crate::model::{
    PoolId, QuoteRequest, QuoteResult, Roles, SwapOutcome, SwapRequest, TopOfBookQuote,
};
use crate::oracle_reader::{OracleRead, OracleReader};
use crate::pricing::{self, PricingContext, TradeIntent};
use crate::recenter::{self, RecenterOutcome};
use crate::settings::PoolSettings;

/// External collaborators the pool reads from and settles through
#[derive(Clone)]
pub struct PoolEnvironment {
    pub clock: Arc<dyn Clock>,
    pub primary: Arc<dyn PrimaryOracle>,
    pub secondary: Option<Arc<dyn SecondaryOracle>>,
    pub custody: Arc<dyn TokenCustody>,
}

impl PoolEnvironment {
    pub fn new(
        clock: Arc<dyn Clock>,
        primary: Arc<dyn PrimaryOracle>,
        custody: Arc<dyn TokenCustody>,
    ) -> Self {
        Self {
            clock,
            primary,
            secondary: None,
            custody,
        }
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn SecondaryOracle>) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

/// The part of the pool a call may roll back
#[derive(Debug, Clone, PartialEq, Eq)]
struct PoolCore {
    params: PoolParams,
    state: PoolState,
}

fn display_px(value: Wad) -> Decimal {
    wad_to_decimal(value).unwrap_or(Decimal::MAX)
}

pub struct DnmPool {
    id: PoolId,
    roles: Roles,
    core: PoolCore,
    env: PoolEnvironment,
    guard: ReentrancyGuard,
    events: Vec<PoolEvent>,
}

impl DnmPool {
    pub fn new(settings: PoolSettings, env: PoolEnvironment) -> PoolResult<Self> {
        settings.params.validate()?;
        let id = Uuid::new_v4();
        info!(
            "[POOL] Created pool {}: reserves base={} quote={}, clock={}",
            id,
            settings.initial_reserves.base,
            settings.initial_reserves.quote,
            env.clock.name()
        );

        Ok(Self {
            id,
            roles: settings.roles,
            core: PoolCore {
                params: settings.params,
                state: PoolState::new(settings.initial_reserves, settings.recenter_cooldown_sec),
            },
            env,
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        })
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn params(&self) -> &PoolParams {
        &self.core.params
    }

    pub fn state(&self) -> &PoolState {
        &self.core.state
    }

    pub fn reserves(&self) -> Reserves {
        self.core.state.reserves
    }

    pub fn is_paused(&self) -> bool {
        self.core.state.paused
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    fn context(&self) -> PricingContext {
        PricingContext {
            block: self.env.clock.block_number(),
            now: self.env.clock.unix_seconds(),
        }
    }

    fn read_oracle(&self, oracle_data: &[u8]) -> PoolResult<OracleRead> {
        OracleReader::new(
            &self.core.params.oracle,
            self.env.primary.as_ref(),
            self.env.secondary.as_deref(),
        )
        .read(oracle_data)
    }

    fn ensure_live(&self) -> PoolResult<()> {
        if self.core.state.paused {
            return Err(PoolError::Paused);
        }
        Ok(())
    }

    fn only_governance(&self, caller: &ActorId) -> PoolResult<()> {
        if *caller != self.roles.governance {
            warn!("[GOV] Rejected governance call from {}", caller);
            return Err(PoolError::NotGovernance(caller.clone()));
        }
        Ok(())
    }

    fn only_pauser(&self, caller: &ActorId) -> PoolResult<()> {
        if *caller != self.roles.pauser {
            return Err(PoolError::NotPauser(caller.clone()));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Pricing
    // ---------------------------------------------------------------------

    /// Price a swap without touching any state
    pub fn quote(&self, request: &QuoteRequest, oracle_data: &[u8]) -> PoolResult<QuoteResult> {
        self.ensure_live()?;
        if request.amount_in == 0 {
            return Err(PoolError::ZeroAmount);
        }
        let read = self.read_oracle(oracle_data)?;
        let priced = pricing::price(
            &self.core.params,
            &self.core.state,
            &read,
            request,
            self.context(),
        )?;
        Ok(priced.quote_result())
    }

    /// Fee the pool would charge for each size, in the current block
    pub fn preview_fees(&self, sizes: &[Amount], is_base_in: bool) -> PoolResult<Vec<Bps>> {
        let ctx = self.context();
        let params = &self.core.params;
        let state = &self.core.state;
        let read = self.read_oracle(&[])?;
        let assessment = pricing::assess(params, state, &read, OracleMode::Spot, ctx)?;

        sizes
            .iter()
            .map(|&amount_in| {
                let request = QuoteRequest::new(amount_in, is_base_in);
                match pricing::price(params, state, &read, &request, ctx) {
                    Ok(priced) => Ok(priced.fee.fee_bps),
                    // No room to fill: the fee is still defined
                    Err(PoolError::FloorBreach) => {
                        let trade = TradeIntent {
                            amount_in,
                            is_base_in,
                            executor: None,
                        };
                        let emergency = assessment.stressed(params);
                        Ok(pricing::fee_for(params, state, &assessment, &trade, emergency, ctx)?
                            .fee_bps)
                    }
                    Err(e) => Err(e),
                }
            })
            .collect()
    }

    /// Two-sided quote around the Spot mid for `notional` quote units
    ///
    /// A zero notional quotes the configured reference size.
    pub fn top_of_book_quote(&mut self, notional: Amount) -> PoolResult<TopOfBookQuote> {
        let _token = self.guard.enter()?;
        self.ensure_live()?;

        let ctx = self.context();
        let params = &self.core.params;
        let state = &self.core.state;
        let notional = if notional == 0 {
            params.maker.s0_notional
        } else {
            notional
        };

        let read = self.read_oracle(&[])?;
        let assessment = pricing::assess(params, state, &read, OracleMode::Spot, ctx)?;
        let emergency = assessment.stressed(params);
        let mid = assessment.outcome.mid;

        let sell_base = TradeIntent {
            amount_in: params.token.quote_to_base(notional, mid, Rounding::Down)?,
            is_base_in: true,
            executor: None,
        };
        let buy_base = TradeIntent {
            amount_in: notional,
            is_base_in: false,
            executor: None,
        };
        let bid_fee = pricing::fee_for(params, state, &assessment, &sell_base, emergency, ctx)?;
        let ask_fee = pricing::fee_for(params, state, &assessment, &buy_base, emergency, ctx)?;

        let quote = TopOfBookQuote {
            bid_px: mul_div(mid, BPS - bid_fee.fee_bps as u128, BPS, Rounding::Down)?,
            ask_px: mul_div(mid, BPS + ask_fee.fee_bps as u128, BPS, Rounding::Up)?,
            ttl_ms: params.maker.ttl_ms,
            quote_id: Uuid::new_v4(),
        };
        debug!(
            "[POOL] Quote {} mid={} bid={} ask={}",
            quote.quote_id,
            display_px(mid),
            display_px(quote.bid_px),
            display_px(quote.ask_px)
        );
        self.events.push(PoolEvent::QuoteServed {
            quote_id: quote.quote_id,
            bid_px: quote.bid_px,
            ask_px: quote.ask_px,
            ttl_ms: quote.ttl_ms,
            mid,
        });
        Ok(quote)
    }

    // ---------------------------------------------------------------------
    // Settlement
    // ---------------------------------------------------------------------

    /// Execute a swap for `trader`
    ///
    /// All-or-nothing: on any error reserves, fee decay, sigma, divergence
    /// and recenter state are exactly as before the call.
    pub fn swap(
        &mut self,
        trader: &ActorId,
        request: &SwapRequest,
        oracle_data: &[u8],
    ) -> PoolResult<SwapOutcome> {
        let _token = self.guard.enter()?;
        self.ensure_live()?;

        let ctx = self.context();
        if ctx.now > request.deadline {
            return Err(PoolError::DeadlineExpired {
                deadline: request.deadline,
                now: ctx.now,
            });
        }
        if request.amount_in == 0 {
            return Err(PoolError::ZeroAmount);
        }

        let read = self.read_oracle(oracle_data)?;
        let quote_request = request.as_quote();
        let preview = pricing::price(
            &self.core.params,
            &self.core.state,
            &read,
            &quote_request,
            ctx,
        )?;

        let mut working = self.core.clone();
        let mut events = Vec::new();
        let priced = pricing::price(&working.params, &working.state, &read, &quote_request, ctx)?;
        if priced.fee.fee_bps != preview.fee.fee_bps {
            error!(
                "[FEE] Preview {}bps != commit {}bps",
                preview.fee.fee_bps, priced.fee.fee_bps
            );
            return Err(PoolError::FeePreviewInvariant {
                preview_bps: preview.fee.fee_bps,
                commit_bps: priced.fee.fee_bps,
            });
        }

        let fill = priced.fill;
        if fill.amount_out < request.min_amount_out {
            return Err(PoolError::Slippage {
                amount_out: fill.amount_out,
                min_amount_out: request.min_amount_out,
            });
        }

        priced.commit_to(&mut working.state);
        let outcome = &priced.assessment.outcome;
        if let Some(delta_bps) = outcome.divergence_bps {
            let guard = priced.assessment.divergence.next_state;
            events.push(PoolEvent::DivergenceChecked {
                delta_bps,
                active: guard.active,
                healthy_streak: guard.healthy_streak,
            });
        }
        if priced.assessment.divergence.soft {
            events.push(PoolEvent::DivergenceHaircut {
                delta_bps: outcome.divergence_bps.unwrap_or_default(),
                haircut_bps: outcome.haircut_bps,
            });
        }
        if working.params.features.debug_emit {
            let terms = priced.assessment.confidence.terms;
            events.push(PoolEvent::ConfidenceDebug {
                conf_spread_bps: terms.spread_bps,
                conf_sigma_bps: terms.sigma_bps,
                conf_secondary_bps: terms.secondary_bps,
                conf_bps: outcome.conf_bps,
                sigma_bps: outcome.sigma_bps,
                fee_bps: priced.fee.fee_bps,
            });
        }

        let reserves = &mut working.state.reserves;
        let (asset_in, asset_out) = if request.is_base_in {
            reserves.base = reserves
                .base
                .checked_add(fill.applied_in)
                .ok_or(MathError::Overflow)?;
            reserves.quote = reserves
                .quote
                .checked_sub(fill.amount_out)
                .ok_or(MathError::Underflow)?;
            (Asset::Base, Asset::Quote)
        } else {
            reserves.quote = reserves
                .quote
                .checked_add(fill.applied_in)
                .ok_or(MathError::Overflow)?;
            reserves.base = reserves
                .base
                .checked_sub(fill.amount_out)
                .ok_or(MathError::Underflow)?;
            (Asset::Quote, Asset::Base)
        };

        if working.params.features.enable_auto_recenter {
            let recentered = recenter::auto_check(
                &working.params.token,
                &working.params.inventory,
                &working.state.recenter,
                &working.state.reserves,
                outcome.mid,
                ctx.now,
            )?;
            apply_recenter(&mut working, recentered, outcome.mid, true, &mut events);
        }

        let custody = &self.env.custody;
        let received = custody.pull(asset_in, trader, fill.applied_in)?;
        if received != fill.applied_in {
            warn!(
                "[POOL] {:?} delivered {} of {}, refunding",
                asset_in, received, fill.applied_in
            );
            custody.push(asset_in, trader, received)?;
            return Err(PoolError::TokenFeeUnsupported {
                expected: fill.applied_in,
                received,
            });
        }
        if let Err(e) = custody.push(asset_out, trader, fill.amount_out) {
            if let Err(refund) = custody.push(asset_in, trader, received) {
                error!("[POOL] Refund to {} failed: {}", trader, refund);
            }
            return Err(e.into());
        }

        events.push(PoolEvent::SwapExecuted {
            trader: trader.clone(),
            is_base_in: request.is_base_in,
            amount_in: fill.applied_in,
            amount_out: fill.amount_out,
            mid: outcome.mid,
            fee_bps: priced.fee.fee_bps,
            partial: fill.partial,
            reason: priced.quote_result().reason,
        });
        info!(
            "[POOL] Swap {}: in={} {:?} out={} mid={} fee={}bps partial={}",
            trader,
            fill.applied_in,
            asset_in,
            fill.amount_out,
            display_px(outcome.mid),
            priced.fee.fee_bps,
            fill.partial
        );

        self.core = working;
        self.events.extend(events);
        Ok(SwapOutcome {
            amount_in: fill.applied_in,
            amount_out: fill.amount_out,
            mid_used: outcome.mid,
            fee_bps_used: priced.fee.fee_bps,
            partial: fill.partial,
            reason: priced.quote_result().reason,
        })
    }

    /// Reconcile the reserve counters with actual custody balances
    pub fn sync(&mut self) -> PoolResult<Reserves> {
        let _token = self.guard.enter()?;
        let reserves = Reserves::new(
            self.env.custody.balance(Asset::Base),
            self.env.custody.balance(Asset::Quote),
        );
        info!(
            "[POOL] Sync: base {} -> {}, quote {} -> {}",
            self.core.state.reserves.base,
            reserves.base,
            self.core.state.reserves.quote,
            reserves.quote
        );
        self.core.state.reserves = reserves;
        self.events.push(PoolEvent::ReservesSynced {
            base: reserves.base,
            quote: reserves.quote,
        });
        Ok(reserves)
    }

    // ---------------------------------------------------------------------
    // Recentering
    // ---------------------------------------------------------------------

    /// Permissionless recenter of the inventory target at the Spot mid
    ///
    /// Returns the new target when one was committed.
    pub fn rebalance_target(&mut self) -> PoolResult<Option<Amount>> {
        let _token = self.guard.enter()?;
        let ctx = self.context();
        let read = self.read_oracle(&[])?;
        if !read.is_primary() {
            return Err(PoolError::OracleStale);
        }

        let outcome = recenter::manual(
            &self.core.params.token,
            &self.core.params.inventory,
            &self.core.state.recenter,
            &self.core.state.reserves,
            read.mid,
            ctx.now,
        )?;
        let new_target = outcome.new_target;
        apply_recenter(&mut self.core, outcome, read.mid, false, &mut self.events);
        Ok(new_target)
    }

    pub fn set_target(&mut self, caller: &ActorId, new_target: Amount) -> PoolResult<()> {
        self.only_governance(caller)?;
        let _token = self.guard.enter()?;
        let old_target = self.core.params.inventory.target_base_xstar;
        self.core.params.inventory.target_base_xstar = new_target;
        info!("[RECENTER] Target set {} -> {} by {}", old_target, new_target, caller);
        self.events.push(PoolEvent::TargetBaseXstarUpdated {
            old_target,
            new_target,
            mid: None,
            auto: false,
        });
        Ok(())
    }

    pub fn set_recenter_cooldown(&mut self, caller: &ActorId, cooldown_sec: u64) -> PoolResult<()> {
        self.only_governance(caller)?;
        let _token = self.guard.enter()?;
        let old_sec = self.core.state.recenter.cooldown_sec;
        self.core.state.recenter.cooldown_sec = cooldown_sec;
        self.events.push(PoolEvent::RecenterCooldownSet {
            old_sec,
            new_sec: cooldown_sec,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Governance
    // ---------------------------------------------------------------------

    /// Replace one configuration struct from its JSON encoding
    pub fn update_params(
        &mut self,
        caller: &ActorId,
        kind: ParamKind,
        payload: &str,
    ) -> PoolResult<()> {
        self.only_governance(caller)?;
        let update = ParamUpdate::decode(kind, payload)?;
        self.apply(caller, update)
    }

    /// Replace one configuration struct
    ///
    /// The candidate parameters are validated as a whole; on failure the
    /// current configuration stays in force.
    pub fn apply(&mut self, caller: &ActorId, update: ParamUpdate) -> PoolResult<()> {
        self.only_governance(caller)?;
        let _token = self.guard.enter()?;

        let (params, change) = governor::stage(&self.core.params, &update).inspect_err(|e| {
            warn!("[GOV] Rejected {:?} update: {}", update.kind(), e);
        })?;
        info!("[GOV] {:?} updated: {} -> {}", change.kind, change.old, change.new);

        self.core.params = params;
        self.events.push(PoolEvent::ParamsUpdated {
            kind: change.kind,
            old: change.old,
            new: change.new,
        });
        Ok(())
    }

    /// Grant (or with 0, revoke) a rebate for an executor
    pub fn set_aggregator_discount(
        &mut self,
        caller: &ActorId,
        executor: &ActorId,
        discount_bps: Bps,
    ) -> PoolResult<()> {
        self.only_governance(caller)?;
        if discount_bps > MAX_AGGREGATOR_DISCOUNT_BPS {
            return Err(ConfigError::OutOfRange {
                field: "aggregator_discount_bps",
                value: discount_bps as u128,
                max: MAX_AGGREGATOR_DISCOUNT_BPS as u128,
            }
            .into());
        }
        let _token = self.guard.enter()?;

        let discounts = &mut self.core.state.aggregator_discounts;
        if discount_bps == 0 {
            discounts.remove(executor);
        } else {
            discounts.insert(executor.clone(), discount_bps);
        }
        self.events.push(PoolEvent::AggregatorDiscountSet {
            executor: executor.clone(),
            discount_bps,
        });
        Ok(())
    }

    pub fn pause(&mut self, caller: &ActorId) -> PoolResult<()> {
        self.only_pauser(caller)?;
        self.core.state.paused = true;
        info!("[POOL] Paused by {}", caller);
        self.events.push(PoolEvent::Paused { by: caller.clone() });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &ActorId) -> PoolResult<()> {
        self.only_pauser(caller)?;
        self.core.state.paused = false;
        info!("[POOL] Unpaused by {}", caller);
        self.events.push(PoolEvent::Unpaused { by: caller.clone() });
        Ok(())
    }
}

fn apply_recenter(
    core: &mut PoolCore,
    outcome: RecenterOutcome,
    mid: Wad,
    auto: bool,
    events: &mut Vec<PoolEvent>,
) {
    core.state.recenter = outcome.next_state;
    let Some(new_target) = outcome.new_target else {
        return;
    };

    let old_target = core.params.inventory.target_base_xstar;
    core.params.inventory.target_base_xstar = new_target;
    info!(
        "[RECENTER] {} recenter at {}: target {} -> {}",
        if auto { "Auto" } else { "Manual" },
        display_px(mid),
        old_target,
        new_target
    );
    events.push(PoolEvent::TargetBaseXstarUpdated {
        old_target,
        new_target,
        mid: Some(mid),
        auto,
    });
}
