//! Property tests for the pricing invariants
//!
//! - Fee never exceeds the cap and the cap stays below 100%
//! - A quote and the swap that follows it agree exactly
//! - Partial fills never consume more than requested nor dip under the floor
//! - Haircuts grow with divergence and flatten past the soft tier
//! - A failed swap leaves no trace

use dnmm_clock::ManualClock;
use dnmm_core::{
    ActorId, Asset, BPS, FeeState, OracleConfig, PoolParams, Reserves, TokenConfig, WAD,
};
use dnmm_memory::{InMemoryCustody, InMemoryPrimaryOracle};
use dnmm_pool::divergence::haircut_bps;
use dnmm_pool::fee_policy::{FeeInputs, compose};
use dnmm_pool::inventory::{FillLimits, compute_fill, floor_amount};
use dnmm_pool::{
    DnmPool, PoolEnvironment, PoolError, PoolSettings, QuoteRequest, Roles, SwapRequest,
};
use proptest::prelude::*;
use std::sync::Arc;

const START_TIME: u64 = 1_700_000_000;

fn params_with(target_base: u128, floor_bps: u32) -> PoolParams {
    let mut params = PoolParams::default();
    params.token = TokenConfig::new(18, 18);
    params.inventory.target_base_xstar = target_base;
    params.inventory.floor_bps = floor_bps;
    params
}

fn pool_with(reserves: Reserves, spread_bps: u32) -> (DnmPool, ActorId) {
    let clock = ManualClock::starting_at(START_TIME, 10);
    let primary = InMemoryPrimaryOracle::with_mid(WAD, spread_bps);
    let custody = InMemoryCustody::new();
    let trader = ActorId::from("trader");
    custody.fund_pool(Asset::Base, reserves.base);
    custody.fund_pool(Asset::Quote, reserves.quote);
    custody.mint(&trader, Asset::Base, u128::MAX / 4);
    custody.mint(&trader, Asset::Quote, u128::MAX / 4);

    let env = PoolEnvironment::new(Arc::new(clock), Arc::new(primary), Arc::new(custody));
    let settings = PoolSettings::new(params_with(1_000 * WAD, 1_000), Roles::default(), reserves);
    let pool = DnmPool::new(settings, env).unwrap();
    (pool, trader)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_fee_within_cap(
        cap in 1u32..2_000,
        base in 0u32..2_000,
        conf in 0u32..20_000,
        inv_dev in 0u32..20_000,
        haircut in 0u32..9_999,
        tilt in -500i64..500,
        notional in 0u128..1_000_000 * WAD,
        emergency_spread in 0u32..2_000,
        size_on in any::<bool>(),
        tilt_on in any::<bool>(),
        aomq_on in any::<bool>(),
        bbo_on in any::<bool>(),
    ) {
        let mut params = params_with(1_000 * WAD, 1_000);
        params.fee.cap_bps = cap;
        params.fee.base_bps = base.min(cap);
        params.fee.gamma_size_lin_bps = 25;
        params.fee.gamma_size_quad_bps = 5;
        params.fee.size_fee_cap_bps = cap;
        params.maker.s0_notional = 1_000 * WAD;
        params.maker.alpha_bbo_bps = 5_000;
        params.maker.beta_floor_bps = 3;
        params.aomq.emergency_spread_bps = emergency_spread.min(cap);
        params.features.enable_size_fee = size_on;
        params.features.enable_inv_tilt = tilt_on;
        params.features.enable_aomq = aomq_on;
        params.features.enable_bbo_floor = bbo_on;
        prop_assume!(params.validate().is_ok());

        let breakdown = compose(&params, &FeeState::default(), &FeeInputs {
            block: 5,
            conf_bps: conf,
            inventory_dev_bps: inv_dev,
            spread_bps: conf,
            notional,
            tilt_bps: tilt,
            haircut_bps: haircut,
            discount_bps: 0,
            emergency: true,
        }).unwrap();

        prop_assert!(breakdown.fee_bps <= cap);
        prop_assert!((breakdown.fee_bps as u128) < BPS);
    }

    #[test]
    fn prop_quote_matches_swap(
        base_reserve in 50u128..5_000,
        quote_reserve in 50u128..5_000,
        amount in 1u128..2_000,
        spread in 0u32..100,
        is_base_in in any::<bool>(),
    ) {
        let reserves = Reserves::new(base_reserve * WAD, quote_reserve * WAD);
        let (mut pool, trader) = pool_with(reserves, spread);
        let amount_in = amount * WAD;

        let quoted = pool.quote(&QuoteRequest::new(amount_in, is_base_in), &[]);
        let request = SwapRequest::new(amount_in, 0, is_base_in, START_TIME + 60);
        let swapped = pool.swap(&trader, &request, &[]);

        match (quoted, swapped) {
            (Ok(quote), Ok(outcome)) => {
                prop_assert_eq!(quote.amount_out, outcome.amount_out);
                prop_assert_eq!(quote.fee_bps_used, outcome.fee_bps_used);
                prop_assert_eq!(quote.mid_used, outcome.mid_used);
            }
            (Err(quote_err), Err(swap_err)) => prop_assert_eq!(quote_err, swap_err),
            (quote, swap) => prop_assert!(false, "quote {:?} vs swap {:?}", quote, swap),
        }
    }

    #[test]
    fn prop_partial_fill_respects_floor(
        target in 100u128..10_000,
        floor_bps in 0u32..5_000,
        reserve_out in 1u128..10_000,
        amount in 1u128..20_000,
        fee_bps in 0u32..500,
        is_base_in in any::<bool>(),
    ) {
        let token = TokenConfig::new(18, 18);
        let reserves = if is_base_in {
            Reserves::new(10_000 * WAD, reserve_out * WAD)
        } else {
            Reserves::new(reserve_out * WAD, 10_000 * WAD)
        };
        let limits = FillLimits {
            target_base: target * WAD,
            floor_bps,
            max_quote_notional: None,
        };
        let amount_in = amount * WAD;
        let floor = floor_amount(&token, limits.target_base, floor_bps, !is_base_in, WAD).unwrap();

        match compute_fill(&token, &reserves, &limits, amount_in, is_base_in, WAD, fee_bps) {
            Ok(plan) => {
                let out_reserve = if is_base_in { reserves.quote } else { reserves.base };
                prop_assert!(plan.applied_in <= amount_in);
                prop_assert!(plan.amount_out <= out_reserve);
                prop_assert!(out_reserve - plan.amount_out >= floor);
                prop_assert_eq!(plan.partial, plan.reason.is_some());
            }
            Err(e) => prop_assert_eq!(e, PoolError::FloorBreach),
        }
    }

    #[test]
    fn prop_haircut_monotone_then_flat(
        accept in 0u32..100,
        band in 1u32..100,
        min in 0u32..50,
        slope in 0u32..20,
        delta in 0u32..400,
    ) {
        let config = OracleConfig {
            divergence_bps: 0,
            divergence_accept_bps: accept,
            divergence_soft_bps: accept + band,
            divergence_hard_bps: accept + band + 200,
            haircut_min_bps: min,
            haircut_slope_bps: slope,
            ..Default::default()
        };
        prop_assume!(config.validate().is_ok());

        let here = haircut_bps(&config, delta);
        let next = haircut_bps(&config, delta + 1);
        if delta > accept {
            prop_assert!(next >= here);
        }
        if delta >= accept + band {
            prop_assert_eq!(next, here);
        }
        if delta <= accept {
            prop_assert_eq!(here, 0);
        }
    }

    #[test]
    fn prop_failed_swap_leaves_no_trace(
        amount in 1u128..500,
        spread in 0u32..100,
        is_base_in in any::<bool>(),
    ) {
        let (mut pool, trader) = pool_with(Reserves::new(1_000 * WAD, 1_000 * WAD), spread);
        let before = pool.state().clone();
        let amount_in = amount * WAD;

        // Asking for more than the input is never fillable at mid 1.0
        let request = SwapRequest::new(amount_in, amount_in + 1, is_base_in, START_TIME + 60);
        let result = pool.swap(&trader, &request, &[]);

        let is_slippage = matches!(result, Err(PoolError::Slippage { .. }));
        prop_assert!(is_slippage);
        prop_assert_eq!(pool.state(), &before);
        prop_assert!(pool.events().is_empty());
    }
}
