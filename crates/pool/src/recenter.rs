//! Inventory target recentering
//!
//! Manual recenters are permissionless but gated by cooldown and drift.
//! Automatic recenters run after settled swaps and additionally require
//! three consecutive calm samples before they re-arm.

use dnmm_core::math::drift_bps;
use dnmm_core::{
    Amount, HEALTHY_STREAK_TARGET, InventoryConfig, RecenterState, Reserves, TokenConfig,
    UnixSeconds, Wad,
};
use log::debug;

use crate::error::{PoolError, PoolResult};
use crate::inventory::balanced_base;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecenterOutcome {
    /// New target when one was committed
    pub new_target: Option<Amount>,
    pub next_state: RecenterState,
}

/// Earliest time the next recenter may run, if a cooldown is pending
pub fn cooldown_ready_at(state: &RecenterState) -> Option<UnixSeconds> {
    if state.last_rebalance_at == 0 || state.cooldown_sec == 0 {
        return None;
    }
    Some(state.last_rebalance_at.saturating_add(state.cooldown_sec))
}

fn cooldown_elapsed(state: &RecenterState, now: UnixSeconds) -> bool {
    cooldown_ready_at(state).is_none_or(|ready_at| now >= ready_at)
}

/// Whether the target moved enough to be worth committing
fn target_moved(config: &InventoryConfig, old: Amount, new: Amount) -> PoolResult<bool> {
    if old == 0 {
        return Ok(new != 0);
    }
    Ok(drift_bps(new, old)? >= config.recenter_threshold_bps())
}

/// Permissionless recenter at the current `mid`
pub fn manual(
    token: &TokenConfig,
    config: &InventoryConfig,
    state: &RecenterState,
    reserves: &Reserves,
    mid: Wad,
    now: UnixSeconds,
) -> PoolResult<RecenterOutcome> {
    if let Some(ready_at) = cooldown_ready_at(state).filter(|ready_at| now < *ready_at) {
        return Err(PoolError::RecenterCooldown { ready_at });
    }

    let threshold = config.recenter_threshold_bps();
    if state.last_rebalance_price != 0 {
        let drift = drift_bps(mid, state.last_rebalance_price)?;
        if drift < threshold {
            return Err(PoolError::RecenterThreshold {
                drift_bps: drift,
                threshold_bps: threshold,
            });
        }
    }

    let candidate = balanced_base(token, reserves, mid)?;
    let mut next = RecenterState {
        last_rebalance_price: mid,
        auto_healthy_frames: 0,
        ..*state
    };

    if !target_moved(config, config.target_base_xstar, candidate)? {
        debug!(
            "[RECENTER] Target {} barely moves from {}, recording price only",
            candidate, config.target_base_xstar
        );
        return Ok(RecenterOutcome {
            new_target: None,
            next_state: next,
        });
    }

    next.last_rebalance_at = now;
    Ok(RecenterOutcome {
        new_target: Some(candidate),
        next_state: next,
    })
}

/// Post-swap check for an automatic recenter
pub fn auto_check(
    token: &TokenConfig,
    config: &InventoryConfig,
    state: &RecenterState,
    reserves: &Reserves,
    mid: Wad,
    now: UnixSeconds,
) -> PoolResult<RecenterOutcome> {
    let mut next = *state;
    if state.last_rebalance_price == 0 {
        next.last_rebalance_price = mid;
        return Ok(RecenterOutcome {
            new_target: None,
            next_state: next,
        });
    }

    let drift = drift_bps(mid, state.last_rebalance_price)?;
    if drift < config.recenter_threshold_bps() {
        next.auto_healthy_frames = (next.auto_healthy_frames + 1).min(HEALTHY_STREAK_TARGET);
        return Ok(RecenterOutcome {
            new_target: None,
            next_state: next,
        });
    }

    // A volatile sample that cannot fire breaks the calm streak
    if state.auto_healthy_frames < HEALTHY_STREAK_TARGET || !cooldown_elapsed(state, now) {
        next.auto_healthy_frames = 0;
        return Ok(RecenterOutcome {
            new_target: None,
            next_state: next,
        });
    }

    let candidate = balanced_base(token, reserves, mid)?;
    next.last_rebalance_price = mid;
    next.last_rebalance_at = now;
    next.auto_healthy_frames = 0;
    Ok(RecenterOutcome {
        new_target: (candidate != config.target_base_xstar).then_some(candidate),
        next_state: next,
    })
}
