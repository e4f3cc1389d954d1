//! Mutable pool state
//!
//! Owned by the pool and evolved only on settlement. The whole struct is
//! cloned at the start of a mutating call and written back on success.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::values::{ActorId, Amount, BlockNumber, Bps, UnixSeconds, Wad};

/// Longest streak tracked by the hysteresis counters
pub const HEALTHY_STREAK_TARGET: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub base: Amount,
    pub quote: Amount,
}

impl Reserves {
    pub fn new(base: Amount, quote: Amount) -> Self {
        Self { base, quote }
    }
}

/// EWMA volatility tracker, updated at most once per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceState {
    pub last_block: BlockNumber,
    pub sigma_bps: Bps,
    /// 0 until the first sample
    pub last_mid: Wad,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDivergenceState {
    pub active: bool,
    pub last_delta_bps: Bps,
    pub healthy_streak: u8,
    pub last_sample_at: UnixSeconds,
}

/// Fee decay memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeState {
    /// Block the last fee was committed at, `None` before the first swap
    pub last_block: Option<BlockNumber>,
    pub last_fee_bps: Bps,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecenterState {
    /// 0 until the first sample
    pub last_rebalance_price: Wad,
    pub last_rebalance_at: UnixSeconds,
    pub cooldown_sec: u64,
    pub auto_healthy_frames: u8,
}

/// Everything the pool mutates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub reserves: Reserves,
    pub confidence: ConfidenceState,
    pub divergence: SoftDivergenceState,
    pub fee: FeeState,
    pub recenter: RecenterState,
    pub paused: bool,
    /// Executor rebates, in bps
    pub aggregator_discounts: BTreeMap<ActorId, Bps>,
}

impl PoolState {
    pub fn new(reserves: Reserves, cooldown_sec: u64) -> Self {
        Self {
            reserves,
            recenter: RecenterState {
                cooldown_sec,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn aggregator_discount(&self, executor: Option<&ActorId>) -> Bps {
        executor
            .and_then(|id| self.aggregator_discounts.get(id))
            .copied()
            .unwrap_or(0)
    }
}
