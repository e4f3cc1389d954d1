use dnmm_core::{ActorId, Amount, Bps, Wad};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::governor::ParamKind;
use crate::model::ReasonCode;

/// Audit trail emitted by the pool, drained by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PoolEvent {
    SwapExecuted {
        trader: ActorId,
        is_base_in: bool,
        amount_in: Amount,
        amount_out: Amount,
        mid: Wad,
        fee_bps: Bps,
        partial: bool,
        reason: ReasonCode,
    },
    QuoteServed {
        quote_id: Uuid,
        bid_px: Wad,
        ask_px: Wad,
        ttl_ms: u32,
        mid: Wad,
    },
    ParamsUpdated {
        kind: ParamKind,
        old: String,
        new: String,
    },
    Paused {
        by: ActorId,
    },
    Unpaused {
        by: ActorId,
    },
    TargetBaseXstarUpdated {
        old_target: Amount,
        new_target: Amount,
        /// Mid the target was computed at, `None` when set by governance
        mid: Option<Wad>,
        auto: bool,
    },
    RecenterCooldownSet {
        old_sec: u64,
        new_sec: u64,
    },
    /// Committed divergence sample against the secondary feed
    DivergenceChecked {
        delta_bps: Bps,
        active: bool,
        healthy_streak: u8,
    },
    DivergenceHaircut {
        delta_bps: Bps,
        haircut_bps: Bps,
    },
    ConfidenceDebug {
        conf_spread_bps: Bps,
        conf_sigma_bps: Bps,
        conf_secondary_bps: Bps,
        conf_bps: Bps,
        sigma_bps: Bps,
        fee_bps: Bps,
    },
    ReservesSynced {
        base: Amount,
        quote: Amount,
    },
    AggregatorDiscountSet {
        executor: ActorId,
        discount_bps: Bps,
    },
}

impl PoolEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PoolEvent::SwapExecuted { .. } => "SwapExecuted",
            PoolEvent::QuoteServed { .. } => "QuoteServed",
            PoolEvent::ParamsUpdated { .. } => "ParamsUpdated",
            PoolEvent::Paused { .. } => "Paused",
            PoolEvent::Unpaused { .. } => "Unpaused",
            PoolEvent::TargetBaseXstarUpdated { .. } => "TargetBaseXstarUpdated",
            PoolEvent::RecenterCooldownSet { .. } => "RecenterCooldownSet",
            PoolEvent::DivergenceChecked { .. } => "DivergenceChecked",
            PoolEvent::DivergenceHaircut { .. } => "DivergenceHaircut",
            PoolEvent::ConfidenceDebug { .. } => "ConfidenceDebug",
            PoolEvent::ReservesSynced { .. } => "ReservesSynced",
            PoolEvent::AggregatorDiscountSet { .. } => "AggregatorDiscountSet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = PoolEvent::DivergenceHaircut {
            delta_bps: 25,
            haircut_bps: 35,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"DivergenceHaircut","delta_bps":25,"haircut_bps":35}"#);

        let back: PoolEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "DivergenceHaircut");
    }
}
