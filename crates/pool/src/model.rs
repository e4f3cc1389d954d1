//! Request and response types of the pool's external interface

use dnmm_core::{ActorId, Amount, Bps, UnixSeconds, Wad};
use dnmm_ports::OracleMode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PoolId = Uuid;

/// Why a price or fill came out the way it did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Primary spot used, full fill
    #[default]
    None,
    /// Primary EMA fallback
    Ema,
    /// Secondary feed fallback
    Secondary,
    /// Clamped at the inventory floor
    Floor,
    /// Clamped by emergency quoting
    Aomq,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::None => "NONE",
            ReasonCode::Ema => "EMA",
            ReasonCode::Secondary => "SECONDARY",
            ReasonCode::Floor => "FLOOR",
            ReasonCode::Aomq => "AOMQ",
        }
    }
}

/// Governance and pause authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub governance: ActorId,
    pub pauser: ActorId,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            governance: ActorId::from("governance"),
            pauser: ActorId::from("pauser"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub amount_in: Amount,
    pub is_base_in: bool,
    #[serde(default)]
    pub mode: OracleMode,
    /// Routing executor, for rebates
    #[serde(default)]
    pub executor: Option<ActorId>,
}

impl QuoteRequest {
    pub fn new(amount_in: Amount, is_base_in: bool) -> Self {
        Self {
            amount_in,
            is_base_in,
            mode: OracleMode::Spot,
            executor: None,
        }
    }

    pub fn with_mode(mut self, mode: OracleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_executor(mut self, executor: ActorId) -> Self {
        self.executor = Some(executor);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub amount_out: Amount,
    pub mid_used: Wad,
    pub fee_bps_used: Bps,
    /// Input actually consumed when partially filled, 0 otherwise
    pub partial_fill_amount_in: Amount,
    pub used_fallback: bool,
    pub reason: ReasonCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub amount_in: Amount,
    pub min_amount_out: Amount,
    pub is_base_in: bool,
    #[serde(default)]
    pub mode: OracleMode,
    pub deadline: UnixSeconds,
    #[serde(default)]
    pub executor: Option<ActorId>,
}

impl SwapRequest {
    pub fn new(
        amount_in: Amount,
        min_amount_out: Amount,
        is_base_in: bool,
        deadline: UnixSeconds,
    ) -> Self {
        Self {
            amount_in,
            min_amount_out,
            is_base_in,
            mode: OracleMode::Spot,
            deadline,
            executor: None,
        }
    }

    pub fn with_mode(mut self, mode: OracleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_executor(mut self, executor: ActorId) -> Self {
        self.executor = Some(executor);
        self
    }

    pub(crate) fn as_quote(&self) -> QuoteRequest {
        QuoteRequest {
            amount_in: self.amount_in,
            is_base_in: self.is_base_in,
            mode: self.mode,
            executor: self.executor.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub mid_used: Wad,
    pub fee_bps_used: Bps,
    pub partial: bool,
    pub reason: ReasonCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBookQuote {
    pub bid_px: Wad,
    pub ask_px: Wad,
    pub ttl_ms: u32,
    pub quote_id: Uuid,
}
