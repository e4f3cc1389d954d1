use dnmm_core::{ActorId, Amount, Bps, ConfigError, MathError, UnixSeconds};
use dnmm_ports::CustodyError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // Oracle faults
    #[error("Oracle stale")]
    OracleStale,

    #[error("Oracle spread above cap and no fallback available")]
    OracleSpread,

    #[error("Invalid orderbook: bid {bid} >= ask {ask}")]
    InvalidOrderbook { bid: u128, ask: u128 },

    #[error("Oracle divergence {delta_bps} bps above {threshold_bps} bps")]
    OracleDiverged { delta_bps: Bps, threshold_bps: Bps },

    #[error("Hard divergence {delta_bps} bps above {hard_bps} bps")]
    DivergenceHard { delta_bps: Bps, hard_bps: Bps },

    #[error("Fee preview {preview_bps} bps differs from commit {commit_bps} bps")]
    FeePreviewInvariant { preview_bps: Bps, commit_bps: Bps },

    // Configuration faults
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Payload decode error: {0}")]
    Decode(String),

    // Execution faults
    #[error("Deadline {deadline} expired at {now}")]
    DeadlineExpired {
        deadline: UnixSeconds,
        now: UnixSeconds,
    },

    #[error("Slippage: out {amount_out} below minimum {min_amount_out}")]
    Slippage {
        amount_out: Amount,
        min_amount_out: Amount,
    },

    #[error("Token fee unsupported: expected {expected}, received {received}")]
    TokenFeeUnsupported { expected: Amount, received: Amount },

    #[error("Inventory floor breach")]
    FloorBreach,

    #[error("Fee {fee_bps} bps reaches 100%")]
    FeeCapExceeded { fee_bps: Bps },

    #[error("Zero amount")]
    ZeroAmount,

    #[error("Recenter cooldown active until {ready_at}")]
    RecenterCooldown { ready_at: UnixSeconds },

    #[error("Recenter drift {drift_bps} bps below threshold {threshold_bps} bps")]
    RecenterThreshold { drift_bps: Bps, threshold_bps: Bps },

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    // Access faults
    #[error("Caller {0} is not governance")]
    NotGovernance(ActorId),

    #[error("Caller {0} is not the pauser")]
    NotPauser(ActorId),

    #[error("Pool paused")]
    Paused,

    #[error("Reentrant call")]
    Reentrancy,
}

pub type PoolResult<T> = std::result::Result<T, PoolError>;
