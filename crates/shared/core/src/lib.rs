//! DNMM Core Domain
//!
//! Pure domain types for the oracle-anchored market maker.
//! This crate contains no I/O and is 100% unit testable.

pub mod config;
pub mod math;
pub mod state;
pub mod values;

// Re-export commonly used types at crate root
pub use config::{
    AomqConfig, ConfigError, ConfigResult, DivergenceThresholds, FeatureFlags, FeeConfig,
    InventoryConfig, MakerConfig, OracleConfig, PoolParams, TokenConfig,
};
pub use math::{BPS, MathError, MathResult, WAD};
pub use state::{
    ConfidenceState, FeeState, HEALTHY_STREAK_TARGET, PoolState, RecenterState, Reserves,
    SoftDivergenceState,
};
pub use values::{ActorId, Amount, Asset, BlockNumber, Bps, Timestamp, UnixSeconds, Wad};
