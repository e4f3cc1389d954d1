//! DNMM Pool
//!
//! Oracle-anchored two-asset market maker. The mid price comes from external
//! feeds rather than from the reserves; the pool's job is to price around it
//! safely:
//!
//! - [`oracle_reader`]: primary spot, EMA and secondary feeds merged with
//!   fail-closed freshness and spread gates
//! - [`confidence`]: spread, EWMA sigma and secondary confidence blended into
//!   one capped score
//! - [`divergence`]: accept/soft/hard policy between the two feeds
//! - [`fee_policy`]: dynamic fee with per-block decay and optional terms
//! - [`inventory`]: floor-aware fills and partial fills
//! - [`recenter`]: manual and automatic inventory target recentering
//! - [`governor`]: validated, atomic parameter updates
//!
//! [`DnmPool`] ties them together behind the quote/swap interface.

pub mod confidence;
pub mod divergence;
pub mod error;
pub mod events;
pub mod fee_policy;
pub mod governor;
pub mod guard;
pub mod inventory;
pub mod model;
pub mod oracle_reader;
pub mod pool;
pub mod pricing;
pub mod recenter;
pub mod settings;

// Re-export main types for convenience
pub use error::{PoolError, PoolResult};
pub use events::PoolEvent;
pub use governor::{ParamKind, ParamUpdate};
pub use model::{
    PoolId, QuoteRequest, QuoteResult, ReasonCode, Roles, SwapOutcome, SwapRequest,
    TopOfBookQuote,
};
pub use pool::{DnmPool, PoolEnvironment};
pub use pricing::OracleOutcome;
pub use settings::{PoolSettings, SettingsError};
