use dnmm_core::{Bps, Wad};
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;

/// Request mode: which confidence cap applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OracleMode {
    #[default]
    Spot,
    Strict,
}

/// A mid price and how old it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidReading {
    pub mid: Wad,
    /// `None` when the provider cannot say
    pub age_sec: Option<u64>,
}

/// Best bid/ask from the primary venue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookReading {
    pub bid: Wad,
    pub ask: Wad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryReading {
    pub mid: Wad,
    pub age_sec: u64,
    /// Provider-reported confidence interval, relative to mid
    pub conf_bps: Bps,
}

/// Port for the primary price feed (spot, book and EMA)
pub trait PrimaryOracle: Send + Sync {
    fn spot(&self) -> ProviderResult<MidReading>;

    /// Top of book; `Ok(None)` when the venue exposes no book
    fn book(&self) -> ProviderResult<Option<BookReading>>;

    fn ema(&self) -> ProviderResult<MidReading>;

    fn name(&self) -> &str {
        "PrimaryOracle"
    }
}

/// Port for the independent secondary feed
pub trait SecondaryOracle: Send + Sync {
    /// Read the feed, forwarding caller-supplied update data untouched
    fn read(&self, update_data: &[u8]) -> ProviderResult<SecondaryReading>;

    fn name(&self) -> &str {
        "SecondaryOracle"
    }
}
