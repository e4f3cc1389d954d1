use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw token amount in the token's smallest unit
pub type Amount = u128;

/// 18-decimal fixed-point value (prices are quote per base)
pub type Wad = u128;

/// Basis points (10_000 = 100%)
pub type Bps = u32;

/// Settlement marker used for once-per-block state updates
pub type BlockNumber = u64;

/// Unix time in whole seconds
pub type UnixSeconds = u64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// One of the two pool assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Asset {
    Base,
    Quote,
}

impl Asset {
    /// The asset on the other side of a swap
    pub fn other(self) -> Self {
        match self {
            Asset::Base => Asset::Quote,
            Asset::Quote => Asset::Base,
        }
    }
}

/// Identity of a caller (trader, governance, pauser, executor)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
