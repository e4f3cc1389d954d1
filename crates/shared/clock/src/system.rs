use chrono::{DateTime, Utc};
use dnmm_core::{BlockNumber, Timestamp};
use dnmm_ports::Clock;

/// Real system clock for production use
///
/// Returns the current wall-clock time. Block height is derived by counting
/// whole block intervals since the clock was created.
pub struct SystemClock {
    genesis: DateTime<Utc>,
    block_time_ms: i64,
}

impl SystemClock {
    pub const DEFAULT_BLOCK_TIME_MS: i64 = 2_000;

    pub fn new() -> Self {
        Self::with_block_time(Self::DEFAULT_BLOCK_TIME_MS)
    }

    /// Non-positive block times fall back to one block per millisecond
    pub fn with_block_time(block_time_ms: i64) -> Self {
        Self {
            genesis: Utc::now(),
            block_time_ms: block_time_ms.max(1),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn block_number(&self) -> BlockNumber {
        let elapsed = (Utc::now() - self.genesis).num_milliseconds().max(0);
        // Block 0 means "never updated" in the per-block state
        (elapsed / self.block_time_ms) as BlockNumber + 1
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
