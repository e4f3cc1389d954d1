use chrono::{DateTime, Utc};
use dnmm_core::{BlockNumber, Timestamp, UnixSeconds};
use dnmm_ports::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Deterministic clock: time and block height only move when advanced
///
/// Clones share the same underlying counters, so a test can hand one copy
/// to the pool and keep another to drive it.
#[derive(Clone)]
pub struct ManualClock {
    unix_secs: Arc<AtomicI64>,
    block: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn starting_at(unix_secs: UnixSeconds, block: BlockNumber) -> Self {
        Self {
            unix_secs: Arc::new(AtomicI64::new(unix_secs as i64)),
            block: Arc::new(AtomicU64::new(block)),
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.unix_secs.fetch_add(secs as i64, Ordering::SeqCst);
    }

    pub fn advance_blocks(&self, blocks: u64) {
        self.block.fetch_add(blocks, Ordering::SeqCst);
    }

    /// Move to the next block, `secs` later
    pub fn tick(&self, secs: u64) {
        self.advance_blocks(1);
        self.advance_secs(secs);
    }

    pub fn set(&self, unix_secs: UnixSeconds, block: BlockNumber) {
        self.unix_secs.store(unix_secs as i64, Ordering::SeqCst);
        self.block.store(block, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(1_700_000_000, 1)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.unix_secs.load(Ordering::SeqCst);
        DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn block_number(&self) -> BlockNumber {
        self.block.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_until_advanced() {
        let clock = ManualClock::starting_at(1_000, 7);
        assert_eq!(clock.unix_seconds(), 1_000);
        assert_eq!(clock.block_number(), 7);

        clock.advance_secs(30);
        clock.advance_blocks(2);
        assert_eq!(clock.unix_seconds(), 1_030);
        assert_eq!(clock.block_number(), 9);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::starting_at(0, 1);
        let handle = clock.clone();
        handle.tick(12);

        assert_eq!(clock.unix_seconds(), 12);
        assert_eq!(clock.block_number(), 2);

        clock.set(500, 40);
        assert_eq!(handle.unix_seconds(), 500);
        assert_eq!(handle.block_number(), 40);
    }
}
