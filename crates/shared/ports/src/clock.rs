use dnmm_core::{BlockNumber, Timestamp, UnixSeconds};

/// Port for time abstraction
///
/// This allows the engine to use different time sources:
/// - Real system time for production
/// - Manually advanced time and blocks for deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Current settlement marker
    ///
    /// Per-block state (sigma, fee decay) is keyed on this value.
    fn block_number(&self) -> BlockNumber;

    /// Current time in whole unix seconds
    fn unix_seconds(&self) -> UnixSeconds {
        self.now().timestamp().max(0) as UnixSeconds
    }

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
