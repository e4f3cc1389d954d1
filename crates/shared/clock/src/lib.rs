//! DNMM Clock Infrastructure
//!
//! Time and settlement-marker sources for the pricing engine:
//!
//! - [`SystemClock`]: wall time, block height derived from a fixed block time
//! - [`ManualClock`]: frozen time that only moves when told to (tests, replays)
//!
//! ## Usage
//!
//! ```ignore
//! use dnmm_clock::ManualClock;
//!
//! let clock = ManualClock::starting_at(1_700_000_000, 100);
//! clock.advance_blocks(1);
//! clock.advance_secs(12);
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use dnmm_ports::Clock;
