//! DNMM In-Memory Adapters
//!
//! Settable price feeds and a token ledger implementing the ports.
//! Clones share state, so a test keeps one handle to drive the market while
//! the pool reads through another.

mod custody;
mod oracle;

pub use custody::InMemoryCustody;
pub use oracle::{InMemoryPrimaryOracle, InMemorySecondaryOracle};
