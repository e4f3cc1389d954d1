//! DNMM Ports
//!
//! Port definitions (traits) for the pricing engine.
//! These define the boundaries between domain logic and infrastructure:
//! time, price feeds and token custody.

mod clock;
mod custody;
mod error;
mod oracle;

pub use clock::Clock;
pub use custody::TokenCustody;
pub use error::{CustodyError, CustodyResult, ProviderError, ProviderResult};
pub use oracle::{
    BookReading, MidReading, OracleMode, PrimaryOracle, SecondaryOracle, SecondaryReading,
};
