use dnmm_core::{Amount, Asset};
use thiserror::Error;

/// Failure reading a price source
///
/// The reader treats any of these as "source not fresh"; only a failed
/// primary spot read aborts the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed feed data: {0}")]
    Malformed(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Insufficient {asset:?} balance: have {available}, need {required}")]
    InsufficientBalance {
        asset: Asset,
        available: Amount,
        required: Amount,
    },

    #[error("Transfer failed: {0}")]
    TransferFailed(String),
}

pub type CustodyResult<T> = std::result::Result<T, CustodyError>;
