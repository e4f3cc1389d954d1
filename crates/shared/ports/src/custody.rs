use dnmm_core::{ActorId, Amount, Asset};

use crate::error::CustodyResult;

/// Port for the pool's token balances
///
/// Transfer mechanics live behind this trait. `pull` reports what actually
/// arrived so the pool can reject fee-on-transfer assets.
pub trait TokenCustody: Send + Sync {
    /// Balance held by the pool
    fn balance(&self, asset: Asset) -> Amount;

    /// Move `amount` from `from` into the pool, returning the amount received
    fn pull(&self, asset: Asset, from: &ActorId, amount: Amount) -> CustodyResult<Amount>;

    /// Move `amount` out of the pool to `to`
    fn push(&self, asset: Asset, to: &ActorId, amount: Amount) -> CustodyResult<()>;
}
