use dashmap::DashMap;
use dnmm_core::math::apply_bps_down;
use dnmm_core::{ActorId, Amount, Asset, Bps};
use dnmm_ports::{CustodyError, CustodyResult, TokenCustody};
use log::debug;
use std::sync::Arc;

/// Token ledger for the pool and its counterparties
///
/// Thread-safe storage using DashMap. An optional per-asset transfer fee
/// simulates fee-on-transfer tokens: the pool receives less than was sent.
#[derive(Clone)]
pub struct InMemoryCustody {
    pool: Arc<DashMap<Asset, Amount>>,
    accounts: Arc<DashMap<(ActorId, Asset), Amount>>,
    transfer_fee_bps: Arc<DashMap<Asset, Bps>>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(DashMap::new()),
            accounts: Arc::new(DashMap::new()),
            transfer_fee_bps: Arc::new(DashMap::new()),
        }
    }

    /// Credit the pool directly (seeding, donations)
    pub fn fund_pool(&self, asset: Asset, amount: Amount) {
        *self.pool.entry(asset).or_insert(0) += amount;
    }

    /// Credit a counterparty
    pub fn mint(&self, owner: &ActorId, asset: Asset, amount: Amount) {
        *self.accounts.entry((owner.clone(), asset)).or_insert(0) += amount;
    }

    pub fn balance_of(&self, owner: &ActorId, asset: Asset) -> Amount {
        self.accounts
            .get(&(owner.clone(), asset))
            .map(|b| *b.value())
            .unwrap_or(0)
    }

    pub fn set_transfer_fee_bps(&self, asset: Asset, fee_bps: Bps) {
        self.transfer_fee_bps.insert(asset, fee_bps);
    }

    fn transfer_fee(&self, asset: Asset, amount: Amount) -> CustodyResult<Amount> {
        let fee_bps = self
            .transfer_fee_bps
            .get(&asset)
            .map(|f| *f.value())
            .unwrap_or(0);
        apply_bps_down(amount, fee_bps)
            .map_err(|e| CustodyError::TransferFailed(e.to_string()))
    }
}

impl Default for InMemoryCustody {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCustody for InMemoryCustody {
    fn balance(&self, asset: Asset) -> Amount {
        self.pool.get(&asset).map(|b| *b.value()).unwrap_or(0)
    }

    fn pull(&self, asset: Asset, from: &ActorId, amount: Amount) -> CustodyResult<Amount> {
        let fee = self.transfer_fee(asset, amount)?;
        {
            let mut account = self.accounts.entry((from.clone(), asset)).or_insert(0);
            if *account < amount {
                return Err(CustodyError::InsufficientBalance {
                    asset,
                    available: *account,
                    required: amount,
                });
            }
            *account -= amount;
        }

        let received = amount - fee;
        *self.pool.entry(asset).or_insert(0) += received;
        debug!("pull {:?} {} from {} (received {})", asset, amount, from, received);
        Ok(received)
    }

    fn push(&self, asset: Asset, to: &ActorId, amount: Amount) -> CustodyResult<()> {
        {
            let mut pool = self.pool.entry(asset).or_insert(0);
            if *pool < amount {
                return Err(CustodyError::InsufficientBalance {
                    asset,
                    available: *pool,
                    required: amount,
                });
            }
            *pool -= amount;
        }

        *self.accounts.entry((to.clone(), asset)).or_insert(0) += amount;
        debug!("push {:?} {} to {}", asset, amount, to);
        Ok(())
    }
}
