use dnmm_core::math::{MathResult, wad_from_decimal};
use dnmm_core::{Bps, Wad};
use dnmm_ports::{
    BookReading, MidReading, PrimaryOracle, ProviderError, ProviderResult, SecondaryOracle,
    SecondaryReading,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct PrimaryFeed {
    spot: ProviderResult<MidReading>,
    book: ProviderResult<Option<BookReading>>,
    ema: ProviderResult<MidReading>,
}

/// Settable primary feed
///
/// Starts with every read unavailable until a price is set.
#[derive(Clone)]
pub struct InMemoryPrimaryOracle {
    feed: Arc<RwLock<PrimaryFeed>>,
}

fn unset(what: &str) -> ProviderError {
    ProviderError::Unavailable(format!("{what} not set"))
}

impl InMemoryPrimaryOracle {
    pub fn new() -> Self {
        Self {
            feed: Arc::new(RwLock::new(PrimaryFeed {
                spot: Err(unset("spot")),
                book: Ok(None),
                ema: Err(unset("ema")),
            })),
        }
    }

    /// Feed with a fresh spot and a book of the given width around it
    ///
    /// A zero width leaves the venue without a book.
    pub fn with_mid(mid: Wad, spread_bps: Bps) -> Self {
        let oracle = Self::new();
        oracle.set_spot(mid, Some(0));
        if spread_bps > 0 {
            oracle.set_book_around(mid, spread_bps);
        }
        oracle
    }

    fn update(&self, apply: impl FnOnce(&mut PrimaryFeed)) {
        apply(&mut self.feed.write());
    }

    fn snapshot(&self) -> PrimaryFeed {
        self.feed.read().clone()
    }

    pub fn set_spot(&self, mid: Wad, age_sec: Option<u64>) {
        self.update(|feed| feed.spot = Ok(MidReading { mid, age_sec }));
    }

    /// Set the spot from a human-readable price
    pub fn set_spot_price(&self, price: Decimal, age_sec: Option<u64>) -> MathResult<()> {
        self.set_spot(wad_from_decimal(price)?, age_sec);
        Ok(())
    }

    pub fn set_book(&self, bid: Wad, ask: Wad) {
        self.update(|feed| feed.book = Ok(Some(BookReading { bid, ask })));
    }

    /// Book symmetric around `mid`, `spread_bps` wide in total
    pub fn set_book_around(&self, mid: Wad, spread_bps: Bps) {
        let half = mid.saturating_mul(spread_bps as u128) / 20_000;
        self.set_book(mid.saturating_sub(half), mid.saturating_add(half));
    }

    pub fn clear_book(&self) {
        self.update(|feed| feed.book = Ok(None));
    }

    pub fn set_ema(&self, mid: Wad, age_sec: Option<u64>) {
        self.update(|feed| feed.ema = Ok(MidReading { mid, age_sec }));
    }

    pub fn fail_spot(&self, reason: &str) {
        let err = ProviderError::Unavailable(reason.to_string());
        self.update(|feed| feed.spot = Err(err));
    }

    pub fn fail_book(&self, reason: &str) {
        let err = ProviderError::Unavailable(reason.to_string());
        self.update(|feed| feed.book = Err(err));
    }

    pub fn fail_ema(&self, reason: &str) {
        let err = ProviderError::Unavailable(reason.to_string());
        self.update(|feed| feed.ema = Err(err));
    }
}

impl Default for InMemoryPrimaryOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimaryOracle for InMemoryPrimaryOracle {
    fn spot(&self) -> ProviderResult<MidReading> {
        self.snapshot().spot
    }

    fn book(&self) -> ProviderResult<Option<BookReading>> {
        self.snapshot().book
    }

    fn ema(&self) -> ProviderResult<MidReading> {
        self.snapshot().ema
    }

    fn name(&self) -> &str {
        "InMemoryPrimaryOracle"
    }
}

/// Settable secondary feed
///
/// Update data passed to `read` is recorded so tests can check it was
/// forwarded.
#[derive(Clone)]
pub struct InMemorySecondaryOracle {
    reading: Arc<RwLock<ProviderResult<SecondaryReading>>>,
    last_update_data: Arc<RwLock<Vec<u8>>>,
}

impl InMemorySecondaryOracle {
    pub fn new() -> Self {
        Self {
            reading: Arc::new(RwLock::new(Err(unset("secondary")))),
            last_update_data: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_mid(mid: Wad, conf_bps: Bps) -> Self {
        let oracle = Self::new();
        oracle.set(mid, 0, conf_bps);
        oracle
    }

    pub fn set(&self, mid: Wad, age_sec: u64, conf_bps: Bps) {
        *self.reading.write() = Ok(SecondaryReading {
            mid,
            age_sec,
            conf_bps,
        });
    }

    pub fn set_price(&self, price: Decimal, age_sec: u64, conf_bps: Bps) -> MathResult<()> {
        self.set(wad_from_decimal(price)?, age_sec, conf_bps);
        Ok(())
    }

    pub fn fail(&self, reason: &str) {
        *self.reading.write() = Err(ProviderError::Unavailable(reason.to_string()));
    }

    pub fn last_update_data(&self) -> Vec<u8> {
        self.last_update_data.read().clone()
    }
}

impl Default for InMemorySecondaryOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SecondaryOracle for InMemorySecondaryOracle {
    fn read(&self, update_data: &[u8]) -> ProviderResult<SecondaryReading> {
        *self.last_update_data.write() = update_data.to_vec();
        self.reading.read().clone()
    }

    fn name(&self) -> &str {
        "InMemorySecondaryOracle"
    }
}
