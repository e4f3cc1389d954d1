//! Oracle ingestion
//!
//! Merges the primary spot, its EMA and the secondary feed into one mid
//! with fail-closed staleness and spread gates. Each source degrades to
//! "not fresh" on a provider error, except the primary spot read which
//! aborts the request.

use dnmm_core::math::{Rounding, mul_div};
use dnmm_core::{BPS, Bps, OracleConfig, Wad, math::saturate_bps};
use dnmm_ports::{BookReading, PrimaryOracle, SecondaryOracle, SecondaryReading};
use log::{debug, warn};

use crate::error::{PoolError, PoolResult};
use crate::model::ReasonCode;

/// Mid selected for one request, before confidence and divergence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleRead {
    pub mid: Wad,
    pub age_sec: u64,
    pub spread_bps: Bps,
    pub reason: ReasonCode,
    pub used_fallback: bool,
    /// Secondary reading that passed the freshness gate
    pub secondary: Option<SecondaryReading>,
}

impl OracleRead {
    /// Whether the primary spot mid was used
    pub fn is_primary(&self) -> bool {
        self.reason == ReasonCode::None
    }
}

pub struct OracleReader<'a> {
    config: &'a OracleConfig,
    primary: &'a dyn PrimaryOracle,
    secondary: Option<&'a dyn SecondaryOracle>,
}

impl<'a> OracleReader<'a> {
    pub fn new(
        config: &'a OracleConfig,
        primary: &'a dyn PrimaryOracle,
        secondary: Option<&'a dyn SecondaryOracle>,
    ) -> Self {
        Self {
            config,
            primary,
            secondary,
        }
    }

    pub fn read(&self, update_data: &[u8]) -> PoolResult<OracleRead> {
        let spot = self.primary.spot().map_err(|e| {
            warn!("[ORACLE] Primary spot read failed: {}", e);
            PoolError::OracleStale
        })?;

        let spread_bps = match self.primary.book() {
            Ok(Some(book)) => book_spread_bps(&book, spot.mid)?,
            Ok(None) => 0,
            Err(e) => {
                warn!("[ORACLE] {} book read failed, no spread data: {}", self.primary.name(), e);
                0
            }
        };

        let secondary = self.read_secondary(update_data);

        let spread_rejected = spot.mid > 0 && spread_bps > self.config.conf_cap_bps_spot;
        let age_ok = spot.age_sec.is_some_and(|age| age <= self.config.max_age_sec);
        if age_ok && spot.mid > 0 && !spread_rejected {
            return Ok(OracleRead {
                mid: spot.mid,
                age_sec: spot.age_sec.unwrap_or_default(),
                spread_bps,
                reason: ReasonCode::None,
                used_fallback: false,
                secondary,
            });
        }
        debug!(
            "[ORACLE] Primary spot not usable: mid={} age={:?} spread={}bps",
            spot.mid, spot.age_sec, spread_bps
        );

        if self.config.allow_ema_fallback {
            match self.primary.ema() {
                Ok(ema) => {
                    let fresh = ema
                        .age_sec
                        .is_some_and(|age| age <= self.config.ema_max_age_sec());
                    if fresh && ema.mid > 0 {
                        return Ok(OracleRead {
                            mid: ema.mid,
                            age_sec: ema.age_sec.unwrap_or_default(),
                            spread_bps,
                            reason: ReasonCode::Ema,
                            used_fallback: true,
                            secondary,
                        });
                    }
                }
                Err(e) => warn!("[ORACLE] EMA read failed: {}", e),
            }
        }

        if let Some(reading) = secondary {
            return Ok(OracleRead {
                mid: reading.mid,
                age_sec: reading.age_sec,
                spread_bps: 0,
                reason: ReasonCode::Secondary,
                used_fallback: true,
                secondary,
            });
        }

        if spread_rejected {
            Err(PoolError::OracleSpread)
        } else {
            Err(PoolError::OracleStale)
        }
    }

    fn read_secondary(&self, update_data: &[u8]) -> Option<SecondaryReading> {
        let source = self.secondary?;
        match source.read(update_data) {
            Ok(reading) if reading.mid > 0 && reading.age_sec <= self.config.max_age_sec => {
                Some(reading)
            }
            Ok(reading) => {
                debug!(
                    "[ORACLE] {} not fresh: mid={} age={}",
                    source.name(),
                    reading.mid,
                    reading.age_sec
                );
                None
            }
            Err(e) => {
                warn!("[ORACLE] {} read failed: {}", source.name(), e);
                None
            }
        }
    }
}

/// Book width relative to mid, rounded up
fn book_spread_bps(book: &BookReading, mid: Wad) -> PoolResult<Bps> {
    if book.ask <= book.bid {
        return Err(PoolError::InvalidOrderbook {
            bid: book.bid,
            ask: book.ask,
        });
    }
    if mid == 0 {
        return Ok(0);
    }
    let spread = mul_div(book.ask - book.bid, BPS, mid, Rounding::Up)?;
    Ok(saturate_bps(spread))
}
