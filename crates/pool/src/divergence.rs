//! Divergence guard between the primary and secondary feeds
//!
//! Three tiers: below `accept` is calm, up to `hard` charges a haircut and
//! marks the guard active, above `hard` rejects. The guard deactivates after
//! three consecutive calm samples.

use dnmm_core::math::divergence_bps;
use dnmm_core::{
    Bps, HEALTHY_STREAK_TARGET, OracleConfig, SoftDivergenceState, UnixSeconds, Wad,
};
use log::warn;

use crate::error::{PoolError, PoolResult};

/// Haircuts stop just short of a full fee
pub const MAX_HAIRCUT_BPS: u32 = 9_999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivergenceCheck {
    /// `None` when no sample was taken
    pub delta_bps: Option<Bps>,
    pub haircut_bps: Bps,
    /// Whether the sample fell in the soft band
    pub soft: bool,
    pub next_state: SoftDivergenceState,
}

/// Haircut for a divergence inside the soft band
pub fn haircut_bps(config: &OracleConfig, delta_bps: Bps) -> Bps {
    let tiers = config.resolved_thresholds();
    if delta_bps <= tiers.accept_bps {
        return 0;
    }
    let span = tiers.soft_bps.saturating_sub(tiers.accept_bps);
    let excess = (delta_bps - tiers.accept_bps).min(span);
    let haircut =
        config.haircut_min_bps as u64 + config.haircut_slope_bps as u64 * excess as u64;
    haircut.min(MAX_HAIRCUT_BPS as u64) as Bps
}

/// Sample the divergence between the mid in use and the secondary mid
///
/// Only sampled when the primary spot was used and a fresh secondary exists;
/// otherwise the state passes through untouched.
pub fn evaluate(
    config: &OracleConfig,
    soft_enabled: bool,
    state: &SoftDivergenceState,
    primary_mid: Wad,
    secondary_mid: Option<Wad>,
    now: UnixSeconds,
) -> PoolResult<DivergenceCheck> {
    let Some(secondary_mid) = secondary_mid else {
        return Ok(DivergenceCheck {
            next_state: *state,
            ..Default::default()
        });
    };
    let delta = divergence_bps(primary_mid, secondary_mid)?;

    if !soft_enabled {
        let threshold = config.divergence_bps;
        if threshold > 0 && delta > threshold {
            warn!("[ORACLE] Divergence {}bps above {}bps, rejecting", delta, threshold);
            return Err(PoolError::OracleDiverged {
                delta_bps: delta,
                threshold_bps: threshold,
            });
        }
        return Ok(DivergenceCheck {
            delta_bps: Some(delta),
            next_state: *state,
            ..Default::default()
        });
    }

    let tiers = config.resolved_thresholds();
    if tiers.hard_bps > 0 && delta > tiers.hard_bps {
        warn!(
            "[ORACLE] Hard divergence {}bps above {}bps, rejecting",
            delta, tiers.hard_bps
        );
        return Err(PoolError::DivergenceHard {
            delta_bps: delta,
            hard_bps: tiers.hard_bps,
        });
    }

    let mut next = *state;
    next.last_delta_bps = delta;
    next.last_sample_at = now;

    if delta > tiers.accept_bps {
        next.active = true;
        next.healthy_streak = 0;
        return Ok(DivergenceCheck {
            delta_bps: Some(delta),
            haircut_bps: haircut_bps(config, delta),
            soft: true,
            next_state: next,
        });
    }

    next.healthy_streak = (next.healthy_streak + 1).min(HEALTHY_STREAK_TARGET);
    if next.active && next.healthy_streak >= HEALTHY_STREAK_TARGET {
        next.active = false;
    }
    Ok(DivergenceCheck {
        delta_bps: Some(delta),
        haircut_bps: 0,
        soft: false,
        next_state: next,
    })
}
