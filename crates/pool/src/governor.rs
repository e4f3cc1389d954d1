//! Parameter governance
//!
//! Candidate configurations are staged on a copy of the current parameters
//! and validated as a whole before anything is swapped in.

use dnmm_core::{
    AomqConfig, FeatureFlags, FeeConfig, InventoryConfig, MakerConfig, OracleConfig, PoolParams,
};
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamKind {
    Oracle,
    Fee,
    Inventory,
    Maker,
    Feature,
    Aomq,
}

/// A replacement for one configuration struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamUpdate {
    Oracle(OracleConfig),
    Fee(FeeConfig),
    Inventory(InventoryConfig),
    Maker(MakerConfig),
    Feature(FeatureFlags),
    Aomq(AomqConfig),
}

fn decode<T: serde::de::DeserializeOwned>(payload: &str) -> PoolResult<T> {
    serde_json::from_str(payload).map_err(|e| PoolError::Decode(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> PoolResult<String> {
    serde_json::to_string(value).map_err(|e| PoolError::Decode(e.to_string()))
}

impl ParamUpdate {
    /// Decode a JSON payload for `kind`
    pub fn decode(kind: ParamKind, payload: &str) -> PoolResult<Self> {
        Ok(match kind {
            ParamKind::Oracle => ParamUpdate::Oracle(decode(payload)?),
            ParamKind::Fee => ParamUpdate::Fee(decode(payload)?),
            ParamKind::Inventory => ParamUpdate::Inventory(decode(payload)?),
            ParamKind::Maker => ParamUpdate::Maker(decode(payload)?),
            ParamKind::Feature => ParamUpdate::Feature(decode(payload)?),
            ParamKind::Aomq => ParamUpdate::Aomq(decode(payload)?),
        })
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            ParamUpdate::Oracle(_) => ParamKind::Oracle,
            ParamUpdate::Fee(_) => ParamKind::Fee,
            ParamUpdate::Inventory(_) => ParamKind::Inventory,
            ParamUpdate::Maker(_) => ParamKind::Maker,
            ParamUpdate::Feature(_) => ParamKind::Feature,
            ParamUpdate::Aomq(_) => ParamKind::Aomq,
        }
    }
}

/// Audit record of an applied update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamChange {
    pub kind: ParamKind,
    pub old: String,
    pub new: String,
}

/// Encoded form of the struct `kind` names
fn encode_kind(params: &PoolParams, kind: ParamKind) -> PoolResult<String> {
    match kind {
        ParamKind::Oracle => encode(&params.oracle),
        ParamKind::Fee => encode(&params.fee),
        ParamKind::Inventory => encode(&params.inventory),
        ParamKind::Maker => encode(&params.maker),
        ParamKind::Feature => encode(&params.features),
        ParamKind::Aomq => encode(&params.aomq),
    }
}

/// Build and validate the parameters that would result from `update`
///
/// `current` is never touched; the caller swaps the returned set in.
pub fn stage(current: &PoolParams, update: &ParamUpdate) -> PoolResult<(PoolParams, ParamChange)> {
    let mut candidate = current.clone();
    match update {
        ParamUpdate::Oracle(cfg) => candidate.oracle = *cfg,
        ParamUpdate::Fee(cfg) => candidate.fee = *cfg,
        ParamUpdate::Inventory(cfg) => candidate.inventory = *cfg,
        ParamUpdate::Maker(cfg) => candidate.maker = *cfg,
        ParamUpdate::Feature(flags) => candidate.features = *flags,
        ParamUpdate::Aomq(cfg) => candidate.aomq = *cfg,
    }
    candidate.validate()?;

    let kind = update.kind();
    let change = ParamChange {
        kind,
        old: encode_kind(current, kind)?,
        new: encode_kind(&candidate, kind)?,
    };
    Ok((candidate, change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnmm_core::ConfigError;

    #[test]
    fn test_stage_swaps_one_struct() {
        let current = PoolParams::default();
        let update = ParamUpdate::decode(
            ParamKind::Fee,
            r#"{"base_bps": 20, "cap_bps": 200}"#,
        )
        .unwrap();

        let (next, change) = stage(&current, &update).unwrap();
        assert_eq!(next.fee.base_bps, 20);
        assert_eq!(next.fee.cap_bps, 200);
        assert_eq!(next.oracle, current.oracle);
        assert_eq!(change.kind, ParamKind::Fee);
        assert!(change.old.contains("\"base_bps\":15"));
        assert!(change.new.contains("\"base_bps\":20"));
    }

    #[test]
    fn test_invalid_candidate_rejected() {
        let current = PoolParams::default();
        let update = ParamUpdate::Fee(FeeConfig {
            base_bps: 300,
            cap_bps: 200,
            ..Default::default()
        });
        assert_eq!(
            stage(&current, &update).map(|_| ()),
            Err(PoolError::Config(ConfigError::FeeBaseAboveCap {
                base_bps: 300,
                cap_bps: 200,
            }))
        );
    }

    #[test]
    fn test_cross_struct_invariant_checked() {
        let current = PoolParams::default();
        // Emergency spread above the default 150 bps cap
        let update = ParamUpdate::Aomq(AomqConfig {
            emergency_spread_bps: 500,
            ..Default::default()
        });
        assert!(matches!(stage(&current, &update), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_garbage_payload() {
        let result = ParamUpdate::decode(ParamKind::Oracle, "not json");
        assert!(matches!(result, Err(PoolError::Decode(_))));
    }
}
