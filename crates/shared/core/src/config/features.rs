use serde::{Deserialize, Serialize};

/// Toggles for the optional pricing terms (all off by default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub blend_on: bool,
    pub enable_size_fee: bool,
    pub enable_bbo_floor: bool,
    pub enable_inv_tilt: bool,
    pub enable_aomq: bool,
    pub enable_rebates: bool,
    pub enable_soft_divergence: bool,
    pub enable_auto_recenter: bool,
    pub debug_emit: bool,
}
