use serde::{Deserialize, Serialize};

/// Tunable limits for the detection rules.
///
/// Defaults reproduce the stock rules exactly; a profile may override
/// individual fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    /// A network's device count must move by more than this fraction of
    /// its previous count...
    pub significant_change_ratio: f64,
    /// ...and by more than this many devices.
    pub significant_change_min_delta: u32,
    /// The busiest AP must carry more than this multiple of the mean load...
    pub imbalance_load_factor: f64,
    /// ...and more than this many devices over the lightest AP.
    pub imbalance_min_spread: u32,
    /// Per-AP device count changes larger than this are reported.
    pub ap_change_min_delta: u32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            significant_change_ratio: 0.5,
            significant_change_min_delta: 3,
            imbalance_load_factor: 3.0,
            imbalance_min_spread: 10,
            ap_change_min_delta: 5,
        }
    }
}
