//! Per-location threat numbers
//!
//! The engine only reads these. They are refreshed once per turn by whoever
//! owns visibility of hostile forces; `ThreatEstimator` is a reference
//! implementation of that propagation for drivers that have none.

pub mod estimator;

pub use estimator::{ThreatEstimator, ThreatParams};

use serde::{Deserialize, Serialize};

use crate::core::types::Rating;

/// Hostile force magnitudes relevant to one location
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatFields {
    /// Visible hostile force at the location itself
    pub local: Rating,
    /// Discounted hostile force one hop away
    pub neighbor: Rating,
    /// Discounted hostile force two hops away
    pub jump2: Rating,
    /// Weighted combination of the three above
    pub regional: Rating,
    /// Estimate of nearby hostile force that is not currently visible
    pub potential: Rating,
}

impl ThreatFields {
    pub fn local(local: Rating) -> Self {
        Self {
            local,
            regional: local,
            ..Self::default()
        }
    }

    /// Replace negative or non-finite entries with zero
    pub fn sanitized(self) -> Self {
        let clean = |v: Rating| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            local: clean(self.local),
            neighbor: clean(self.neighbor),
            jump2: clean(self.jump2),
            regional: clean(self.regional),
            potential: clean(self.potential),
        }
    }
}
