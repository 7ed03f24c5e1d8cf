//! Structured records of everything granted or assigned below request

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tier::Tier;
use crate::core::types::{LocationId, Rating};

/// Why less than requested was granted or assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortfallKind {
    /// A tier minimum could not be met from the remaining budget
    InsufficientBudget,
    /// The reachable pool could not meet even the loosened floor
    NoSuitableUnits,
    /// The target has no known path to any available force
    GraphUnreachable,
    /// Upstream data referenced something that does not exist
    MalformedSnapshot,
}

impl fmt::Display for ShortfallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShortfallKind::InsufficientBudget => "insufficient budget",
            ShortfallKind::NoSuitableUnits => "no suitable units",
            ShortfallKind::GraphUnreachable => "graph unreachable",
            ShortfallKind::MalformedSnapshot => "malformed snapshot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub location: Option<LocationId>,
    pub tier: Option<Tier>,
    pub kind: ShortfallKind,
    pub requested: Rating,
    pub granted: Rating,
    /// Extra rating that would have closed the gap
    pub missing: Rating,
    pub detail: String,
}

impl Shortfall {
    pub fn new(kind: ShortfallKind, detail: impl Into<String>) -> Self {
        Self {
            location: None,
            tier: None,
            kind,
            requested: 0.0,
            granted: 0.0,
            missing: 0.0,
            detail: detail.into(),
        }
    }

    pub fn at(mut self, location: LocationId, tier: Tier) -> Self {
        self.location = Some(location);
        self.tier = Some(tier);
        self
    }

    pub fn at_location(mut self, location: Option<LocationId>) -> Self {
        self.location = location;
        self
    }

    pub fn amounts(mut self, requested: Rating, granted: Rating, missing: Rating) -> Self {
        self.requested = requested;
        self.granted = granted;
        self.missing = missing;
        self
    }

    /// Emit the record at warn level
    pub fn log(&self) {
        tracing::warn!(
            kind = %self.kind,
            location = ?self.location,
            tier = ?self.tier,
            requested = self.requested,
            granted = self.granted,
            missing = self.missing,
            "{}",
            self.detail
        );
    }
}
