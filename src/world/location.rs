//! Location - a node of the strategic map graph
//!
//! Locations carry the threat picture and the friendly commitment already in
//! place, plus the tiers they are candidates for this turn.

use serde::{Deserialize, Serialize};

use crate::allocation::tier::{Tier, TierSet};
use crate::core::types::{EmpireId, LocationId, Rating};
use crate::threat::ThreatFields;

/// A location on the strategic map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub owner: Option<EmpireId>,
    /// Adjacent locations; filled from the graph when a snapshot is captured
    pub neighbors: Vec<LocationId>,
    pub threat: ThreatFields,
    /// Static friendly defenses (planetary shields, garrisons)
    pub local_defense: Rating,
    /// Local defense combined with fleets already tasked here
    pub already_assigned: Rating,
    /// Whether the location's lanes are known; unexplored nodes are never expanded
    pub explored: bool,
    pub tiers: TierSet,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: None,
            neighbors: Vec::new(),
            threat: ThreatFields::default(),
            local_defense: 0.0,
            already_assigned: 0.0,
            explored: true,
            tiers: TierSet::empty(),
        }
    }

    pub fn with_owner(mut self, owner: EmpireId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_threat(mut self, threat: ThreatFields) -> Self {
        self.threat = threat;
        self
    }

    pub fn with_local_defense(mut self, rating: Rating) -> Self {
        self.local_defense = rating;
        self.already_assigned = rating;
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tiers.insert(tier);
        self
    }

    pub fn unexplored(mut self) -> Self {
        self.explored = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_builder() {
        let loc = Location::new(LocationId(1), "Sol")
            .with_owner(EmpireId(1))
            .with_tier(Tier::CapitalDefense)
            .with_local_defense(30.0);

        assert_eq!(loc.owner, Some(EmpireId(1)));
        assert!(loc.tiers.contains(Tier::CapitalDefense));
        assert_eq!(loc.already_assigned, 30.0);
        assert!(loc.explored);
        assert!(!loc.clone().unexplored().explored);
    }
}
