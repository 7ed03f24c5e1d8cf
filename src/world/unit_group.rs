//! Unit groups - fleets or armies that can be tasked as one

use serde::{Deserialize, Serialize};

use crate::core::types::{EmpireId, LocationId, Rating, UnitGroupId};
use crate::military::rating::combine_all;

/// A single combat unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub attack: f64,
    pub health: f64,
}

impl CombatUnit {
    pub fn new(attack: f64, health: f64) -> Self {
        Self { attack, health }
    }

    pub fn rating(&self) -> Rating {
        self.attack.max(0.0) * self.health.max(0.0)
    }
}

/// Tags restricting which requests a group can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Armed,
    CarriesTroops,
    Detection,
    Stealth,
}

/// What a group has been told to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionPurpose {
    Defend,
    Secure,
    Blockade,
    Patrol,
    Escort,
    Guard,
}

/// Current orders of a unit group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub purpose: MissionPurpose,
    pub target: LocationId,
}

/// A collection of combat units sharing a location and owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitGroup {
    pub id: UnitGroupId,
    pub owner: EmpireId,
    pub location: LocationId,
    /// Where the group will be next turn if it is moving
    pub next_location: Option<LocationId>,
    pub units: Vec<CombatUnit>,
    pub capabilities: Vec<Capability>,
    /// Jumps the group can make from its location; None is unlimited
    pub range: Option<u32>,
    pub mission: Option<Mission>,
}

impl UnitGroup {
    pub fn new(id: UnitGroupId, owner: EmpireId, location: LocationId) -> Self {
        Self {
            id,
            owner,
            location,
            next_location: None,
            units: Vec::new(),
            capabilities: vec![Capability::Armed],
            range: None,
            mission: None,
        }
    }

    pub fn with_units(mut self, units: Vec<CombatUnit>) -> Self {
        self.units = units;
        self
    }

    /// Add `count` identical units
    pub fn with_uniform_units(mut self, count: usize, attack: f64, health: f64) -> Self {
        self.units
            .extend(std::iter::repeat(CombatUnit::new(attack, health)).take(count));
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn without_capability(mut self, capability: Capability) -> Self {
        self.capabilities.retain(|c| *c != capability);
        self
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_mission(mut self, purpose: MissionPurpose, target: LocationId) -> Self {
        self.mission = Some(Mission { purpose, target });
        self
    }

    pub fn moving_to(mut self, next: LocationId) -> Self {
        self.next_location = Some(next);
        self
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Group rating: `combine` over the single-unit ratings
    ///
    /// Splitting a group into singles and sending all of them therefore
    /// achieves exactly the rating of the whole group.
    pub fn rating(&self) -> Rating {
        rating_of(&self.units)
    }

    /// Whether the group can contribute to military requests at all
    pub fn is_combat_capable(&self) -> bool {
        self.has_capability(Capability::Armed) && self.rating() > 0.0
    }
}

/// Rating of an arbitrary set of units fighting together
pub fn rating_of(units: &[CombatUnit]) -> Rating {
    combine_all(units.iter().map(CombatUnit::rating))
}
