//! Boundary with the rest of the game
//!
//! `WorldView` is read once per turn to build a snapshot. `FleetControl` is
//! the only way this crate changes anything outside itself.

use crate::allocation::tier::Tier;
use crate::core::types::{LocationId, UnitGroupId};
use crate::world::location::Location;
use crate::world::unit_group::{MissionPurpose, UnitGroup};

/// Read-only view of the world state for the current turn
pub trait WorldView {
    fn list_locations(&self) -> Vec<Location>;

    fn list_friendly_unit_groups(&self) -> Vec<UnitGroup>;

    fn graph_neighbors(&self, location: LocationId) -> Vec<LocationId>;

    /// Ranked target list produced by the external scoring subsystem
    fn list_priority_targets(&self, tier: Tier) -> Vec<LocationId>;
}

/// Mutations implemented by the external fleet/mission subsystem
pub trait FleetControl {
    fn set_mission(&mut self, group: UnitGroupId, purpose: MissionPurpose, target: LocationId);

    /// Split a group into single-unit groups, one id per unit in unit order
    fn split_unit_group(&mut self, group: UnitGroupId) -> Vec<UnitGroupId>;
}
