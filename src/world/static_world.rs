//! In-memory world implementing both sides of the boundary
//!
//! Used by the harness binary, benchmarks and tests in place of a real game.
//! Every mission and split issued through `FleetControl` is applied to the
//! stored groups and recorded in order.

use ahash::AHashMap;

use crate::allocation::tier::Tier;
use crate::core::types::{LocationId, UnitGroupId};
use crate::world::interface::{FleetControl, WorldView};
use crate::world::location::Location;
use crate::world::unit_group::{Mission, MissionPurpose, UnitGroup};

/// A mission issued through `FleetControl::set_mission`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedMission {
    pub group: UnitGroupId,
    pub purpose: MissionPurpose,
    pub target: LocationId,
}

#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    locations: Vec<Location>,
    adjacency: AHashMap<LocationId, Vec<LocationId>>,
    groups: Vec<UnitGroup>,
    priority_targets: AHashMap<Tier, Vec<LocationId>>,
    issued: Vec<IssuedMission>,
    splits: Vec<UnitGroupId>,
    next_group_id: u32,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(&mut self, location: Location) {
        let links = self.adjacency.entry(location.id).or_default();
        for neighbor in &location.neighbors {
            if !links.contains(neighbor) {
                links.push(*neighbor);
            }
        }
        self.locations.push(location);
    }

    /// Add an undirected lane
    pub fn connect(&mut self, a: LocationId, b: LocationId) {
        self.add_neighbor_only(a, b);
        self.add_neighbor_only(b, a);
    }

    /// Add a one-way adjacency entry, even to a location that does not exist
    pub fn add_neighbor_only(&mut self, from: LocationId, to: LocationId) {
        let links = self.adjacency.entry(from).or_default();
        if !links.contains(&to) {
            links.push(to);
        }
    }

    pub fn add_group(&mut self, group: UnitGroup) {
        self.next_group_id = self.next_group_id.max(group.id.0 + 1);
        self.groups.push(group);
    }

    pub fn set_priority_targets(&mut self, tier: Tier, targets: Vec<LocationId>) {
        self.priority_targets.insert(tier, targets);
    }

    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.iter_mut().find(|l| l.id == id)
    }

    pub fn group(&self, id: UnitGroupId) -> Option<&UnitGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn all_groups(&self) -> &[UnitGroup] {
        &self.groups
    }

    pub fn adjacency(&self) -> &AHashMap<LocationId, Vec<LocationId>> {
        &self.adjacency
    }

    /// Missions issued so far, in order
    pub fn issued_missions(&self) -> &[IssuedMission] {
        &self.issued
    }

    /// Groups that were split, in order
    pub fn splits(&self) -> &[UnitGroupId] {
        &self.splits
    }

    pub fn clear_log(&mut self) {
        self.issued.clear();
        self.splits.clear();
    }
}

impl WorldView for StaticWorld {
    fn list_locations(&self) -> Vec<Location> {
        self.locations.clone()
    }

    fn list_friendly_unit_groups(&self) -> Vec<UnitGroup> {
        self.groups.clone()
    }

    fn graph_neighbors(&self, location: LocationId) -> Vec<LocationId> {
        self.adjacency.get(&location).cloned().unwrap_or_default()
    }

    fn list_priority_targets(&self, tier: Tier) -> Vec<LocationId> {
        self.priority_targets.get(&tier).cloned().unwrap_or_default()
    }
}

impl FleetControl for StaticWorld {
    fn set_mission(&mut self, group: UnitGroupId, purpose: MissionPurpose, target: LocationId) {
        if let Some(stored) = self.groups.iter_mut().find(|g| g.id == group) {
            stored.mission = Some(Mission { purpose, target });
        }
        self.issued.push(IssuedMission {
            group,
            purpose,
            target,
        });
    }

    /// The original id keeps the first unit; each further unit gets a fresh id
    fn split_unit_group(&mut self, group: UnitGroupId) -> Vec<UnitGroupId> {
        let Some(index) = self.groups.iter().position(|g| g.id == group) else {
            return Vec::new();
        };
        self.splits.push(group);

        let original = &mut self.groups[index];
        if original.units.len() <= 1 {
            return vec![group];
        }
        let detached: Vec<_> = original.units.drain(1..).collect();
        let template = original.clone();

        let mut ids = vec![group];
        for unit in detached {
            let id = UnitGroupId(self.next_group_id);
            self.next_group_id += 1;
            let mut fragment = template.clone();
            fragment.id = id;
            fragment.units = vec![unit];
            self.groups.push(fragment);
            ids.push(id);
        }
        ids
    }
}
