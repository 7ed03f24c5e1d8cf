//! Per-turn snapshot of the world
//!
//! Captured once at the start of planning and exclusively owned by the turn's
//! computation. Malformed input is recorded as `SnapshotIssue`s and the
//! offending item is skipped; capture itself never fails.

use ahash::{AHashMap, AHashSet};
use thiserror::Error;

use crate::allocation::tier::Tier;
use crate::core::types::{EmpireId, LocationId, Rating, UnitGroupId};
use crate::military::rating::combine;
use crate::world::interface::WorldView;
use crate::world::location::Location;
use crate::world::unit_group::UnitGroup;

/// Upstream data defects found while capturing a snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotIssue {
    #[error("{group} references unknown location {location}")]
    UnknownLocation {
        group: UnitGroupId,
        location: LocationId,
    },
    #[error("{location} lists unknown neighbor {neighbor}")]
    DanglingNeighbor {
        location: LocationId,
        neighbor: LocationId,
    },
    #[error("{group} is owned by empire {} and is not friendly", .owner.0)]
    ForeignUnitGroup { group: UnitGroupId, owner: EmpireId },
    #[error("{0} listed more than once")]
    DuplicateLocation(LocationId),
    #[error("{0} listed more than once")]
    DuplicateUnitGroup(UnitGroupId),
    #[error("{tier} target list names unknown location {location}")]
    UnknownTarget { tier: Tier, location: LocationId },
}

impl SnapshotIssue {
    /// Location the issue is attached to, if any
    pub fn location(&self) -> Option<LocationId> {
        match self {
            SnapshotIssue::UnknownLocation { location, .. }
            | SnapshotIssue::DanglingNeighbor { location, .. }
            | SnapshotIssue::UnknownTarget { location, .. } => Some(*location),
            SnapshotIssue::DuplicateLocation(location) => Some(*location),
            SnapshotIssue::ForeignUnitGroup { .. } | SnapshotIssue::DuplicateUnitGroup(_) => None,
        }
    }
}

/// Everything the planner and executor read during one turn
#[derive(Debug, Clone)]
pub struct TurnSnapshot {
    empire: EmpireId,
    order: Vec<LocationId>,
    locations: AHashMap<LocationId, Location>,
    groups: Vec<UnitGroup>,
    /// Groups whose current mission still counts as a commitment
    tasked: AHashSet<UnitGroupId>,
    candidates: AHashMap<Tier, Vec<LocationId>>,
    issues: Vec<SnapshotIssue>,
}

impl TurnSnapshot {
    /// Read the world once and validate it
    pub fn capture<W: WorldView + ?Sized>(world: &W, empire: EmpireId) -> Self {
        let mut issues = Vec::new();

        let mut locations = AHashMap::new();
        let mut order = Vec::new();
        for mut location in world.list_locations() {
            if locations.contains_key(&location.id) {
                issues.push(SnapshotIssue::DuplicateLocation(location.id));
                continue;
            }
            location.threat = location.threat.sanitized();
            location.local_defense = location.local_defense.max(0.0);
            order.push(location.id);
            locations.insert(location.id, location);
        }
        order.sort();

        for id in &order {
            let neighbors = world.graph_neighbors(*id);
            let mut valid = Vec::with_capacity(neighbors.len());
            for neighbor in neighbors {
                if !locations.contains_key(&neighbor) {
                    issues.push(SnapshotIssue::DanglingNeighbor {
                        location: *id,
                        neighbor,
                    });
                } else if neighbor != *id && !valid.contains(&neighbor) {
                    valid.push(neighbor);
                }
            }
            if let Some(location) = locations.get_mut(id) {
                location.neighbors = valid;
            }
        }

        let mut seen_groups = AHashSet::new();
        let mut groups = Vec::new();
        for mut group in world.list_friendly_unit_groups() {
            if group.owner != empire {
                issues.push(SnapshotIssue::ForeignUnitGroup {
                    group: group.id,
                    owner: group.owner,
                });
                continue;
            }
            if !seen_groups.insert(group.id) {
                issues.push(SnapshotIssue::DuplicateUnitGroup(group.id));
                continue;
            }
            if !locations.contains_key(&group.location) {
                issues.push(SnapshotIssue::UnknownLocation {
                    group: group.id,
                    location: group.location,
                });
                continue;
            }
            if let Some(next) = group.next_location {
                if !locations.contains_key(&next) {
                    issues.push(SnapshotIssue::UnknownLocation {
                        group: group.id,
                        location: next,
                    });
                    group.next_location = None;
                }
            }
            if let Some(mission) = group.mission {
                if !locations.contains_key(&mission.target) {
                    issues.push(SnapshotIssue::UnknownLocation {
                        group: group.id,
                        location: mission.target,
                    });
                    group.mission = None;
                }
            }
            groups.push(group);
        }
        groups.sort_by_key(|g| g.id);

        let mut candidates = AHashMap::new();
        for tier in Tier::ALL {
            let mut list: Vec<LocationId> = Vec::new();
            for id in world.list_priority_targets(tier) {
                match locations.get_mut(&id) {
                    Some(location) => {
                        location.tiers.insert(tier);
                        if !list.contains(&id) {
                            list.push(id);
                        }
                    }
                    None => issues.push(SnapshotIssue::UnknownTarget { tier, location: id }),
                }
            }
            for id in &order {
                let flagged = locations
                    .get(id)
                    .is_some_and(|location| location.tiers.contains(tier));
                if flagged && !list.contains(id) {
                    list.push(*id);
                }
            }
            candidates.insert(tier, list);
        }

        for issue in &issues {
            tracing::warn!(%issue, "malformed snapshot entry skipped");
        }

        let tasked = groups
            .iter()
            .filter(|g| g.mission.is_some() && g.is_combat_capable())
            .map(|g| g.id)
            .collect();

        let mut snapshot = Self {
            empire,
            order,
            locations,
            groups,
            tasked,
            candidates,
            issues,
        };
        snapshot.refresh_commitments();
        snapshot
    }

    pub fn empire(&self) -> EmpireId {
        self.empire
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Locations in ascending id order
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.order.iter().filter_map(|id| self.locations.get(id))
    }

    pub fn neighbors(&self, id: LocationId) -> &[LocationId] {
        self.locations
            .get(&id)
            .map(|l| l.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn candidates(&self, tier: Tier) -> &[LocationId] {
        self.candidates
            .get(&tier)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> &[UnitGroup] {
        &self.groups
    }

    pub fn issues(&self) -> &[SnapshotIssue] {
        &self.issues
    }

    /// Combat-capable groups free to take a new mission this turn
    pub fn available_groups(&self) -> impl Iterator<Item = &UnitGroup> {
        self.groups
            .iter()
            .filter(|g| g.is_combat_capable() && !self.tasked.contains(&g.id))
    }

    pub fn available_ratings(&self) -> Vec<Rating> {
        self.available_groups().map(|g| g.rating()).collect()
    }

    pub fn tasked_count(&self) -> usize {
        self.tasked.len()
    }

    /// Stop counting existing missions as commitments
    ///
    /// Released groups rejoin the available pool and every location's
    /// already-assigned rating falls back to its static defenses. Nothing
    /// outside the snapshot changes until the new missions are committed.
    pub fn release_missions(&mut self) -> usize {
        let released = self.tasked.len();
        self.tasked.clear();
        self.refresh_commitments();
        released
    }

    fn refresh_commitments(&mut self) {
        let mut committed: AHashMap<LocationId, Rating> = AHashMap::new();
        for group in &self.groups {
            if !self.tasked.contains(&group.id) {
                continue;
            }
            if let Some(mission) = group.mission {
                let entry = committed.entry(mission.target).or_insert(0.0);
                *entry = combine(*entry, group.rating());
            }
        }
        for location in self.locations.values_mut() {
            let tasked = committed.get(&location.id).copied().unwrap_or(0.0);
            location.already_assigned = combine(location.local_defense, tasked);
        }
    }
}
