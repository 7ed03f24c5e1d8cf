//! Pool of friendly force not yet committed this turn
//!
//! The pool holds detachments: contiguous runs of units from one source
//! group. A fresh pool has one detachment per available group. The finder may
//! break a detachment into single units so that only part of a group is used;
//! the external group is only split when such a selection is committed.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{LocationId, Rating, UnitGroupId};
use crate::military::rating::combine_all;
use crate::world::unit_group::{rating_of, Capability, CombatUnit, UnitGroup};

/// Ordering key: source group, then index of the first unit
pub type DetachmentKey = (UnitGroupId, usize);

/// Units of one source group that can be selected together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detachment {
    pub group: UnitGroupId,
    pub first_unit: usize,
    pub units: Vec<CombatUnit>,
    pub location: LocationId,
    pub next_location: Option<LocationId>,
    pub capabilities: Vec<Capability>,
    pub range: Option<u32>,
}

impl Detachment {
    pub fn key(&self) -> DetachmentKey {
        (self.group, self.first_unit)
    }

    pub fn rating(&self) -> Rating {
        rating_of(&self.units)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Indices of the covered units within the source group
    pub fn unit_indices(&self) -> std::ops::Range<usize> {
        self.first_unit..self.first_unit + self.units.len()
    }

    /// Present at `location` now or arriving there next turn
    pub fn is_at(&self, location: LocationId) -> bool {
        self.location == location || self.next_location == Some(location)
    }

    pub fn has_capabilities(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }

    /// Usable from `depth` jumps away
    pub fn reaches(&self, depth: u32) -> bool {
        self.range.map_or(true, |range| depth <= range)
    }

    fn into_singles(self) -> Vec<Detachment> {
        let Detachment {
            group,
            first_unit,
            units,
            location,
            next_location,
            capabilities,
            range,
        } = self;
        units
            .into_iter()
            .enumerate()
            .map(|(offset, unit)| Detachment {
                group,
                first_unit: first_unit + offset,
                units: vec![unit],
                location,
                next_location,
                capabilities: capabilities.clone(),
                range,
            })
            .collect()
    }
}

/// External identity of a source group's units
#[derive(Debug, Clone, PartialEq)]
pub enum GroupLabels {
    /// Still one external group with this many units
    Whole { unit_count: usize },
    /// Already split externally; one id per unit in unit order
    Split(Vec<UnitGroupId>),
}

#[derive(Debug, Clone, Default)]
pub struct UnitPool {
    detachments: BTreeMap<DetachmentKey, Detachment>,
    labels: AHashMap<UnitGroupId, GroupLabels>,
}

impl UnitPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// One whole detachment per group
    pub fn from_groups<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = &'a UnitGroup>,
    {
        let mut pool = Self::new();
        for group in groups {
            if group.units.is_empty() {
                continue;
            }
            pool.labels.insert(
                group.id,
                GroupLabels::Whole {
                    unit_count: group.unit_count(),
                },
            );
            let detachment = Detachment {
                group: group.id,
                first_unit: 0,
                units: group.units.clone(),
                location: group.location,
                next_location: group.next_location,
                capabilities: group.capabilities.clone(),
                range: group.range,
            };
            pool.detachments.insert(detachment.key(), detachment);
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.detachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detachments.is_empty()
    }

    pub fn get(&self, key: DetachmentKey) -> Option<&Detachment> {
        self.detachments.get(&key)
    }

    /// Keys of detachments at `location`, in key order
    pub fn keys_at(&self, location: LocationId) -> Vec<DetachmentKey> {
        self.detachments
            .values()
            .filter(|d| d.is_at(location))
            .map(|d| d.key())
            .collect()
    }

    pub fn take(&mut self, key: DetachmentKey) -> Option<Detachment> {
        self.detachments.remove(&key)
    }

    /// Put a tentatively taken detachment back
    pub fn restore(&mut self, detachment: Detachment) {
        self.detachments.insert(detachment.key(), detachment);
    }

    /// Replace a detachment with one single-unit detachment per unit
    pub fn split(&mut self, key: DetachmentKey) -> Vec<DetachmentKey> {
        let Some(detachment) = self.detachments.remove(&key) else {
            return Vec::new();
        };
        let singles = detachment.into_singles();
        let keys = singles.iter().map(|d| d.key()).collect();
        for single in singles {
            self.detachments.insert(single.key(), single);
        }
        keys
    }

    /// Drop every remaining fragment of a group
    pub fn remove_group(&mut self, group: UnitGroupId) -> usize {
        let before = self.detachments.len();
        self.detachments.retain(|(owner, _), _| *owner != group);
        before - self.detachments.len()
    }

    pub fn labels(&self, group: UnitGroupId) -> Option<&GroupLabels> {
        self.labels.get(&group)
    }

    /// Record the ids the external split handed back
    pub fn relabel(&mut self, group: UnitGroupId, ids: Vec<UnitGroupId>) {
        self.labels.insert(group, GroupLabels::Split(ids));
    }

    /// Number of units of `group` still in the pool
    pub fn units_left(&self, group: UnitGroupId) -> usize {
        self.detachments
            .range((group, 0)..=(group, usize::MAX))
            .map(|(_, d)| d.unit_count())
            .sum()
    }

    /// External ids of everything left in the pool, ascending
    pub fn remaining_ids(&self) -> Vec<UnitGroupId> {
        let mut ids = Vec::new();
        for detachment in self.detachments.values() {
            match self.labels.get(&detachment.group) {
                Some(GroupLabels::Split(split)) => {
                    ids.extend(detachment.unit_indices().filter_map(|i| split.get(i).copied()));
                }
                _ => ids.push(detachment.group),
            }
        }
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn total_rating(&self) -> Rating {
        combine_all(self.detachments.values().map(|d| d.rating()))
    }
}
