//! Breadth-first search for force to send to one location

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use super::pool::{Detachment, UnitPool};
use crate::allocation::shortfall::ShortfallKind;
use crate::core::types::{LocationId, Rating};
use crate::military::rating::combine;
use crate::world::snapshot::TurnSnapshot;
use crate::world::unit_group::Capability;

/// Filters and fallbacks for one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRequirement {
    /// Every selected detachment must carry all of these
    pub capabilities: Vec<Capability>,
    /// A search that runs out of graph keeps its selection if it reached this
    pub looser_floor: Rating,
    /// Deepest BFS level to visit; None searches the whole component
    pub max_depth: Option<u32>,
}

impl FleetRequirement {
    /// Armed force, no partial fallback
    pub fn armed() -> Self {
        Self {
            capabilities: vec![Capability::Armed],
            looser_floor: f64::INFINITY,
            max_depth: None,
        }
    }

    pub fn with_floor(mut self, floor: Rating) -> Self {
        self.looser_floor = floor;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth;
        self
    }

    fn accepts(&self, detachment: &Detachment, depth: u32) -> bool {
        detachment.has_capabilities(&self.capabilities) && detachment.reaches(depth)
    }
}

/// Why a search came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinderFailure {
    NoSuitableUnits,
    GraphUnreachable,
}

impl From<FinderFailure> for ShortfallKind {
    fn from(failure: FinderFailure) -> Self {
        match failure {
            FinderFailure::NoSuitableUnits => ShortfallKind::NoSuitableUnits,
            FinderFailure::GraphUnreachable => ShortfallKind::GraphUnreachable,
        }
    }
}

/// Detachments removed from the pool for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub detachments: Vec<Detachment>,
    pub achieved: Rating,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.detachments.is_empty()
    }

    fn push(&mut self, detachment: Detachment) {
        self.achieved = combine(self.achieved, detachment.rating());
        self.detachments.push(detachment);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FinderOutcome {
    /// Reached `min_stat`
    Fulfilled(Selection),
    /// Ran out of graph below `min_stat` but at or above the looser floor
    Partial(Selection),
    /// Nothing taken; the pool is as it was
    Failed {
        reason: FinderFailure,
        achieved: Rating,
    },
}

impl FinderOutcome {
    pub fn achieved(&self) -> Rating {
        match self {
            FinderOutcome::Fulfilled(selection) | FinderOutcome::Partial(selection) => {
                selection.achieved
            }
            FinderOutcome::Failed { .. } => 0.0,
        }
    }

    pub fn into_selection(self) -> Option<Selection> {
        match self {
            FinderOutcome::Fulfilled(selection) | FinderOutcome::Partial(selection) => {
                Some(selection)
            }
            FinderOutcome::Failed { .. } => None,
        }
    }
}

pub struct FleetFinder<'a> {
    snapshot: &'a TurnSnapshot,
}

impl<'a> FleetFinder<'a> {
    pub fn new(snapshot: &'a TurnSnapshot) -> Self {
        Self { snapshot }
    }

    /// Collect at least `min_stat` around `target`, nearest force first
    ///
    /// A multi-unit detachment that would overshoot `max_stat` is broken into
    /// single units so only what is needed leaves the pool. On failure every
    /// tentatively taken detachment is returned to the pool.
    pub fn fulfill(
        &self,
        target: LocationId,
        min_stat: Rating,
        max_stat: Rating,
        requirement: &FleetRequirement,
        pool: &mut UnitPool,
    ) -> FinderOutcome {
        let mut selection = Selection::default();
        if min_stat <= 0.0 {
            return FinderOutcome::Fulfilled(selection);
        }

        let Some(origin) = self.snapshot.location(target) else {
            return FinderOutcome::Failed {
                reason: FinderFailure::GraphUnreachable,
                achieved: 0.0,
            };
        };
        let has_exit = origin.explored && origin.neighbors.iter().any(|n| self.is_explored(*n));
        if !has_exit && pool.keys_at(target).is_empty() {
            return FinderOutcome::Failed {
                reason: FinderFailure::GraphUnreachable,
                achieved: 0.0,
            };
        }

        let mut visited = AHashSet::new();
        let mut frontier = VecDeque::new();
        visited.insert(target);
        frontier.push_back((target, 0u32));

        while let Some((node, depth)) = frontier.pop_front() {
            for key in pool.keys_at(node) {
                let Some(candidate) = pool.get(key) else {
                    continue;
                };
                if !requirement.accepts(candidate, depth) {
                    continue;
                }

                let overshoots = combine(selection.achieved, candidate.rating()) > max_stat;
                if candidate.unit_count() > 1 && overshoots {
                    for single in pool.split(key) {
                        if let Some(detachment) = pool.take(single) {
                            selection.push(detachment);
                        }
                        if selection.achieved >= min_stat {
                            break;
                        }
                    }
                } else if let Some(detachment) = pool.take(key) {
                    selection.push(detachment);
                }

                if selection.achieved >= min_stat {
                    tracing::trace!(
                        %target,
                        achieved = selection.achieved,
                        detachments = selection.detachments.len(),
                        "request fulfilled"
                    );
                    return FinderOutcome::Fulfilled(selection);
                }
            }

            if requirement.max_depth.is_some_and(|max| depth >= max) || !self.is_explored(node) {
                continue;
            }
            for &neighbor in self.snapshot.neighbors(node) {
                if self.is_explored(neighbor) && visited.insert(neighbor) {
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        if !selection.is_empty() && selection.achieved >= requirement.looser_floor {
            tracing::trace!(%target, achieved = selection.achieved, min_stat, "partial selection kept");
            return FinderOutcome::Partial(selection);
        }

        let achieved = selection.achieved;
        for detachment in selection.detachments {
            pool.restore(detachment);
        }
        FinderOutcome::Failed {
            reason: FinderFailure::NoSuitableUnits,
            achieved,
        }
    }

    fn is_explored(&self, location: LocationId) -> bool {
        self.snapshot
            .location(location)
            .is_some_and(|l| l.explored)
    }
}
