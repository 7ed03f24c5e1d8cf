//! Realizes an allocation plan as missions on concrete unit groups
//!
//! The main pass walks the plan in tier priority order and asks the finder
//! for each entry's granted rating. Extra passes then revisit entries with
//! progressively looser floors so idle force does not stay idle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::finder::{FinderOutcome, FleetFinder, FleetRequirement, Selection};
use super::pool::{GroupLabels, UnitPool};
use crate::allocation::request::{AllocationPlan, PlanEntry};
use crate::allocation::shortfall::{Shortfall, ShortfallKind};
use crate::allocation::tier::Tier;
use crate::core::config::AllocationConfig;
use crate::core::types::{LocationId, Rating, UnitGroupId};
use crate::military::rating::{combine, rating_needed};
use crate::world::interface::FleetControl;
use crate::world::snapshot::TurnSnapshot;
use crate::world::unit_group::MissionPurpose;

/// Gaps smaller than this are float noise
const NEGLIGIBLE: Rating = 1e-9;

/// Missions issued for one plan entry in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub location: LocationId,
    pub tier: Tier,
    pub purpose: MissionPurpose,
    /// External ids that received the mission
    pub groups: Vec<UnitGroupId>,
    pub achieved: Rating,
    /// 0 is the main pass
    pub pass: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub assignments: Vec<Assignment>,
    pub shortfalls: Vec<Shortfall>,
    /// Groups still without a new mission after every pass
    pub unassigned: Vec<UnitGroupId>,
}

impl ExecutionReport {
    /// Combined rating sent to `location` across all passes
    pub fn achieved_at(&self, location: LocationId) -> Rating {
        self.assignments
            .iter()
            .filter(|a| a.location == location)
            .fold(0.0, |total, a| combine(total, a.achieved))
    }

    fn record(&mut self, shortfall: Shortfall) {
        shortfall.log();
        self.shortfalls.push(shortfall);
    }
}

pub struct AssignmentExecutor<'a> {
    config: &'a AllocationConfig,
    snapshot: &'a TurnSnapshot,
    finder: FleetFinder<'a>,
}

impl<'a> AssignmentExecutor<'a> {
    pub fn new(config: &'a AllocationConfig, snapshot: &'a TurnSnapshot) -> Self {
        Self {
            config,
            snapshot,
            finder: FleetFinder::new(snapshot),
        }
    }

    pub fn execute<F>(&self, plan: &AllocationPlan, fleets: &mut F) -> ExecutionReport
    where
        F: FleetControl + ?Sized,
    {
        let mut pool = UnitPool::from_groups(self.snapshot.available_groups());
        let mut progress: Vec<Rating> = vec![0.0; plan.entries.len()];
        let mut report = ExecutionReport::default();

        for (index, entry) in plan.entries.iter().enumerate() {
            if entry.granted <= NEGLIGIBLE {
                continue;
            }
            let floor = if entry.take_any {
                f64::MIN_POSITIVE
            } else {
                entry.min_rating
            };
            let outcome = self.finder.fulfill(
                entry.location,
                entry.granted,
                entry.max_rating,
                &self.requirement(floor),
                &mut pool,
            );

            match outcome {
                FinderOutcome::Failed { reason, achieved } => {
                    report.record(
                        Shortfall::new(
                            reason.into(),
                            format!("found {achieved:.1} of {:.1} within reach", entry.granted),
                        )
                        .at(entry.location, entry.tier)
                        .amounts(entry.granted, 0.0, entry.granted),
                    );
                }
                FinderOutcome::Fulfilled(selection) => {
                    progress[index] = selection.achieved;
                    self.commit(entry, selection, 0, &mut pool, &mut *fleets, &mut report);
                }
                FinderOutcome::Partial(selection) => {
                    let achieved = selection.achieved;
                    progress[index] = achieved;
                    self.commit(entry, selection, 0, &mut pool, &mut *fleets, &mut report);
                    if achieved < entry.min_rating {
                        report.record(
                            Shortfall::new(ShortfallKind::NoSuitableUnits, "partial force committed")
                                .at(entry.location, entry.tier)
                                .amounts(
                                    entry.min_rating,
                                    achieved,
                                    rating_needed(entry.min_rating, achieved),
                                ),
                        );
                    }
                }
            }
        }

        let floors = &self.config.assignment.extra_pass_floors;
        for (k, &floor) in floors.iter().enumerate() {
            if pool.is_empty() {
                break;
            }
            let last = k + 1 == floors.len();
            for (index, entry) in plan.entries.iter().enumerate() {
                if pool.is_empty() {
                    break;
                }
                let goal = if last { entry.max_rating } else { entry.granted };
                let need = rating_needed(goal, progress[index]);
                if need <= NEGLIGIBLE {
                    continue;
                }
                let headroom = rating_needed(entry.max_rating, progress[index]);
                let requirement = self.requirement((floor * need).max(f64::MIN_POSITIVE));
                let Some(selection) = self
                    .finder
                    .fulfill(entry.location, need, headroom, &requirement, &mut pool)
                    .into_selection()
                else {
                    continue;
                };
                if selection.is_empty() {
                    continue;
                }
                progress[index] = combine(progress[index], selection.achieved);
                self.commit(entry, selection, k + 1, &mut pool, &mut *fleets, &mut report);
            }
        }

        report.unassigned = pool.remaining_ids();
        tracing::info!(
            assignments = report.assignments.len(),
            shortfalls = report.shortfalls.len(),
            unassigned = report.unassigned.len(),
            "assignment complete"
        );
        report
    }

    fn requirement(&self, floor: Rating) -> FleetRequirement {
        FleetRequirement::armed()
            .with_floor(floor)
            .with_max_depth(self.config.assignment.max_search_depth)
    }

    /// Issue missions for a selection, splitting external groups used in part
    fn commit<F>(
        &self,
        entry: &PlanEntry,
        selection: Selection,
        pass: usize,
        pool: &mut UnitPool,
        fleets: &mut F,
        report: &mut ExecutionReport,
    ) where
        F: FleetControl + ?Sized,
    {
        let purpose = entry.tier.mission_purpose();
        let mut by_group: BTreeMap<UnitGroupId, Vec<usize>> = BTreeMap::new();
        for detachment in &selection.detachments {
            by_group
                .entry(detachment.group)
                .or_default()
                .extend(detachment.unit_indices());
        }

        let mut ids = Vec::new();
        for (group, mut units) in by_group {
            units.sort_unstable();
            match pool.labels(group).cloned() {
                Some(GroupLabels::Split(split)) => {
                    ids.extend(units.iter().filter_map(|&i| split.get(i).copied()));
                }
                Some(GroupLabels::Whole { unit_count }) if units.len() < unit_count => {
                    let split = fleets.split_unit_group(group);
                    if split.len() == unit_count {
                        ids.extend(units.iter().filter_map(|&i| split.get(i).copied()));
                        pool.relabel(group, split);
                    } else {
                        tracing::warn!(
                            %group,
                            expected = unit_count,
                            returned = split.len(),
                            "split returned unexpected ids, committing whole group"
                        );
                        pool.remove_group(group);
                        ids.push(group);
                    }
                }
                _ => ids.push(group),
            }
        }

        for id in &ids {
            fleets.set_mission(*id, purpose, entry.location);
        }
        tracing::debug!(
            location = %entry.location,
            tier = %entry.tier,
            ?purpose,
            groups = ids.len(),
            achieved = selection.achieved,
            pass,
            "missions issued"
        );
        report.assignments.push(Assignment {
            location: entry.location,
            tier: entry.tier,
            purpose,
            groups: ids,
            achieved: selection.achieved,
            pass,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EmpireId;
    use crate::world::location::Location;
    use crate::world::static_world::StaticWorld;
    use crate::world::unit_group::UnitGroup;

    const EMPIRE: EmpireId = EmpireId(1);

    fn entry(location: u32, tier: Tier, min: Rating, granted: Rating, max: Rating) -> PlanEntry {
        PlanEntry {
            location: LocationId(location),
            tier,
            threat: min,
            min_rating: min,
            max_rating: max,
            pass1_granted: min.min(granted),
            granted,
            take_any: tier.is_critical(),
        }
    }

    fn plan(entries: Vec<PlanEntry>) -> AllocationPlan {
        AllocationPlan {
            entries,
            ..AllocationPlan::default()
        }
    }

    /// 1 - 2, plus an isolated 3
    fn world() -> StaticWorld {
        let mut world = StaticWorld::new();
        for id in 1..=3 {
            world.add_location(Location::new(LocationId(id), format!("L{id}")));
        }
        world.connect(LocationId(1), LocationId(2));
        world
    }

    fn group(id: u32, location: u32, units: usize, attack: f64, health: f64) -> UnitGroup {
        UnitGroup::new(UnitGroupId(id), EMPIRE, LocationId(location))
            .with_uniform_units(units, attack, health)
    }

    fn run(world: &mut StaticWorld, plan: &AllocationPlan) -> ExecutionReport {
        let config = AllocationConfig::default();
        let snapshot = TurnSnapshot::capture(&*world, EMPIRE);
        AssignmentExecutor::new(&config, &snapshot).execute(plan, world)
    }

    #[test]
    fn test_whole_groups_get_tier_mission() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 5.0, 5.0));
        world.add_group(group(2, 2, 1, 5.0, 5.0));
        let plan = plan(vec![entry(1, Tier::CapitalDefense, 40.0, 40.0, 40.0)]);

        let report = run(&mut world, &plan);
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.assignments[0].groups, vec![UnitGroupId(1), UnitGroupId(2)]);
        assert!((report.achieved_at(LocationId(1)) - 100.0).abs() < 1e-9);
        assert!(world
            .issued_missions()
            .iter()
            .all(|m| m.purpose == MissionPurpose::Defend && m.target == LocationId(1)));
        assert!(world.splits().is_empty());
        assert!(report.unassigned.is_empty());
    }

    #[test]
    fn test_partial_use_splits_once() {
        let mut world = world();
        world.add_group(group(1, 1, 4, 3.0, 5.0));
        let plan = plan(vec![entry(1, Tier::Blockade, 50.0, 50.0, 60.0)]);

        let report = run(&mut world, &plan);
        assert_eq!(world.splits(), &[UnitGroupId(1)]);
        assert_eq!(report.assignments[0].groups, vec![UnitGroupId(1), UnitGroupId(2)]);
        assert_eq!(report.assignments[0].purpose, MissionPurpose::Blockade);
        assert_eq!(report.unassigned, vec![UnitGroupId(3), UnitGroupId(4)]);
    }

    #[test]
    fn test_failed_entry_leaves_pool_for_later_entries() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 10.0, 10.0));
        let plan = plan(vec![
            entry(3, Tier::Blockade, 50.0, 50.0, 50.0),
            entry(2, Tier::Interior, 50.0, 50.0, 50.0),
        ]);

        let report = run(&mut world, &plan);
        assert_eq!(report.shortfalls.len(), 1);
        assert_eq!(report.shortfalls[0].kind, ShortfallKind::GraphUnreachable);
        assert_eq!(report.shortfalls[0].location, Some(LocationId(3)));
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.assignments[0].location, LocationId(2));
        assert_eq!(report.assignments[0].purpose, MissionPurpose::Patrol);
    }

    #[test]
    fn test_take_any_commits_partial_force() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 5.0, 5.0));
        let plan = plan(vec![entry(1, Tier::CapitalDefense, 100.0, 100.0, 100.0)]);

        let report = run(&mut world, &plan);
        assert_eq!(report.assignments.len(), 1);
        assert!((report.achieved_at(LocationId(1)) - 25.0).abs() < 1e-9);
        let shortfall = &report.shortfalls[0];
        assert_eq!(shortfall.kind, ShortfallKind::NoSuitableUnits);
        assert!((shortfall.missing - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_below_minimum_without_take_any_waits_for_last_pass() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 5.0, 5.0));
        let plan = plan(vec![entry(1, Tier::TopTarget, 100.0, 100.0, 100.0)]);

        let report = run(&mut world, &plan);
        assert_eq!(report.shortfalls[0].kind, ShortfallKind::NoSuitableUnits);
        // Neither the main pass nor the half-floor pass accepts 25 of 100
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.assignments[0].pass, 2);
        assert_eq!(world.issued_missions().len(), 1);
        assert!(report.unassigned.is_empty());
    }

    #[test]
    fn test_without_extra_passes_idle_force_stays() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 5.0, 5.0));
        let plan = plan(vec![entry(1, Tier::TopTarget, 100.0, 100.0, 100.0)]);
        let mut config = AllocationConfig::default();
        config.assignment.extra_pass_floors.clear();
        let snapshot = TurnSnapshot::capture(&world, EMPIRE);

        let report = AssignmentExecutor::new(&config, &snapshot).execute(&plan, &mut world);
        assert!(world.issued_missions().is_empty());
        assert_eq!(report.unassigned, vec![UnitGroupId(1)]);
    }

    #[test]
    fn test_last_pass_sends_idle_force_toward_maximum() {
        let mut world = world();
        world.add_group(group(1, 1, 1, 5.0, 5.0));
        world.add_group(group(2, 2, 1, 5.0, 5.0));
        let plan = plan(vec![entry(1, Tier::PlanetDefense, 25.0, 25.0, 100.0)]);

        let report = run(&mut world, &plan);
        let passes: Vec<usize> = report.assignments.iter().map(|a| a.pass).collect();
        assert_eq!(passes, vec![0, 2]);
        assert!((report.achieved_at(LocationId(1)) - 100.0).abs() < 1e-9);
        assert!(report.unassigned.is_empty());
    }

    /// Fleet control whose split never hands back ids
    #[derive(Default)]
    struct NoSplit {
        missions: Vec<UnitGroupId>,
    }

    impl FleetControl for NoSplit {
        fn set_mission(&mut self, group: UnitGroupId, _purpose: MissionPurpose, _target: LocationId) {
            self.missions.push(group);
        }

        fn split_unit_group(&mut self, _group: UnitGroupId) -> Vec<UnitGroupId> {
            Vec::new()
        }
    }

    #[test]
    fn test_split_mismatch_commits_whole_group() {
        let mut world = world();
        world.add_group(group(1, 1, 4, 3.0, 5.0));
        let plan = plan(vec![entry(1, Tier::Blockade, 50.0, 50.0, 60.0)]);
        let config = AllocationConfig::default();
        let snapshot = TurnSnapshot::capture(&world, EMPIRE);

        let mut fleets = NoSplit::default();
        let report = AssignmentExecutor::new(&config, &snapshot).execute(&plan, &mut fleets);
        assert_eq!(fleets.missions, vec![UnitGroupId(1)]);
        assert!(report.unassigned.is_empty());
    }
}
