//! Property-based tests for rating arithmetic and plan invariants.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use force_allocation::allocation::{AllocationPlanner, Tier};
use force_allocation::assignment::{FinderOutcome, FleetFinder, FleetRequirement, UnitPool};
use force_allocation::core::config::{AllocationConfig, BudgetRule};
use force_allocation::core::types::{EmpireId, LocationId, UnitGroupId};
use force_allocation::military::{combine, rating_needed};
use force_allocation::threat::ThreatFields;
use force_allocation::world::{Location, StaticWorld, TurnSnapshot, UnitGroup};

const EMPIRE: EmpireId = EmpireId(1);

type LocationSpec = (f64, usize);
type GroupSpec = (usize, f64, f64, usize);

/// Chain of locations with the given threats and tiers, plus groups
fn build_world(locations: &[LocationSpec], groups: &[GroupSpec]) -> StaticWorld {
    let mut world = StaticWorld::new();
    for (index, (local, tier)) in locations.iter().enumerate() {
        let id = LocationId(index as u32 + 1);
        world.add_location(
            Location::new(id, format!("L{index}"))
                .with_owner(EMPIRE)
                .with_tier(Tier::ALL[*tier])
                .with_threat(ThreatFields::local(*local)),
        );
        if index > 0 {
            world.connect(LocationId(index as u32), id);
        }
    }
    for (index, (units, attack, health, at)) in groups.iter().enumerate() {
        let location = LocationId((*at % locations.len()) as u32 + 1);
        world.add_group(
            UnitGroup::new(UnitGroupId(index as u32 + 1), EMPIRE, location)
                .with_uniform_units(*units, *attack, *health),
        );
    }
    world
}

fn location_specs() -> impl Strategy<Value = Vec<LocationSpec>> {
    prop::collection::vec((0.0f64..200.0, 0usize..8), 1..8)
}

fn group_specs() -> impl Strategy<Value = Vec<GroupSpec>> {
    prop::collection::vec((1usize..5, 0.5f64..10.0, 0.5f64..10.0, 0usize..8), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_combine_commutes(a in 0.0f64..1e6, b in 0.0f64..1e6) {
        prop_assert_eq!(combine(a, b), combine(b, a));
    }

    #[test]
    fn prop_combine_zero_is_identity(a in 0.0f64..1e6) {
        prop_assert_eq!(combine(a, 0.0), a);
    }

    #[test]
    fn prop_combine_dominates_inputs(a in 0.0f64..1e6, b in 0.0f64..1e6) {
        let c = combine(a, b);
        prop_assert!(c >= a * (1.0 - 1e-12));
        prop_assert!(c >= b * (1.0 - 1e-12));
    }

    #[test]
    fn prop_nothing_needed_when_covered(target in 0.0f64..1e6, extra in 0.0f64..1e6) {
        prop_assert_eq!(rating_needed(target, target + extra), 0.0);
    }

    #[test]
    fn prop_rating_needed_round_trips(current in 0.0f64..1e6, gap in 1e-3f64..1e6) {
        let target = current + gap;
        let restored = combine(current, rating_needed(target, current));
        prop_assert!((restored - target).abs() <= 1e-9 * target.max(1.0));
    }

    #[test]
    fn prop_pass1_within_budget(
        locations in location_specs(),
        groups in group_specs(),
        linear in any::<bool>(),
        aggression in 0usize..6,
    ) {
        let world = build_world(&locations, &groups);
        let config = AllocationConfig {
            aggression,
            budget_rule: if linear { BudgetRule::Linear } else { BudgetRule::Concentration },
            ..AllocationConfig::default()
        };
        let mut snapshot = TurnSnapshot::capture(&world, EMPIRE);
        let plan = AllocationPlanner::new(&config).plan(&mut snapshot);

        let slack = 1e-9 * plan.starting_budget.max(1.0);
        prop_assert!(plan.pass1_total() <= plan.starting_budget + slack);
        prop_assert!(plan.remaining >= 0.0);
        for entry in &plan.entries {
            prop_assert!(entry.granted + slack >= entry.pass1_granted);
            prop_assert!(entry.granted <= entry.max_rating + slack);
        }
    }

    #[test]
    fn prop_each_location_planned_once(
        locations in location_specs(),
        groups in group_specs(),
        ranked in prop::collection::vec(0usize..8, 0..6),
    ) {
        let mut world = build_world(&locations, &groups);
        let targets = ranked
            .iter()
            .map(|i| LocationId((*i % locations.len()) as u32 + 1))
            .collect();
        world.set_priority_targets(Tier::TopTarget, targets);

        let config = AllocationConfig::default();
        let mut snapshot = TurnSnapshot::capture(&world, EMPIRE);
        let plan = AllocationPlanner::new(&config).plan(&mut snapshot);

        let mut seen: Vec<LocationId> = plan.entries.iter().map(|e| e.location).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), total);
    }

    #[test]
    fn prop_finder_meets_minimum_or_restores_pool(
        locations in location_specs(),
        groups in group_specs(),
        min_stat in 1.0f64..2_000.0,
        max_stat in 0.0f64..2_000.0,
        target in 0usize..8,
    ) {
        let world = build_world(&locations, &groups);
        let snapshot = TurnSnapshot::capture(&world, EMPIRE);
        let mut pool = UnitPool::from_groups(snapshot.available_groups());
        let before = pool.total_rating();
        let target = LocationId((target % locations.len()) as u32 + 1);

        let outcome = FleetFinder::new(&snapshot).fulfill(
            target,
            min_stat,
            max_stat,
            &FleetRequirement::armed(),
            &mut pool,
        );
        match outcome {
            FinderOutcome::Fulfilled(selection) => {
                prop_assert!(selection.achieved >= min_stat);
            }
            FinderOutcome::Partial(_) => {
                prop_assert!(false, "no looser floor was supplied");
            }
            FinderOutcome::Failed { .. } => {
                prop_assert!((pool.total_rating() - before).abs() <= 1e-9 * before.max(1.0));
            }
        }
    }
}
