//! Allocation planner integration tests
//!
//! Whole turns run against the in-memory world, checking the plan numbers
//! that fall out of the two passes and the bounded reset.

use force_allocation::allocation::{AllocationPlanner, ShortfallKind, Tier};
use force_allocation::core::config::{load_config, AllocationConfig, BudgetRule};
use force_allocation::core::types::{EmpireId, LocationId, UnitGroupId};
use force_allocation::military::rating_needed;
use force_allocation::threat::ThreatFields;
use force_allocation::turn::run_turn;
use force_allocation::world::{Location, MissionPurpose, StaticWorld, TurnSnapshot, UnitGroup};

const EMPIRE: EmpireId = EmpireId(1);

fn config(rule: BudgetRule) -> AllocationConfig {
    AllocationConfig {
        aggression: 5,
        budget_rule: rule,
        ..AllocationConfig::default()
    }
}

fn threat(local: f64) -> ThreatFields {
    ThreatFields {
        local,
        ..ThreatFields::default()
    }
}

/// Single-unit group whose rating is exactly `rating`
fn group(id: u32, location: u32, rating: f64) -> UnitGroup {
    UnitGroup::new(UnitGroupId(id), EMPIRE, LocationId(location)).with_uniform_units(1, rating, 1.0)
}

/// Threat 100 at the capital with a budget of 1000
#[test]
fn test_capital_minimum_and_remaining_budget() {
    let mut world = StaticWorld::new();
    world.add_location(
        Location::new(LocationId(1), "Capital")
            .with_owner(EMPIRE)
            .with_tier(Tier::CapitalDefense)
            .with_threat(threat(100.0)),
    );
    world.add_group(group(1, 1, 1000.0));

    let config = config(BudgetRule::Linear);
    let mut snapshot = TurnSnapshot::capture(&world, EMPIRE);
    let plan = AllocationPlanner::new(&config).plan(&mut snapshot);

    let entry = plan.entry(LocationId(1)).expect("capital entry");
    assert!((entry.min_rating - 140.0).abs() < 1e-9);
    assert!((entry.pass1_granted - 140.0).abs() < 1e-9);
    assert!((plan.remaining_after_minimums - 860.0).abs() < 1e-9);
    // Pass 2 tops the capital up to its 2.0x maximum
    assert!((entry.granted - 200.0).abs() < 1e-9);
    assert!((plan.remaining - 800.0).abs() < 1e-9);
    assert_eq!(plan.resets, 0);
}

/// Budget 50 against a capital minimum of 80
#[test]
fn test_capital_reset_then_take_any_partial() {
    let mut world = StaticWorld::new();
    world.add_location(
        Location::new(LocationId(1), "Capital")
            .with_owner(EMPIRE)
            .with_tier(Tier::CapitalDefense)
            .with_threat(threat(40.0)),
    );
    world.add_group(group(1, 1, 50.0));

    let mut config = config(BudgetRule::Concentration);
    config.tiers.get_mut(Tier::CapitalDefense).min_factor = 2.0;
    config.tiers.get_mut(Tier::CapitalDefense).max_factor = 2.0;

    let report = run_turn(&mut world, EMPIRE, &config);
    assert_eq!(report.plan.resets, 1);

    let entry = report.plan.entry(LocationId(1)).expect("capital entry");
    assert!(entry.take_any);
    assert!((entry.granted - 50.0).abs() < 1e-9);

    let budget: Vec<_> = report.shortfalls_of(ShortfallKind::InsufficientBudget).collect();
    assert_eq!(budget.len(), 1);
    let expected = rating_needed(80.0, 50.0);
    assert!((budget[0].missing - expected).abs() < 1e-9);
    assert!((budget[0].missing - 3.431_457_5).abs() < 1e-6);

    // The partial grant is still realized
    assert_eq!(world.issued_missions().len(), 1);
    assert_eq!(world.issued_missions()[0].purpose, MissionPurpose::Defend);
}

/// A location flagged for two tiers is only planned once
#[test]
fn test_doubly_flagged_location_planned_once() {
    let mut world = StaticWorld::new();
    world.add_location(
        Location::new(LocationId(1), "Contested")
            .with_owner(EMPIRE)
            .with_tier(Tier::PlanetDefense)
            .with_threat(threat(30.0)),
    );
    world.add_location(Location::new(LocationId(2), "Prize").with_threat(threat(10.0)));
    world.connect(LocationId(1), LocationId(2));
    world.set_priority_targets(Tier::TopTarget, vec![LocationId(1), LocationId(2)]);
    world.add_group(group(1, 1, 500.0));

    let report = run_turn(&mut world, EMPIRE, &config(BudgetRule::Concentration));
    let contested: Vec<_> = report
        .plan
        .entries
        .iter()
        .filter(|e| e.location == LocationId(1))
        .collect();
    assert_eq!(contested.len(), 1);
    assert_eq!(contested[0].tier, Tier::PlanetDefense);
    assert_eq!(report.plan.entries_for(Tier::TopTarget).count(), 1);
}

#[test]
fn test_planet_requests_are_capped() {
    let mut world = StaticWorld::new();
    world.add_location(
        Location::new(LocationId(1), "Colony")
            .with_owner(EMPIRE)
            .with_tier(Tier::PlanetDefense)
            .with_threat(threat(300.0)),
    );
    world.add_group(group(1, 1, 1000.0));

    let mut snapshot = TurnSnapshot::capture(&world, EMPIRE);
    let config = config(BudgetRule::Linear);
    let plan = AllocationPlanner::new(&config).plan(&mut snapshot);

    let entry = plan.entry(LocationId(1)).expect("colony entry");
    assert!(entry.max_rating <= 500.0 + 1e-9);
    assert!(entry.granted <= 500.0 + 1e-9);
}

#[test]
fn test_existing_garrison_skips_location() {
    let mut world = StaticWorld::new();
    world.add_location(
        Location::new(LocationId(1), "Fortress")
            .with_owner(EMPIRE)
            .with_tier(Tier::PlanetDefense)
            .with_threat(threat(10.0))
            .with_local_defense(100.0),
    );
    world.add_group(group(1, 1, 50.0));

    let report = run_turn(&mut world, EMPIRE, &config(BudgetRule::Concentration));
    assert!(report.plan.is_empty());
    assert!(report.shortfalls.is_empty());
    assert_eq!(report.unassigned, vec![UnitGroupId(1)]);
}

#[test]
fn test_shipped_config_drives_the_same_plan() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/allocation_default.toml");
    let shipped = load_config(&path).expect("shipped config loads");

    let build = || {
        let mut world = StaticWorld::new();
        world.add_location(
            Location::new(LocationId(1), "Capital")
                .with_owner(EMPIRE)
                .with_tier(Tier::CapitalDefense)
                .with_threat(threat(25.0)),
        );
        world.add_group(group(1, 1, 400.0));
        world
    };

    let from_file = run_turn(&mut build(), EMPIRE, &shipped);
    let built_in = run_turn(&mut build(), EMPIRE, &AllocationConfig::default());
    assert_eq!(from_file.plan.entries, built_in.plan.entries);
}

#[test]
fn test_identical_snapshots_give_identical_reports() {
    let build = || {
        let mut world = StaticWorld::new();
        for id in 1..=4 {
            world.add_location(
                Location::new(LocationId(id), format!("L{id}"))
                    .with_tier(if id == 1 { Tier::CapitalDefense } else { Tier::Blockade })
                    .with_threat(threat(10.0 * id as f64)),
            );
        }
        for id in 1..4 {
            world.connect(LocationId(id), LocationId(id + 1));
        }
        world.add_group(
            UnitGroup::new(UnitGroupId(1), EMPIRE, LocationId(1)).with_uniform_units(5, 4.0, 6.0),
        );
        world.add_group(group(2, 3, 90.0));
        world
    };

    let config = config(BudgetRule::Concentration);
    let first = run_turn(&mut build(), EMPIRE, &config);
    let second = run_turn(&mut build(), EMPIRE, &config);
    assert_eq!(first.plan.entries, second.plan.entries);
    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.unassigned, second.unassigned);
}
