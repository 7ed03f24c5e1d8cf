//! Allocation simulator
//! Generates a seeded star map, runs the engine for a few turns and reports
//! what it decided

use ahash::AHashMap;
use clap::Parser;
use force_allocation::allocation::Tier;
use force_allocation::core::config::{load_config, AllocationConfig};
use force_allocation::core::error::Result;
use force_allocation::core::types::{EmpireId, LocationId, Rating, UnitGroupId};
use force_allocation::threat::ThreatEstimator;
use force_allocation::turn::{run_turn, TurnReport};
use force_allocation::world::{Location, StaticWorld, UnitGroup};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

const EMPIRE: EmpireId = EmpireId(1);

/// Allocation Sim - exercise force allocation on a random map
#[derive(Parser, Debug)]
#[command(name = "allocation_sim")]
#[command(about = "Run the force allocation engine on a seeded random scenario")]
struct Args {
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of map locations
    #[arg(long, default_value_t = 24)]
    locations: u32,

    /// Number of friendly unit groups
    #[arg(long, default_value_t = 12)]
    groups: u32,

    /// Turns to simulate
    #[arg(long, default_value_t = 1)]
    turns: u32,

    /// TOML configuration; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured aggression (0-5)
    #[arg(long)]
    aggression: Option<usize>,

    /// Print each turn report as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("force_allocation=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AllocationConfig::default(),
    };
    if let Some(aggression) = args.aggression {
        config.aggression = aggression;
    }
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut world = generate_world(&mut rng, args.locations.max(2), args.groups);
    tracing::info!(
        seed = args.seed,
        locations = args.locations,
        groups = args.groups,
        "scenario generated"
    );

    for turn in 1..=args.turns {
        refresh_threats(&mut rng, &mut world, args.locations.max(2));
        let report = run_turn(&mut world, EMPIRE, &config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(turn, &report);
        }
        world.clear_log();
    }

    Ok(())
}

/// A ring of locations with random chords; the empire holds the first quarter
fn generate_world(rng: &mut ChaCha8Rng, count: u32, groups: u32) -> StaticWorld {
    let mut world = StaticWorld::new();
    let owned = (count / 4).max(1);

    for id in 0..count {
        let mut location = Location::new(LocationId(id), format!("System {id}"));
        if id < owned {
            location = location
                .with_owner(EMPIRE)
                .with_local_defense(rng.gen_range(0.0..40.0));
            location = if id == 0 {
                location.with_tier(Tier::CapitalDefense)
            } else {
                location.with_tier(Tier::PlanetDefense)
            };
        } else if id == owned {
            location = location.with_tier(Tier::BorderSecurity);
        } else if rng.gen_bool(0.2) {
            location = location.unexplored();
        } else if rng.gen_bool(0.3) {
            location = location.with_tier(Tier::Exploration);
        } else if rng.gen_bool(0.3) {
            location = location.with_tier(Tier::Blockade);
        }
        world.add_location(location);
    }

    for id in 0..count {
        world.connect(LocationId(id), LocationId((id + 1) % count));
    }
    for _ in 0..count / 3 {
        let a = rng.gen_range(0..count);
        let b = rng.gen_range(0..count);
        if a != b {
            world.connect(LocationId(a), LocationId(b));
        }
    }

    let targets: Vec<LocationId> = (owned + 1..count)
        .filter(|_| rng.gen_bool(0.15))
        .map(LocationId)
        .collect();
    let (top, other) = targets.split_at(targets.len() / 2);
    world.set_priority_targets(Tier::TopTarget, top.to_vec());
    world.set_priority_targets(Tier::OtherTarget, other.to_vec());

    for id in 0..groups {
        let units = rng.gen_range(1..=6);
        let attack = rng.gen_range(1.0..6.0);
        let health = rng.gen_range(2.0..10.0);
        let home = LocationId(rng.gen_range(0..owned));
        let mut group =
            UnitGroup::new(UnitGroupId(id + 1), EMPIRE, home).with_uniform_units(units, attack, health);
        if rng.gen_bool(0.25) {
            group = group.with_range(rng.gen_range(1..=4));
        }
        world.add_group(group);
    }
    world
}

/// Scatter hostile force over non-owned space and propagate it
fn refresh_threats(rng: &mut ChaCha8Rng, world: &mut StaticWorld, count: u32) {
    let mut hostile: AHashMap<LocationId, Rating> = AHashMap::new();
    for id in 0..count {
        if rng.gen_bool(0.3) {
            hostile.insert(LocationId(id), rng.gen_range(5.0..120.0));
        }
    }

    let fields = ThreatEstimator::default().estimate(world.adjacency(), &hostile);
    for (id, threat) in fields {
        if let Some(location) = world.location_mut(id) {
            location.threat = threat;
        }
    }
}

fn print_summary(turn: u32, report: &TurnReport) {
    println!("=== Turn {turn} ===");
    println!(
        "budget {:.1}, after minimums {:.1}, left {:.1}, resets {}",
        report.plan.starting_budget,
        report.plan.remaining_after_minimums,
        report.plan.remaining,
        report.plan.resets
    );
    for entry in &report.plan.entries {
        println!(
            "  {:<16} {:<8} min {:>7.1} granted {:>7.1} max {:>7.1}{}",
            entry.tier.to_string(),
            entry.location.to_string(),
            entry.min_rating,
            entry.granted,
            entry.max_rating,
            if entry.take_any { " (take any)" } else { "" }
        );
    }
    for assignment in &report.assignments {
        println!(
            "  -> {:?} {} with {} group(s), {:.1} (pass {})",
            assignment.purpose,
            assignment.location,
            assignment.groups.len(),
            assignment.achieved,
            assignment.pass
        );
    }
    for shortfall in &report.shortfalls {
        println!(
            "  ! {} at {:?}: missing {:.1} ({})",
            shortfall.kind, shortfall.location, shortfall.missing, shortfall.detail
        );
    }
    println!("  idle groups: {}", report.unassigned.len());
}
