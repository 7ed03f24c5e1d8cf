//! Per-turn entry point: snapshot, plan, assign, commit
//!
//! Nothing in here can fail. Every problem degrades into a shortfall record
//! in the returned report.

use serde::{Deserialize, Serialize};

use crate::allocation::planner::AllocationPlanner;
use crate::allocation::request::AllocationPlan;
use crate::allocation::shortfall::{Shortfall, ShortfallKind};
use crate::assignment::executor::{Assignment, AssignmentExecutor};
use crate::core::config::AllocationConfig;
use crate::core::types::{EmpireId, UnitGroupId};
use crate::world::interface::{FleetControl, WorldView};
use crate::world::snapshot::TurnSnapshot;

/// Everything the engine decided this turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReport {
    pub empire: EmpireId,
    pub plan: AllocationPlan,
    pub assignments: Vec<Assignment>,
    /// Snapshot, budget and assignment shortfalls, in that order
    pub shortfalls: Vec<Shortfall>,
    pub unassigned: Vec<UnitGroupId>,
}

impl TurnReport {
    pub fn missions_issued(&self) -> usize {
        self.assignments.iter().map(|a| a.groups.len()).sum()
    }

    pub fn shortfalls_of(&self, kind: ShortfallKind) -> impl Iterator<Item = &Shortfall> {
        self.shortfalls.iter().filter(move |s| s.kind == kind)
    }
}

/// Generate this turn's military orders for `empire`
///
/// `world` is read once up front; `fleets` receives every split and mission.
pub fn generate_military_orders<W, F>(
    world: &W,
    fleets: &mut F,
    empire: EmpireId,
    config: &AllocationConfig,
) -> TurnReport
where
    W: WorldView + ?Sized,
    F: FleetControl + ?Sized,
{
    let snapshot = TurnSnapshot::capture(world, empire);
    orders_from_snapshot(snapshot, fleets, config)
}

/// Same as `generate_military_orders` for a game object that is both the
/// world view and the fleet controller
pub fn run_turn<G>(game: &mut G, empire: EmpireId, config: &AllocationConfig) -> TurnReport
where
    G: WorldView + FleetControl + ?Sized,
{
    let snapshot = TurnSnapshot::capture(&*game, empire);
    orders_from_snapshot(snapshot, game, config)
}

fn orders_from_snapshot<F>(
    mut snapshot: TurnSnapshot,
    fleets: &mut F,
    config: &AllocationConfig,
) -> TurnReport
where
    F: FleetControl + ?Sized,
{
    let empire = snapshot.empire();
    let span = tracing::info_span!("military_orders", empire = empire.0);
    let _enter = span.enter();

    let mut shortfalls: Vec<Shortfall> = snapshot
        .issues()
        .iter()
        .map(|issue| {
            Shortfall::new(ShortfallKind::MalformedSnapshot, issue.to_string())
                .at_location(issue.location())
        })
        .collect();

    let plan = AllocationPlanner::new(config).plan(&mut snapshot);
    shortfalls.extend(plan.shortfalls.iter().cloned());

    let execution = AssignmentExecutor::new(config, &snapshot).execute(&plan, fleets);
    shortfalls.extend(execution.shortfalls);

    let report = TurnReport {
        empire,
        plan,
        assignments: execution.assignments,
        shortfalls,
        unassigned: execution.unassigned,
    };
    tracing::info!(
        entries = report.plan.entries.len(),
        missions = report.missions_issued(),
        shortfalls = report.shortfalls.len(),
        unassigned = report.unassigned.len(),
        "turn orders generated"
    );
    report
}
