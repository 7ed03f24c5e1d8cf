//! World state as seen by the engine for one turn

pub mod interface;
pub mod location;
pub mod snapshot;
pub mod static_world;
pub mod unit_group;

pub use interface::{FleetControl, WorldView};
pub use location::Location;
pub use snapshot::{SnapshotIssue, TurnSnapshot};
pub use static_world::{IssuedMission, StaticWorld};
pub use unit_group::{Capability, CombatUnit, Mission, MissionPurpose, UnitGroup};
