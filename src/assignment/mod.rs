//! Turning a plan into concrete missions
//!
//! `FleetFinder` searches the map outward from each target for available
//! force; `AssignmentExecutor` drives it over the whole plan and is the only
//! place that calls into `FleetControl`.

pub mod executor;
pub mod finder;
pub mod pool;

pub use executor::{Assignment, AssignmentExecutor, ExecutionReport};
pub use finder::{FinderFailure, FinderOutcome, FleetFinder, FleetRequirement, Selection};
pub use pool::{Detachment, DetachmentKey, GroupLabels, UnitPool};
