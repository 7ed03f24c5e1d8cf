//! Turn-level force allocation
//!
//! Turns threat estimates into a plan of per-location ratings drawn from one
//! shared budget. Nothing here touches unit groups; the assignment layer
//! realizes the plan afterwards.

pub mod allocator;
pub mod context;
pub mod planner;
pub mod request;
pub mod shortfall;
pub mod tier;

pub use allocator::{allocator_for, AllocationOutcome, Allocator};
pub use context::AllocationContext;
pub use planner::AllocationPlanner;
pub use request::{AllocationPlan, AllocationRequest, PlanEntry, RequestTable};
pub use shortfall::{Shortfall, ShortfallKind};
pub use tier::{Tier, TierSet};
