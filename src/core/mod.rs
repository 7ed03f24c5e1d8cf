pub mod config;
pub mod error;
pub mod types;

pub use config::{AllocationConfig, BudgetRule};
pub use types::{EmpireId, LocationId, Rating, Turn, UnitGroupId};
