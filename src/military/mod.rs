//! Force rating arithmetic shared by the planner and the fleet finder

pub mod budget;
pub mod rating;

pub use budget::Budget;
pub use rating::{combine, combine_all, rating_needed};
