//! Force Allocation - turn-based military force planning and fleet assignment

pub mod allocation;
pub mod assignment;
pub mod core;
pub mod military;
pub mod threat;
pub mod turn;
pub mod world;

pub use turn::{generate_military_orders, run_turn, TurnReport};
