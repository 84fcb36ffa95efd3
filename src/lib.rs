//! Grid motion planning: uninformed search, A*, time-bounded real-time A*
//! and RRT over a shared occupancy grid, plus a comparison driver.

pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod statistics;

pub use error::{PlanningError, Result};
pub use grid::{CellState, GridEnvironment, Point};
