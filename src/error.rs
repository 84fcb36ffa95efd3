//! Error types for grid planning

use thiserror::Error;

/// Result type for grid and planning operations
pub type Result<T> = std::result::Result<T, PlanningError>;

/// Contract violations raised by the grid and the search agents.
///
/// A search that finds no path is not an error; agents report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// Coordinates fall outside `[0, width) x [0, height)`
    #[error("coordinates ({x}, {y}) fall outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// A grid needs at least one row and one column
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A selection that stands for several algorithms was asked to run as one
    #[error("'{name}' selects several algorithms and cannot run as a single one")]
    CompositeAlgorithm { name: &'static str },
}
