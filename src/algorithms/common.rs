use crate::error::Result;
use crate::grid::{GridEnvironment, Point};
use crate::statistics::SearchStats;

/// Ordered sequence of cells from the start to the end of a plan.
pub type Path = Vec<Point>;

pub trait PathfindingAgent {
    fn name(&self) -> &'static str;

    /// Plans across `grid`. `Ok(None)` means no path was found; errors are
    /// reserved for contract violations such as endpoints outside the grid.
    fn traverse(&mut self, grid: &GridEnvironment) -> Result<Option<Path>>;

    /// Statistics of the most recent `traverse` call.
    fn last_stats(&self) -> SearchStats {
        SearchStats::default()
    }
}

/// Fails with `OutOfBounds` unless both endpoints lie on the grid.
pub(crate) fn check_endpoints(grid: &GridEnvironment, start: Point, goal: Point) -> Result<()> {
    grid.state(start.x, start.y)?;
    grid.state(goal.x, goal.y)?;
    Ok(())
}
