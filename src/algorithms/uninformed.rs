use crate::algorithms::common::{check_endpoints, Path, PathfindingAgent};
use crate::algorithms::node::{NodeArena, NodeId};
use crate::error::Result;
use crate::grid::{GridEnvironment, Point};
use crate::statistics::SearchStats;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::time::Instant;

/// Which end of the frontier the next node is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierOrder {
    /// Queue discipline: breadth-first search.
    Fifo,
    /// Stack discipline: depth-first search.
    Lifo,
}

/// Frontier, closed set and node storage of one uninformed search.
///
/// Membership in `open` and `closed` is keyed by position only, so a cell is
/// never queued twice however it was reached.
#[derive(Debug, Default)]
pub struct UninformedState {
    arena: NodeArena,
    frontier: VecDeque<NodeId>,
    open: FxHashSet<Point>,
    closed: FxHashSet<Point>,
}

impl UninformedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.frontier.clear();
        self.open.clear();
        self.closed.clear();
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn closed(&self) -> &FxHashSet<Point> {
        &self.closed
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    fn pop(&mut self, order: FrontierOrder) -> Option<NodeId> {
        match order {
            FrontierOrder::Fifo => self.frontier.pop_front(),
            FrontierOrder::Lifo => self.frontier.pop_back(),
        }
    }
}

/// Runs a breadth- or depth-first search from `start` to `goal`, starting
/// from a cleared `state`.
pub fn search(
    grid: &GridEnvironment,
    start: Point,
    goal: Point,
    order: FrontierOrder,
    state: &mut UninformedState,
    stats: &mut SearchStats,
) -> Option<Path> {
    state.clear();
    let root = state.arena.insert_root(start);
    state.frontier.push_back(root);
    state.open.insert(start);

    while let Some(id) = state.pop(order) {
        let position = state.arena.position(id);
        state.open.remove(&position);
        state.closed.insert(position);
        stats.expanded += 1;

        if position == goal {
            return Some(state.arena.reconstruct_path(id));
        }

        for neighbor in grid.neighbors(position.x, position.y) {
            if state.closed.contains(&neighbor) || state.open.contains(&neighbor) {
                continue;
            }
            let child = state.arena.insert(neighbor, id);
            state.open.insert(neighbor);
            state.frontier.push_back(child);
            stats.generated += 1;
        }
    }
    None
}

/// Breadth-first or depth-first agent. Both share `search` and differ only
/// in their `FrontierOrder`.
#[derive(Debug, Clone)]
pub struct UninformedAgent {
    order: FrontierOrder,
    stats: SearchStats,
}

impl UninformedAgent {
    pub fn new(order: FrontierOrder) -> Self {
        UninformedAgent {
            order,
            stats: SearchStats::default(),
        }
    }

    pub fn breadth_first() -> Self {
        Self::new(FrontierOrder::Fifo)
    }

    pub fn depth_first() -> Self {
        Self::new(FrontierOrder::Lifo)
    }

    pub fn order(&self) -> FrontierOrder {
        self.order
    }

    /// Like `traverse`, but searches inside a caller-owned state so the
    /// explored tree can be inspected afterwards.
    pub fn traverse_with(
        &mut self,
        grid: &GridEnvironment,
        state: &mut UninformedState,
    ) -> Result<Option<Path>> {
        let (start, goal) = (grid.start(), grid.goal());
        check_endpoints(grid, start, goal)?;

        let timer = Instant::now();
        let mut stats = SearchStats::default();
        let path = search(grid, start, goal, self.order, state, &mut stats);
        stats.elapsed = timer.elapsed();
        self.stats = stats;

        log::debug!(
            "{} from {} to {}: {} ({})",
            self.name(),
            start,
            goal,
            path.as_ref()
                .map_or_else(|| "no path".to_string(), |p| format!("{} cells", p.len())),
            stats
        );
        Ok(path)
    }
}

impl PathfindingAgent for UninformedAgent {
    fn name(&self) -> &'static str {
        match self.order {
            FrontierOrder::Fifo => "bfs",
            FrontierOrder::Lifo => "dfs",
        }
    }

    fn traverse(&mut self, grid: &GridEnvironment) -> Result<Option<Path>> {
        let mut state = UninformedState::new();
        self.traverse_with(grid, &mut state)
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: usize, height: usize) -> GridEnvironment {
        GridEnvironment::new(width, height, 0, 0, 0.0).unwrap()
    }

    fn assert_connected(path: &[Point]) {
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_bfs_open_grid_diagonal() {
        let grid = open_grid(5, 5);
        let mut bfs = UninformedAgent::breadth_first();
        let path = bfs.traverse(&grid).unwrap().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(4, 4)));
        assert_connected(&path);
    }

    #[test]
    fn test_constructors_pick_frontier_order() {
        assert_eq!(UninformedAgent::breadth_first().order(), FrontierOrder::Fifo);
        assert_eq!(UninformedAgent::depth_first().order(), FrontierOrder::Lifo);
    }

    #[test]
    fn test_dfs_reaches_goal() {
        let grid = open_grid(5, 5);
        let mut dfs = UninformedAgent::depth_first();
        let path = dfs.traverse(&grid).unwrap().unwrap();
        assert!(path.len() >= 5);
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(4, 4)));
        assert_connected(&path);
    }

    #[test]
    fn test_start_is_goal() {
        let grid = open_grid(3, 3)
            .with_endpoints(Point::new(1, 1), Point::new(1, 1))
            .unwrap();
        for mut agent in [UninformedAgent::breadth_first(), UninformedAgent::depth_first()] {
            assert_eq!(agent.traverse(&grid).unwrap(), Some(vec![Point::new(1, 1)]));
        }
    }

    #[test]
    fn test_wall_means_no_path() {
        let mut grid = open_grid(5, 5);
        grid.place_obstacle(2, 0, 1, 5).unwrap();
        for mut agent in [UninformedAgent::breadth_first(), UninformedAgent::depth_first()] {
            assert_eq!(agent.traverse(&grid).unwrap(), None);
            // only the two columns left of the wall are reachable
            assert_eq!(agent.last_stats().expanded, 10);
        }
    }

    #[test]
    fn test_bfs_detours_around_obstacle() {
        let mut grid = open_grid(5, 5)
            .with_endpoints(Point::new(0, 2), Point::new(4, 2))
            .unwrap();
        grid.place_obstacle(2, 0, 1, 4).unwrap();
        let path = UninformedAgent::breadth_first().traverse(&grid).unwrap().unwrap();
        assert!(path.contains(&Point::new(2, 4)));
        assert_eq!(path.len(), 5);
        assert_connected(&path);
    }

    #[test]
    fn test_state_reused_between_calls() {
        let grid = open_grid(6, 4);
        let mut state = UninformedState::new();
        let mut bfs = UninformedAgent::breadth_first();
        let first = bfs.traverse_with(&grid, &mut state).unwrap();
        let second = bfs.traverse_with(&grid, &mut state).unwrap();
        assert_eq!(first, second);
        assert!(state.closed().contains(&Point::new(5, 3)));
        assert!(state.arena().len() >= state.closed().len());
    }

    #[test]
    fn test_occupied_start_still_expands() {
        let mut grid = open_grid(4, 4);
        grid.set_state(0, 0, crate::grid::CellState::Occupied).unwrap();
        let path = UninformedAgent::breadth_first().traverse(&grid).unwrap().unwrap();
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.len(), 4);
    }
}
