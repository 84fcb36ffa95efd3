use crate::algorithms::common::{check_endpoints, Path, PathfindingAgent};
use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::node::{NodeArena, NodeId, ScoredSearchNode, TieBreak};
use crate::error::Result;
use crate::grid::{GridEnvironment, Point};
use crate::statistics::SearchStats;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BinaryHeap;
use std::time::Instant;

/// Priority frontier, closed set and node storage of an A* search.
///
/// Frontier and closed membership are keyed by position. A position sits in
/// the frontier at most once with its best known `g`; superseded heap entries
/// are dropped lazily when they surface.
#[derive(Debug, Default)]
pub struct AStarState {
    arena: NodeArena,
    open: BinaryHeap<ScoredSearchNode>,
    open_costs: FxHashMap<Point, u32>,
    closed: FxHashSet<Point>,
    next_sequence: u64,
}

impl AStarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.open.clear();
        self.open_costs.clear();
        self.closed.clear();
        self.next_sequence = 0;
    }

    /// True until a root has been pushed.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn closed(&self) -> &FxHashSet<Point> {
        &self.closed
    }

    /// Positions currently waiting in the frontier.
    pub fn frontier_len(&self) -> usize {
        self.open_costs.len()
    }

    pub fn in_frontier(&self, position: &Point) -> bool {
        self.open_costs.contains_key(position)
    }

    pub(crate) fn push_root(&mut self, position: Point, h: f64, tie_break: TieBreak) -> NodeId {
        let id = self.arena.insert_root(position);
        self.enqueue(id, position, 0, h, tie_break);
        id
    }

    fn push(&mut self, position: Point, parent: NodeId, g: u32, f: f64, tie_break: TieBreak) {
        let id = self.arena.insert(position, parent);
        self.enqueue(id, position, g, f, tie_break);
    }

    fn enqueue(&mut self, id: NodeId, position: Point, g: u32, f: f64, tie_break: TieBreak) {
        self.open
            .push(ScoredSearchNode::new(id, g, f, self.next_sequence, tie_break));
        self.next_sequence += 1;
        self.open_costs.insert(position, g);
    }

    fn discard_stale(&mut self) {
        while let Some(head) = self.open.peek() {
            let position = self.arena.position(head.id);
            if self.open_costs.get(&position) == Some(&head.g) {
                break;
            }
            self.open.pop();
        }
    }

    fn pop(&mut self) -> Option<ScoredSearchNode> {
        self.discard_stale();
        let node = self.open.pop()?;
        self.open_costs.remove(&self.arena.position(node.id));
        Some(node)
    }

    /// The live entry with the lowest f-score, without removing it.
    pub fn head(&mut self) -> Option<ScoredSearchNode> {
        self.discard_stale();
        self.open.peek().copied()
    }
}

/// How an expansion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expansion {
    Goal(NodeId),
    Exhausted,
    Interrupted,
}

/// Expands nodes in f-order until the goal is popped, the frontier empties,
/// or `should_stop` returns true. `should_stop` is consulted before every pop.
///
/// Every move costs one step. A neighbour is skipped when closed, or when the
/// frontier already holds it at an equal or lower cost.
pub(crate) fn expand<F>(
    grid: &GridEnvironment,
    goal: Point,
    heuristic: Heuristic,
    tie_break: TieBreak,
    state: &mut AStarState,
    stats: &mut SearchStats,
    mut should_stop: F,
) -> Expansion
where
    F: FnMut() -> bool,
{
    loop {
        if should_stop() {
            return Expansion::Interrupted;
        }
        let Some(current) = state.pop() else {
            return Expansion::Exhausted;
        };
        let position = state.arena.position(current.id);
        state.closed.insert(position);
        stats.expanded += 1;

        if position == goal {
            return Expansion::Goal(current.id);
        }

        let g = current.g + 1;
        for neighbor in grid.neighbors(position.x, position.y) {
            if state.closed.contains(&neighbor) {
                continue;
            }
            if matches!(state.open_costs.get(&neighbor), Some(&queued) if queued <= g) {
                continue;
            }
            let f = f64::from(g) + heuristic.distance(neighbor, goal);
            state.push(neighbor, current.id, g, f, tie_break);
            stats.generated += 1;
        }
    }
}

/// A* over the 8-connected grid with unit move cost.
///
/// Optimal when the heuristic never overestimates the remaining step count,
/// which holds for `Heuristic::Chebyshev`. The other heuristics can
/// overestimate diagonal progress and trade optimality for fewer expansions.
#[derive(Debug, Clone)]
pub struct AStarAgent {
    heuristic: Heuristic,
    tie_break: TieBreak,
    stats: SearchStats,
}

impl AStarAgent {
    pub fn new(heuristic: Heuristic) -> Self {
        AStarAgent {
            heuristic,
            tie_break: TieBreak::default(),
            stats: SearchStats::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn set_heuristic(&mut self, heuristic: Heuristic) {
        self.heuristic = heuristic;
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Like `traverse`, but searches inside a caller-owned state. The state is
    /// cleared first.
    pub fn traverse_with(
        &mut self,
        grid: &GridEnvironment,
        state: &mut AStarState,
    ) -> Result<Option<Path>> {
        let (start, goal) = (grid.start(), grid.goal());
        check_endpoints(grid, start, goal)?;

        let timer = Instant::now();
        let mut stats = SearchStats::default();
        state.clear();
        state.push_root(start, self.heuristic.distance(start, goal), self.tie_break);

        let path = match expand(
            grid,
            goal,
            self.heuristic,
            self.tie_break,
            state,
            &mut stats,
            || false,
        ) {
            Expansion::Goal(id) => Some(state.arena.reconstruct_path(id)),
            Expansion::Exhausted | Expansion::Interrupted => None,
        };
        stats.elapsed = timer.elapsed();
        self.stats = stats;

        log::debug!(
            "a* ({}) from {} to {}: {} ({})",
            self.heuristic,
            start,
            goal,
            path.as_ref()
                .map_or_else(|| "no path".to_string(), |p| format!("{} cells", p.len())),
            stats
        );
        Ok(path)
    }
}

impl Default for AStarAgent {
    fn default() -> Self {
        Self::new(Heuristic::default())
    }
}

impl PathfindingAgent for AStarAgent {
    fn name(&self) -> &'static str {
        "a_star"
    }

    fn traverse(&mut self, grid: &GridEnvironment) -> Result<Option<Path>> {
        let mut state = AStarState::new();
        self.traverse_with(grid, &mut state)
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::uninformed::UninformedAgent;

    fn open_grid(width: usize, height: usize) -> GridEnvironment {
        GridEnvironment::new(width, height, 0, 0, 0.0).unwrap()
    }

    #[test]
    fn test_octile_open_grid() {
        let grid = open_grid(5, 5);
        let mut agent = AStarAgent::new(Heuristic::Octile);
        let path = agent.traverse(&grid).unwrap().unwrap();
        assert_eq!(
            path,
            (0..5).map(|i| Point::new(i, i)).collect::<Vec<_>>()
        );
        assert_eq!(agent.last_stats().expanded, 5);
    }

    #[test]
    fn test_every_heuristic_reaches_goal() {
        let mut grid = open_grid(8, 6)
            .with_endpoints(Point::new(0, 5), Point::new(7, 0))
            .unwrap();
        grid.place_obstacle(3, 1, 2, 5).unwrap();
        for heuristic in [
            Heuristic::Euclidean,
            Heuristic::Manhattan,
            Heuristic::Octile,
            Heuristic::Chebyshev,
        ] {
            let path = AStarAgent::new(heuristic).traverse(&grid).unwrap().unwrap();
            assert_eq!(path.first(), Some(&Point::new(0, 5)), "{}", heuristic);
            assert_eq!(path.last(), Some(&Point::new(7, 0)), "{}", heuristic);
            for pair in path.windows(2) {
                assert!(pair[0].is_adjacent(&pair[1]));
                assert!(grid.is_valid(pair[1].x, pair[1].y));
            }
        }
    }

    #[test]
    fn test_tie_break_defaults_to_first_inserted() {
        let agent = AStarAgent::new(Heuristic::Chebyshev);
        assert_eq!(agent.tie_break(), TieBreak::FirstInserted);
        let agent = agent.with_tie_break(TieBreak::LastInserted);
        assert_eq!(agent.tie_break(), TieBreak::LastInserted);
    }

    #[test]
    fn test_chebyshev_matches_bfs_length() {
        let mut grid = open_grid(10, 10)
            .with_endpoints(Point::new(0, 0), Point::new(9, 2))
            .unwrap();
        grid.place_obstacle(2, 0, 1, 8).unwrap();
        grid.place_obstacle(5, 2, 1, 8).unwrap();
        grid.place_obstacle(7, 0, 1, 5).unwrap();

        let bfs = UninformedAgent::breadth_first().traverse(&grid).unwrap().unwrap();
        for tie_break in [TieBreak::FirstInserted, TieBreak::LastInserted] {
            let a_star = AStarAgent::new(Heuristic::Chebyshev)
                .with_tie_break(tie_break)
                .traverse(&grid)
                .unwrap()
                .unwrap();
            assert_eq!(a_star.len(), bfs.len());
        }
    }

    #[test]
    fn test_wall_means_no_path() {
        let mut grid = open_grid(5, 5);
        grid.place_obstacle(2, 0, 1, 5).unwrap();
        let mut agent = AStarAgent::default();
        assert_eq!(agent.traverse(&grid).unwrap(), None);
        assert_eq!(agent.last_stats().expanded, 10);
    }

    #[test]
    fn test_state_holds_explored_tree() {
        let grid = open_grid(4, 4);
        let mut state = AStarState::new();
        let mut agent = AStarAgent::new(Heuristic::Chebyshev);
        let path = agent.traverse_with(&grid, &mut state).unwrap().unwrap();
        assert!(state.closed().contains(&Point::new(3, 3)));
        assert!(!state.in_frontier(&Point::new(0, 0)));
        // a second call starts over from a cleared state
        let again = agent.traverse_with(&grid, &mut state).unwrap().unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_cheaper_route_replaces_frontier_entry() {
        let grid = open_grid(3, 3);
        let mut state = AStarState::new();
        let mut stats = SearchStats::default();
        let tie = TieBreak::FirstInserted;
        let root = state.push_root(Point::new(0, 0), 0.0, tie);
        // queue (2, 2) at a deliberately inflated cost
        state.push(Point::new(2, 2), root, 5, 5.0, tie);
        let outcome = expand(
            &grid,
            Point::new(2, 2),
            Heuristic::Chebyshev,
            tie,
            &mut state,
            &mut stats,
            || false,
        );
        let Expansion::Goal(id) = outcome else {
            panic!("expected goal, got {:?}", outcome);
        };
        assert_eq!(state.arena().reconstruct_path(id).len(), 3);
    }

    #[test]
    fn test_interrupt_before_first_pop() {
        let grid = open_grid(3, 3);
        let mut state = AStarState::new();
        let mut stats = SearchStats::default();
        state.push_root(Point::new(0, 0), 2.0, TieBreak::FirstInserted);
        let outcome = expand(
            &grid,
            Point::new(2, 2),
            Heuristic::Chebyshev,
            TieBreak::FirstInserted,
            &mut state,
            &mut stats,
            || true,
        );
        assert_eq!(outcome, Expansion::Interrupted);
        assert_eq!(state.head().map(|n| n.id), Some(0));
    }
}
