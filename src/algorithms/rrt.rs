//! Rapidly-exploring random tree over the grid.
//!
//! The tree grows by sampling a free cell, stepping from the nearest tree
//! node toward it by at most `epsilon`, and keeping the new cell when the
//! segment between the two is unobstructed. The planner is probabilistically
//! complete only: `Ok(None)` does not prove that no path exists.

use crate::algorithms::common::{check_endpoints, Path, PathfindingAgent};
use crate::algorithms::heuristic::euclidean_distance;
use crate::algorithms::node::{NodeArena, NodeId};
use crate::error::Result;
use crate::grid::{GridEnvironment, Point};
use crate::statistics::SearchStats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

pub const DEFAULT_EPSILON: f64 = 7.0;
pub const MIN_EPSILON: f64 = 1.0;
pub const DEFAULT_MAX_NODES: usize = 5000;
pub const MIN_NODES: usize = 100;
/// Sampling attempts allowed per node of budget. Rejected samples do not
/// consume node budget, so this cap is what ends a search whose tree can no
/// longer grow.
const ATTEMPTS_PER_NODE: usize = 50;

/// Tree edges are checked with `GridEnvironment::line_of_sight`, which treats
/// coordinates as cell corners. An edge running exactly along a grid line is
/// only blocked when the cells on both sides are occupied, so a rendered
/// path can appear to pass over a single occupied cell.
#[derive(Debug, Clone)]
pub struct RrtAgent {
    epsilon: f64,
    max_nodes: usize,
    goal_bias: f64,
    rng: StdRng,
    tree: NodeArena,
    stats: SearchStats,
}

impl RrtAgent {
    /// Creates an agent seeded from system entropy.
    pub fn new(epsilon: f64, max_nodes: usize) -> Self {
        Self::with_rng(epsilon, max_nodes, StdRng::from_entropy())
    }

    /// Creates an agent whose sampling sequence is fixed by `seed`.
    pub fn with_seed(epsilon: f64, max_nodes: usize, seed: u64) -> Self {
        Self::with_rng(epsilon, max_nodes, StdRng::seed_from_u64(seed))
    }

    fn with_rng(epsilon: f64, max_nodes: usize, rng: StdRng) -> Self {
        let mut agent = RrtAgent {
            epsilon: DEFAULT_EPSILON,
            max_nodes: DEFAULT_MAX_NODES,
            goal_bias: 0.0,
            rng,
            tree: NodeArena::new(),
            stats: SearchStats::default(),
        };
        agent.set_epsilon(epsilon);
        agent.set_max_nodes(max_nodes);
        agent
    }

    /// Probability of sampling the goal instead of a uniform cell, clamped to
    /// `[0, 1]`.
    pub fn with_goal_bias(mut self, goal_bias: f64) -> Self {
        self.set_goal_bias(goal_bias);
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Step sizes below `MIN_EPSILON` (and NaN) fall back to `DEFAULT_EPSILON`.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        if epsilon >= MIN_EPSILON {
            self.epsilon = epsilon;
        } else {
            log::warn!(
                "rrt step size {} below minimum {}, using {}",
                epsilon,
                MIN_EPSILON,
                DEFAULT_EPSILON
            );
            self.epsilon = DEFAULT_EPSILON;
        }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Budgets below `MIN_NODES` fall back to `DEFAULT_MAX_NODES`.
    pub fn set_max_nodes(&mut self, max_nodes: usize) {
        if max_nodes >= MIN_NODES {
            self.max_nodes = max_nodes;
        } else {
            log::warn!(
                "rrt node budget {} below minimum {}, using {}",
                max_nodes,
                MIN_NODES,
                DEFAULT_MAX_NODES
            );
            self.max_nodes = DEFAULT_MAX_NODES;
        }
    }

    pub fn goal_bias(&self) -> f64 {
        self.goal_bias
    }

    pub fn set_goal_bias(&mut self, goal_bias: f64) {
        self.goal_bias = if goal_bias.is_nan() {
            0.0
        } else {
            goal_bias.clamp(0.0, 1.0)
        };
    }

    /// Tree grown by the most recent call.
    pub fn tree(&self) -> &NodeArena {
        &self.tree
    }

    fn sample(&mut self, grid: &GridEnvironment) -> Point {
        if self.goal_bias > 0.0 && self.rng.gen::<f64>() < self.goal_bias {
            grid.goal()
        } else {
            grid.random_point(&mut self.rng)
        }
    }

    fn nearest(&self, target: Point) -> NodeId {
        self.tree
            .iter()
            .min_by(|(_, a), (_, b)| {
                euclidean_distance(a.position, target)
                    .total_cmp(&euclidean_distance(b.position, target))
            })
            .map_or(0, |(id, _)| id)
    }
}

/// Moves from `from` toward `to` by at most `epsilon`, landing on `to` when it
/// is closer than that.
pub fn step_from_to(from: Point, to: Point, epsilon: f64) -> Point {
    if euclidean_distance(from, to) < epsilon {
        return to;
    }
    let theta = f64::from(to.y - from.y).atan2(f64::from(to.x - from.x));
    Point::new(
        from.x + (epsilon * theta.cos()).round() as i32,
        from.y + (epsilon * theta.sin()).round() as i32,
    )
}

impl Default for RrtAgent {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON, DEFAULT_MAX_NODES)
    }
}

impl PathfindingAgent for RrtAgent {
    fn name(&self) -> &'static str {
        "rrt"
    }

    fn traverse(&mut self, grid: &GridEnvironment) -> Result<Option<Path>> {
        let (start, goal) = (grid.start(), grid.goal());
        check_endpoints(grid, start, goal)?;

        let timer = Instant::now();
        let mut stats = SearchStats::default();
        self.tree.clear();
        self.tree.insert_root(start);

        let mut path = None;
        if start == goal {
            path = Some(vec![start]);
        }

        let max_attempts = self.max_nodes.saturating_mul(ATTEMPTS_PER_NODE);
        let mut added = 0;
        while path.is_none() && added < self.max_nodes && stats.expanded < max_attempts {
            stats.expanded += 1;

            let sample = self.sample(grid);
            if !grid.is_valid(sample.x, sample.y) {
                continue;
            }
            let nearest = self.nearest(sample);
            let from = self.tree.position(nearest);
            let next = step_from_to(from, sample, self.epsilon);
            if next == from || !grid.is_valid(next.x, next.y) || !grid.line_of_sight(from, next) {
                continue;
            }

            let id = self.tree.insert(next, nearest);
            added += 1;
            stats.generated += 1;
            if next == goal {
                path = Some(self.tree.reconstruct_path(id));
            }
        }

        stats.elapsed = timer.elapsed();
        self.stats = stats;
        log::debug!(
            "rrt from {} to {}: {} after {} samples, tree of {} nodes ({})",
            start,
            goal,
            if path.is_some() { "reached goal" } else { "no path" },
            stats.expanded,
            self.tree.len(),
            stats
        );
        Ok(path)
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}
