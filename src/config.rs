use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::real_time_a_star::DEFAULT_PLANNING_TIME;
use crate::algorithms::rrt::{DEFAULT_EPSILON, DEFAULT_MAX_NODES};
use crate::grid::{Point, DEFAULT_OCCUPANCY};
use clap::{Parser, ValueEnum};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Algorithm {
    Bfs,
    Dfs,
    AStar,
    RealTimeAStar,
    Rrt,
    /// Every algorithm on the same scenario
    All,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::AStar,
        Algorithm::RealTimeAStar,
        Algorithm::Rrt,
    ];

    /// The concrete algorithms this selection stands for.
    pub fn selected(self) -> Vec<Algorithm> {
        match self {
            Algorithm::All => Self::ALL.to_vec(),
            single => vec![single],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::AStar => "a_star",
            Algorithm::RealTimeAStar => "real_time_a_star",
            Algorithm::Rrt => "rrt",
            Algorithm::All => "all",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Largest obstacle rectangle width
    #[arg(long, default_value_t = 4)]
    pub obstacle_width: usize,

    /// Largest obstacle rectangle height
    #[arg(long, default_value_t = 4)]
    pub obstacle_height: usize,

    /// Fraction of cells used as obstacle anchors, in [0, 0.5]
    #[arg(long, default_value_t = DEFAULT_OCCUPANCY)]
    pub occupancy: f64,

    /// Start cell as X,Y (defaults to the top-left corner)
    #[arg(long, value_parser = parse_point)]
    pub start: Option<Point>,

    /// Goal cell as X,Y (defaults to the bottom-right corner)
    #[arg(long, value_parser = parse_point)]
    pub goal: Option<Point>,

    #[arg(long, value_enum, default_value_t = Algorithm::All)]
    pub algorithm: Algorithm,

    /// Chebyshev is the only choice that keeps A* optimal under unit move cost
    #[arg(long, value_enum, default_value_t = Heuristic::Chebyshev)]
    pub heuristic: Heuristic,

    /// Deadline of each real-time A* call
    #[arg(long, default_value_t = DEFAULT_PLANNING_TIME.as_millis() as u64)]
    pub planning_time_ms: u64,

    /// Expansions allowed per real-time A* call
    #[arg(long)]
    pub expansion_budget: Option<usize>,

    /// RRT step size
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// RRT node budget
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    pub max_nodes: usize,

    /// Probability that RRT samples the goal directly
    #[arg(long, default_value_t = 0.0)]
    pub goal_bias: f64,

    /// Seed for obstacle placement and RRT sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of scenarios; more than one switches to batch mode
    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 40,
            height: 20,
            obstacle_width: 4,
            obstacle_height: 4,
            occupancy: DEFAULT_OCCUPANCY,
            start: None,
            goal: None,
            algorithm: Algorithm::All,
            heuristic: Heuristic::Chebyshev,
            planning_time_ms: DEFAULT_PLANNING_TIME.as_millis() as u64,
            expansion_budget: None,
            epsilon: DEFAULT_EPSILON,
            max_nodes: DEFAULT_MAX_NODES,
            goal_bias: 0.0,
            seed: None,
            runs: 1,
            no_visualization: false,
            quiet: false,
        }
    }
}

impl Config {
    pub fn is_batch(&self) -> bool {
        self.runs > 1
    }
}

/// Parses `X,Y` into a point.
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid x coordinate '{}': {}", x.trim(), e))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid y coordinate '{}': {}", y.trim(), e))?;
    Ok(Point::new(x, y))
}
