use crate::algorithms::a_star::AStarAgent;
use crate::algorithms::common::{Path, PathfindingAgent};
use crate::algorithms::real_time_a_star::{RealTimeAStarAgent, RealTimeOutcome};
use crate::algorithms::rrt::RrtAgent;
use crate::algorithms::uninformed::UninformedAgent;
use crate::config::{Algorithm, Config};
use crate::error::{PlanningError, Result};
use crate::grid::{GridEnvironment, Point};
use crate::statistics::{AlgorithmStats, SearchStats, Statistics};
use pathfinding::prelude::bfs;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// A generated grid shared by every algorithm in one comparison.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub seed: u64,
    pub grid: GridEnvironment,
}

impl Scenario {
    /// Builds the grid described by `config` and scatters obstacles with an
    /// RNG seeded from `seed` (a random seed when `None`). The 3x3 areas around
    /// the start and goal are protected so neither is sealed in by obstacles.
    pub fn generate(config: &Config, seed: Option<u64>) -> Result<Self> {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut grid = GridEnvironment::new(
            config.width,
            config.height,
            config.obstacle_width,
            config.obstacle_height,
            config.occupancy,
        )?;
        let start = config.start.unwrap_or(grid.start());
        let goal = config.goal.unwrap_or(grid.goal());
        grid.set_start(start)?;
        grid.set_goal(goal)?;
        grid.protect(start.x, start.y)?;
        grid.protect(goal.x, goal.y)?;
        let occupied = grid.create_obstacles(&mut rng);

        log::info!(
            "generated {}x{} scenario (seed {}): start {}, goal {}, {} occupied cells",
            grid.width(),
            grid.height(),
            seed,
            start,
            goal,
            occupied
        );
        Ok(Scenario { seed, grid })
    }

    /// Text rendering of the grid with `path` marked on it.
    pub fn render_path(&self, path: &[Point]) -> Result<String> {
        let mut grid = self.grid.clone();
        grid.mark_path(path)?;
        Ok(grid.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AlgorithmResult {
    pub algorithm: Algorithm,
    pub success: bool,
    pub path: Option<Path>,
    pub statistics: Statistics,
    pub algorithm_stats: AlgorithmStats,
}

/// Runs the configured algorithms against one scenario.
pub struct Simulation {
    config: Config,
    scenario: Scenario,
    optimal_path_length: Option<usize>,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        let scenario = Scenario::generate(&config, config.seed)?;
        Ok(Self::with_scenario(config, scenario))
    }

    pub fn with_scenario(config: Config, scenario: Scenario) -> Self {
        let optimal_path_length = Self::reference_path_length(&scenario.grid);
        Simulation {
            config,
            scenario,
            optimal_path_length,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Fewest moves from start to goal, or `None` when the goal is unreachable.
    pub fn optimal_path_length(&self) -> Option<usize> {
        self.optimal_path_length
    }

    /// Independent breadth-first reference used to score every agent.
    pub fn reference_path_length(grid: &GridEnvironment) -> Option<usize> {
        let goal = grid.goal();
        bfs(
            &grid.start(),
            |p| grid.neighbors(p.x, p.y),
            |p| *p == goal,
        )
        .map(|path| path.len().saturating_sub(1))
    }

    /// Runs every algorithm selected by the configuration on the shared
    /// scenario, in a fixed order.
    pub fn run_all_algorithms(&self) -> Result<Vec<AlgorithmResult>> {
        let algorithms = self.config.algorithm.selected();
        log::info!(
            "running {} algorithm(s) on scenario seed {}",
            algorithms.len(),
            self.scenario.seed
        );

        let mut results = Vec::with_capacity(algorithms.len());
        for (i, algorithm) in algorithms.into_iter().enumerate() {
            log::info!("running algorithm {}: {}", i + 1, algorithm);
            let result = self.run_algorithm(algorithm)?;
            log::info!(
                "completed {}: success {}, moves {}",
                algorithm,
                result.success,
                result.statistics.path_moves
            );
            results.push(result);
        }
        Ok(results)
    }

    /// Runs one concrete algorithm. `Algorithm::All` is rejected; use
    /// `run_all_algorithms` for it.
    pub fn run_algorithm(&self, algorithm: Algorithm) -> Result<AlgorithmResult> {
        let grid = &self.scenario.grid;
        let (path, algorithm_stats) = match algorithm {
            Algorithm::Bfs => Self::run_agent(&mut UninformedAgent::breadth_first(), grid)?,
            Algorithm::Dfs => Self::run_agent(&mut UninformedAgent::depth_first(), grid)?,
            Algorithm::AStar => {
                Self::run_agent(&mut AStarAgent::new(self.config.heuristic), grid)?
            }
            Algorithm::RealTimeAStar => self.run_real_time(grid)?,
            Algorithm::Rrt => Self::run_agent(&mut self.rrt_agent(), grid)?,
            Algorithm::All => {
                return Err(PlanningError::CompositeAlgorithm {
                    name: algorithm.name(),
                })
            }
        };

        let mut statistics = Statistics::new(
            grid.occupied_count(),
            self.optimal_path_length.unwrap_or(0),
        );
        if let Some(path) = &path {
            statistics.record_path(path);
        }
        Ok(AlgorithmResult {
            algorithm,
            success: path.is_some(),
            path,
            statistics,
            algorithm_stats,
        })
    }

    fn rrt_agent(&self) -> RrtAgent {
        let agent = match self.config.seed {
            Some(seed) => RrtAgent::with_seed(self.config.epsilon, self.config.max_nodes, seed),
            None => RrtAgent::new(self.config.epsilon, self.config.max_nodes),
        };
        agent.with_goal_bias(self.config.goal_bias)
    }

    fn run_agent(
        agent: &mut dyn PathfindingAgent,
        grid: &GridEnvironment,
    ) -> Result<(Option<Path>, AlgorithmStats)> {
        let path = agent.traverse(grid)?;
        Ok((path, AlgorithmStats::Search(agent.last_stats())))
    }

    /// Drives the real-time agent call by call until it completes or runs out
    /// of frontier. Each call expands at least one node, so the number of
    /// calls is bounded by the number of cells.
    fn run_real_time(&self, grid: &GridEnvironment) -> Result<(Option<Path>, AlgorithmStats)> {
        let mut agent = RealTimeAStarAgent::from_grid(
            grid,
            self.config.heuristic,
            Duration::from_millis(self.config.planning_time_ms),
        );
        if let Some(budget) = self.config.expansion_budget {
            agent = agent.with_expansion_budget(budget);
        }

        let max_calls = grid.width() * grid.height() + 1;
        let mut calls = 0;
        let mut total = SearchStats::default();
        let mut path = None;
        while calls < max_calls {
            calls += 1;
            let outcome = agent.plan_step(grid)?;
            total += agent.last_stats();
            match outcome {
                RealTimeOutcome::Complete(full) => {
                    path = Some(full);
                    break;
                }
                RealTimeOutcome::Partial(partial) => {
                    log::trace!("call {}: partial plan of {} cells", calls, partial.len());
                }
                RealTimeOutcome::Exhausted => break,
            }
        }
        Ok((
            path,
            AlgorithmStats::RealTime {
                calls,
                search: total,
            },
        ))
    }

    pub fn print_comparison_results(&self, results: &[AlgorithmResult]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!(
            "Scenario seed: {} | Grid {}x{} | Start {} | Goal {}",
            self.scenario.seed,
            self.scenario.grid.width(),
            self.scenario.grid.height(),
            self.scenario.grid.start(),
            self.scenario.grid.goal()
        );
        match self.optimal_path_length {
            Some(length) => println!("Reference optimal path: {} moves", length),
            None => println!("Reference optimal path: unreachable"),
        }
        println!();

        println!(
            "{:<18} {:<8} {:<8} {:<10} {:<11} {:<10} {:<10} {:<7} {:<12}",
            "Algorithm",
            "Success",
            "Moves",
            "Distance",
            "Efficiency",
            "Expanded",
            "Generated",
            "Calls",
            "Time"
        );
        println!("{}", "-".repeat(100));

        for result in results {
            let search = result.algorithm_stats.search();
            println!(
                "{:<18} {:<8} {:<8} {:<10.3} {:<11.3} {:<10} {:<10} {:<7} {:<12}",
                result.algorithm.name(),
                if result.success { "yes" } else { "no" },
                result.statistics.path_moves,
                result.statistics.path_distance,
                result.statistics.route_efficiency,
                search.expanded,
                search.generated,
                result.algorithm_stats.total_calls(),
                format!("{:.2?}", search.elapsed)
            );
        }
        println!();

        let successful: Vec<_> = results.iter().filter(|r| r.success).collect();
        if successful.is_empty() {
            println!("No algorithms successfully reached the goal.");
            return;
        }

        println!("=== PERFORMANCE ANALYSIS ===");
        if let Some(best) = successful.iter().min_by_key(|r| r.statistics.path_moves) {
            println!(
                "Fewest moves: {} ({} moves)",
                best.algorithm, best.statistics.path_moves
            );
        }
        if let Some(best) = successful
            .iter()
            .min_by(|a, b| a.statistics.path_distance.total_cmp(&b.statistics.path_distance))
        {
            println!(
                "Shortest distance: {} ({:.3})",
                best.algorithm, best.statistics.path_distance
            );
        }
        if let Some(fastest) = successful
            .iter()
            .min_by_key(|r| r.algorithm_stats.search().elapsed)
        {
            println!(
                "Fastest: {} ({:.2?})",
                fastest.algorithm,
                fastest.algorithm_stats.search().elapsed
            );
        }
        if let Some(leanest) = successful
            .iter()
            .min_by_key(|r| r.algorithm_stats.search().expanded)
        {
            println!(
                "Fewest expansions: {} ({})",
                leanest.algorithm,
                leanest.algorithm_stats.search().expanded
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config(width: usize, height: usize) -> Config {
        Config {
            width,
            height,
            occupancy: 0.0,
            seed: Some(11),
            ..Config::default()
        }
    }

    #[test]
    fn test_scenario_protects_endpoints() {
        let config = Config {
            width: 15,
            height: 15,
            occupancy: 0.5,
            seed: Some(4),
            ..Config::default()
        };
        let scenario = Scenario::generate(&config, config.seed).unwrap();
        let grid = &scenario.grid;
        assert_eq!(scenario.seed, 4);
        for p in [grid.start(), grid.goal()] {
            assert!(grid.is_valid(p.x, p.y));
            assert!(!grid.neighbors(p.x, p.y).is_empty());
        }
    }

    #[test]
    fn test_scenario_is_reproducible() {
        let config = Config {
            width: 25,
            height: 12,
            occupancy: 0.3,
            ..Config::default()
        };
        let a = Scenario::generate(&config, Some(99)).unwrap();
        let b = Scenario::generate(&config, Some(99)).unwrap();
        assert_eq!(a.grid.to_string(), b.grid.to_string());
    }

    #[test]
    fn test_scenario_rejects_endpoint_outside_grid() {
        let config = Config {
            width: 5,
            height: 5,
            goal: Some(Point::new(5, 5)),
            ..Config::default()
        };
        assert!(Scenario::generate(&config, Some(1)).is_err());
    }

    #[test]
    fn test_run_all_on_open_grid() {
        let simulation = Simulation::new(open_config(12, 8)).unwrap();
        assert_eq!(simulation.optimal_path_length(), Some(11));

        let results = simulation.run_all_algorithms().unwrap();
        assert_eq!(results.len(), 5);
        for result in &results {
            assert!(result.success, "{} failed", result.algorithm);
            let path = result.path.as_ref().unwrap();
            assert_eq!(path.first(), Some(&Point::new(0, 0)));
            assert_eq!(path.last(), Some(&Point::new(11, 7)));
        }
        let bfs = &results[0];
        assert_eq!(bfs.algorithm, Algorithm::Bfs);
        assert_eq!(bfs.statistics.path_moves, 11);
        assert!((bfs.statistics.route_efficiency - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_real_time_counts_calls() {
        let config = Config {
            algorithm: Algorithm::RealTimeAStar,
            expansion_budget: Some(3),
            ..open_config(10, 10)
        };
        let simulation = Simulation::new(config).unwrap();
        let results = simulation.run_all_algorithms().unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.success);
        assert!(result.algorithm_stats.total_calls() > 1);
        assert_eq!(result.path.as_ref().map(Vec::len), Some(10));
    }

    #[test]
    fn test_unreachable_goal() {
        let config = open_config(6, 6);
        let mut scenario = Scenario::generate(&config, config.seed).unwrap();
        scenario.grid.place_obstacle(3, 0, 1, 6).unwrap();
        let simulation = Simulation::with_scenario(config, scenario);
        assert_eq!(simulation.optimal_path_length(), None);
        for result in simulation.run_all_algorithms().unwrap() {
            assert!(!result.success, "{} found a path", result.algorithm);
            assert_eq!(result.statistics.route_efficiency, 0.0);
        }
    }

    #[test]
    fn test_composite_selection_is_not_run_as_one() {
        let simulation = Simulation::new(open_config(5, 5)).unwrap();
        assert_eq!(
            simulation.run_algorithm(Algorithm::All).unwrap_err(),
            PlanningError::CompositeAlgorithm { name: "all" }
        );
        for algorithm in Algorithm::ALL {
            let result = simulation.run_algorithm(algorithm).unwrap();
            assert_eq!(result.algorithm, algorithm);
            assert!(result.success, "{} failed", algorithm);
        }
        let a_star = simulation.run_algorithm(Algorithm::AStar).unwrap();
        assert!(matches!(a_star.algorithm_stats, AlgorithmStats::Search(_)));
        let real_time = simulation.run_algorithm(Algorithm::RealTimeAStar).unwrap();
        assert!(matches!(real_time.algorithm_stats, AlgorithmStats::RealTime { .. }));
    }

    #[test]
    fn test_render_path() {
        let simulation = Simulation::new(open_config(3, 3)).unwrap();
        let path = vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)];
        let rendered = simulation.scenario().render_path(&path).unwrap();
        assert_eq!(rendered, "|P|-|-|\n|-|P|-|\n|-|-|P|\n");
        // the scenario grid itself is untouched
        assert!(!simulation.scenario().grid.to_string().contains('P'));
    }
}
