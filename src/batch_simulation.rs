use crate::config::{Algorithm, Config};
use crate::error::Result;
use crate::simulation::{AlgorithmResult, Scenario, Simulation};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub run: usize,
    pub seed: u64,
    pub algorithm: Algorithm,
    pub success: bool,
    pub path_moves: usize,
    pub optimal_path_length: usize,
    pub route_efficiency: f64,
    pub expanded: usize,
    pub elapsed: Duration,
}

impl BatchResult {
    fn from_algorithm_result(run: usize, seed: u64, result: &AlgorithmResult) -> Self {
        let search = result.algorithm_stats.search();
        BatchResult {
            run,
            seed,
            algorithm: result.algorithm,
            success: result.success,
            path_moves: result.statistics.path_moves,
            optimal_path_length: result.statistics.optimal_path_length,
            route_efficiency: result.statistics.route_efficiency,
            expanded: search.expanded,
            elapsed: search.elapsed,
        }
    }
}

/// Aggregate over every run of one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub runs: usize,
    pub successes: usize,
    /// Means over successful runs only; `None` when nothing succeeded.
    pub mean_moves: Option<f64>,
    pub mean_efficiency: Option<f64>,
    pub mean_elapsed: Duration,
}

impl AlgorithmSummary {
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.successes as f64 / self.runs as f64
        }
    }
}

/// Repeats the comparison over `config.runs` scenarios with consecutive
/// seeds.
pub struct BatchSimulation {
    config: Config,
    results: Vec<BatchResult>,
    start_time: Instant,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            results: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<()> {
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!(
                "Grid: {}x{} | Occupancy: {} | Obstacles up to {}x{}",
                self.config.width,
                self.config.height,
                self.config.occupancy,
                self.config.obstacle_width,
                self.config.obstacle_height
            );
            println!("Runs: {} | Base seed: {}", self.config.runs, base_seed);
            println!("Algorithm: {}", self.config.algorithm);
            println!();
        }

        self.start_time = Instant::now();
        self.results.clear();
        for run in 0..self.config.runs {
            let seed = base_seed.wrapping_add(run as u64);
            let mut run_config = self.config.clone();
            run_config.seed = Some(seed);

            let scenario = Scenario::generate(&run_config, Some(seed))?;
            let simulation = Simulation::with_scenario(run_config, scenario);
            for result in simulation.run_all_algorithms()? {
                self.results
                    .push(BatchResult::from_algorithm_result(run, seed, &result));
            }
            log::debug!("batch run {} of {} done", run + 1, self.config.runs);
        }
        log::info!(
            "batch of {} runs finished in {:.2?}",
            self.config.runs,
            self.start_time.elapsed()
        );
        Ok(())
    }

    /// Per-algorithm aggregates, in the order the algorithms were run.
    pub fn summarize(&self) -> Vec<AlgorithmSummary> {
        let mut order: Vec<Algorithm> = Vec::new();
        for result in &self.results {
            if !order.contains(&result.algorithm) {
                order.push(result.algorithm);
            }
        }

        order
            .into_iter()
            .map(|algorithm| {
                let runs: Vec<&BatchResult> = self
                    .results
                    .iter()
                    .filter(|r| r.algorithm == algorithm)
                    .collect();
                let successful: Vec<&&BatchResult> = runs.iter().filter(|r| r.success).collect();
                let mean = |f: fn(&BatchResult) -> f64| {
                    if successful.is_empty() {
                        None
                    } else {
                        Some(successful.iter().map(|r| f(r)).sum::<f64>() / successful.len() as f64)
                    }
                };
                let total_elapsed: Duration = runs.iter().map(|r| r.elapsed).sum();
                AlgorithmSummary {
                    algorithm,
                    runs: runs.len(),
                    successes: successful.len(),
                    mean_moves: mean(|r| r.path_moves as f64),
                    mean_efficiency: mean(|r| r.route_efficiency),
                    mean_elapsed: total_elapsed / runs.len().max(1) as u32,
                }
            })
            .collect()
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ===");
        for summary in self.summarize() {
            println!("\n{} Algorithm Results:", summary.algorithm);
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                summary.successes,
                summary.runs,
                summary.success_rate() * 100.0
            );
            if let (Some(moves), Some(efficiency)) = (summary.mean_moves, summary.mean_efficiency) {
                println!("  Average moves: {:.1}", moves);
                println!("  Average efficiency: {:.3}", efficiency);
            }
            println!("  Average planning time: {:.2?}", summary.mean_elapsed);
        }
    }
}
