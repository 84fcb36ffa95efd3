use clap::Parser;

use grid_planning::batch_simulation::BatchSimulation;
use grid_planning::config::Config;
use grid_planning::simulation::Simulation;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    if !config.quiet {
        println!("Starting grid planning comparison...");
        println!(
            "Grid: {}x{} | Occupancy: {} | Obstacles up to {}x{}",
            config.width,
            config.height,
            config.occupancy,
            config.obstacle_width,
            config.obstacle_height
        );
        println!("Algorithm: {} | Heuristic: {}", config.algorithm, config.heuristic);
        println!();
    }

    if config.is_batch() {
        let mut batch_sim = BatchSimulation::new(config.clone());
        match batch_sim.run() {
            Ok(()) => batch_sim.print_summary(),
            Err(e) => {
                eprintln!("Batch simulation failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let simulation = match Simulation::new(config.clone()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("Failed to create scenario: {}", e);
            std::process::exit(1);
        }
    };

    let results = match simulation.run_all_algorithms() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error running algorithms: {}", e);
            std::process::exit(1);
        }
    };

    if !config.no_visualization {
        for result in &results {
            println!("=== {} ===", result.algorithm);
            match &result.path {
                Some(path) => match simulation.scenario().render_path(path) {
                    Ok(rendered) => print!("{}", rendered),
                    Err(e) => eprintln!("Could not render path: {}", e),
                },
                None => println!("No path found"),
            }
            println!();
        }
    }

    match results.as_slice() {
        [single] => {
            println!("=== FINAL RESULTS ===");
            println!("Success: {}", single.success);
            println!("{}", single.statistics);
            println!("{}", single.algorithm_stats);
        }
        _ => simulation.print_comparison_results(&results),
    }
}
