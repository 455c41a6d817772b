use clap::Parser;

use maze_escape::config::Config;
use maze_escape::simulation::Simulation;
use maze_escape::statistics::Summary;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::parse();
    init_logging(config.quiet);

    println!("Maze Escape - Save the Scientist");
    println!("================================");
    match &config.layout {
        Some(path) => println!("Layout: {}", path.display()),
        None => {
            println!("Grid size: {}x{}", config.grid_size, config.grid_size);
            println!(
                "Walls: {:.0}%, Traps: {:.0}% (cost {}-{}), Locks: {:.0}%",
                config.wall_ratio * 100.0,
                config.trap_ratio * 100.0,
                config.trap_cost_min,
                config.trap_cost_max,
                config.lock_ratio * 100.0
            );
        }
    }
    println!("Dynamic change probability: {}", config.change_probability);
    if config.visualize() {
        println!("Visualization enabled with {}ms delay", config.delay_ms);
        println!("Press Ctrl+C to stop the simulation");
    }
    println!("Starting simulation with {} trials...", config.trials);
    println!();

    let mut simulation = match Simulation::new(config) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to set up simulation: {}", e);
            std::process::exit(1);
        }
    };

    match simulation.run() {
        Ok(reports) => {
            for report in &reports {
                println!("\n{}", "=".repeat(50));
                print!("{}", report);
            }
            println!("\n=== FINAL RESULTS ===");
            print!("{}", Summary::from_reports(&reports));
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(quiet: bool) {
    let default_directive = if quiet {
        "maze_escape=warn"
    } else {
        "maze_escape=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
