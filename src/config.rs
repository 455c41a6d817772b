use crate::error::{MazeError, Result};
use crate::generator::GeneratorSettings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Maze escape with A* planning and live replanning", long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 15)]
    pub grid_size: usize,

    #[arg(long, default_value_t = 3)]
    pub trials: usize,

    #[arg(long, default_value_t = 0.3)]
    pub wall_ratio: f64,

    #[arg(long, default_value_t = 0.1)]
    pub trap_ratio: f64,

    #[arg(long, default_value_t = 0.05)]
    pub lock_ratio: f64,

    #[arg(long, default_value_t = 10)]
    pub trap_cost_min: u32,

    #[arg(long, default_value_t = 20)]
    pub trap_cost_max: u32,

    /// Chance of a dynamic change at each step boundary
    #[arg(long, default_value_t = 0.1)]
    pub change_probability: f64,

    /// Seed for maze generation and dynamic changes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Text layout to run instead of generated mazes
    #[arg(long)]
    pub layout: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Stop a walk after this many step boundaries
    #[arg(long)]
    pub step_budget: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["maze_escape"])
    }
}

impl Config {
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings::from(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(MazeError::InvalidConfiguration(
                "at least one trial is required".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.change_probability) {
            return Err(MazeError::InvalidConfiguration(format!(
                "change probability must be within [0, 1], got {}",
                self.change_probability
            )));
        }
        self.generator_settings().validate()
    }

    pub fn visualize(&self) -> bool {
        !self.no_visualization && !self.quiet
    }
}

impl From<&Config> for GeneratorSettings {
    fn from(config: &Config) -> Self {
        GeneratorSettings {
            size: config.grid_size,
            wall_ratio: config.wall_ratio,
            trap_ratio: config.trap_ratio,
            lock_ratio: config.lock_ratio,
            trap_cost_min: config.trap_cost_min,
            trap_cost_max: config.trap_cost_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generator_defaults() {
        let config = Config::default();
        assert_eq!(config.generator_settings(), GeneratorSettings::default());
        assert_eq!(config.trials, 3);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_flags() {
        let config = Config::parse_from([
            "maze_escape",
            "--grid-size",
            "8",
            "--seed",
            "99",
            "--no-visualization",
            "--step-budget",
            "500",
            "--layout",
            "maze.txt",
        ]);
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.step_budget, Some(500));
        assert_eq!(config.layout, Some(PathBuf::from("maze.txt")));
        assert!(!config.visualize());
    }

    #[test]
    fn rejects_bad_probability() {
        let config = Config::parse_from(["maze_escape", "--change-probability", "1.5"]);
        assert!(matches!(
            config.validate(),
            Err(MazeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_zero_trials() {
        let config = Config::parse_from(["maze_escape", "--trials", "0"]);
        assert!(config.validate().is_err());
    }
}
