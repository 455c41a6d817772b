use crate::algorithms::{optimal_cost, search, AStar};
use crate::config::Config;
use crate::error::Result;
use crate::execution::{ExecutionConfig, Executor, StepEvent, StepObserver};
use crate::generator::{MazeGenerator, RandomChanges};
use crate::grid::Grid;
use crate::statistics::TrialReport;
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Runs a batch of escape trials: build a maze, plan, then walk the plan
/// while random changes land on the grid.
pub struct Simulation {
    config: Config,
    generator: MazeGenerator,
    layout: Option<Grid>,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let layout = match &config.layout {
            Some(path) => {
                let grid = Grid::load(path)?;
                grid.validate()?;
                info!(path = %path.display(), size = grid.size(), "loaded layout");
                Some(grid)
            }
            None => None,
        };
        let generator = MazeGenerator::new(config.generator_settings(), config.seed)?;

        Ok(Simulation {
            config,
            generator,
            layout,
        })
    }

    /// Uses `grid` for every trial instead of generating mazes.
    pub fn with_grid(config: Config, grid: Grid) -> Result<Self> {
        grid.validate()?;
        let mut simulation = Simulation::new(Config {
            layout: None,
            ..config
        })?;
        simulation.layout = Some(grid);
        Ok(simulation)
    }

    pub fn run(&mut self) -> Result<Vec<TrialReport>> {
        (0..self.config.trials)
            .map(|trial| self.run_trial(trial))
            .collect()
    }

    pub fn run_trial(&mut self, trial: usize) -> Result<TrialReport> {
        info!(trial = trial + 1, of = self.config.trials, "starting trial");

        let mut grid = match &self.layout {
            Some(layout) => layout.clone(),
            None => self.generator.generate()?,
        };
        let (start, exit) = grid.endpoints()?;

        let planned = search(&grid, start, exit)?;
        let baseline_cost = optimal_cost(&grid, start, exit)?;

        let mut report = TrialReport {
            trial,
            grid_size: grid.size(),
            start,
            exit,
            planning_iterations: planned.iterations(),
            initial_cost: None,
            initial_path_length: 0,
            baseline_cost,
            execution: None,
        };

        let Some(plan) = planned.into_result() else {
            warn!(trial = trial + 1, "no initial path to the exit, maze may be unsolvable");
            if self.config.visualize() {
                println!("{}", grid.render(&[], Some(start)));
            }
            return Ok(report);
        };

        info!(
            cost = plan.cost,
            len = plan.path.len(),
            iterations = plan.iterations,
            "initial path found"
        );
        report.initial_cost = Some(plan.cost);
        report.initial_path_length = plan.path.len();

        let change_seed = self.config.seed.map(|seed| seed.wrapping_add(trial as u64 + 1));
        let mut changes = RandomChanges::new(
            self.config.change_probability,
            self.config.generator_settings().trap_costs(),
            change_seed,
        )?;
        let mut observer = TerminalObserver::new(&self.config, trial);
        let mut executor = Executor::with_config(
            AStar::new(),
            ExecutionConfig {
                step_budget: self.config.step_budget,
            },
        );

        let outcome = executor.execute(plan.path, &mut grid, exit, &mut changes, &mut observer)?;
        info!(
            trial = trial + 1,
            status = %outcome.status,
            steps = outcome.steps_taken,
            cost = outcome.total_cost,
            replans = outcome.replans,
            "trial finished"
        );

        report.execution = Some(outcome);
        Ok(report)
    }
}

/// Draws the maze after every step and paces the walk.
struct TerminalObserver {
    visualize: bool,
    delay: Duration,
    trial: usize,
    trials: usize,
}

impl TerminalObserver {
    fn new(config: &Config, trial: usize) -> Self {
        TerminalObserver {
            visualize: config.visualize(),
            delay: Duration::from_millis(config.delay_ms),
            trial,
            trials: config.trials,
        }
    }

    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}

impl StepObserver for TerminalObserver {
    fn on_event(&mut self, grid: &Grid, event: &StepEvent<'_>) -> ControlFlow<()> {
        if !self.visualize {
            return ControlFlow::Continue(());
        }

        match event {
            StepEvent::Stepped {
                position,
                step_cost,
                state,
            } => {
                self.clear_screen();
                println!("=== MAZE ESCAPE | Trial {} of {} ===", self.trial + 1, self.trials);
                println!(
                    "Step {}/{} | Position: {} | Step cost: {} | Total cost: {} | Replans: {}",
                    state.cursor,
                    state.path.len() - 1,
                    position,
                    step_cost,
                    state.total_cost,
                    state.replans
                );
                print!("{}", grid.render(&state.path, Some(*position)));
                thread::sleep(self.delay);
            }
            StepEvent::Mutated {
                mutation,
                invalidated: true,
            } => {
                println!(
                    "Dynamic change detected at {} ({:?}), replanning from current position...",
                    mutation.position, mutation.kind
                );
            }
            StepEvent::Replanned { result, .. } => {
                println!(
                    "New path found! Length: {} | Estimated cost: {}",
                    result.path.len(),
                    result.cost
                );
            }
            StepEvent::ReplanFailed { from, .. } => {
                println!("No alternative path found from {} after dynamic change!", from);
            }
            StepEvent::Mutated { .. } => {}
        }
        ControlFlow::Continue(())
    }
}
