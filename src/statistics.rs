use crate::execution::ExecutionOutcome;
use crate::grid::Position;
use std::fmt;

/// Everything recorded about one trial.
#[derive(Debug, Clone)]
pub struct TrialReport {
    pub trial: usize,
    pub grid_size: usize,
    pub start: Position,
    pub exit: Position,
    pub planning_iterations: usize,
    /// Cost of the initial A* plan, if one was found.
    pub initial_cost: Option<u64>,
    pub initial_path_length: usize,
    /// Cheapest route on the initial grid, ignoring lock rules.
    pub baseline_cost: Option<u64>,
    /// `None` when there was no initial path to walk.
    pub execution: Option<ExecutionOutcome>,
}

impl TrialReport {
    pub fn escaped(&self) -> bool {
        self.execution.as_ref().is_some_and(ExecutionOutcome::reached)
    }

    /// Cost paid beyond the initial estimate, for escaped trials.
    pub fn extra_cost(&self) -> Option<u64> {
        let outcome = self.execution.as_ref().filter(|o| o.reached())?;
        Some(outcome.total_cost.saturating_sub(self.initial_cost?))
    }
}

impl fmt::Display for TrialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trial {}", self.trial + 1)?;
        writeln!(f, "Grid: {}x{}", self.grid_size, self.grid_size)?;
        writeln!(f, "Start: {} | Exit: {}", self.start, self.exit)?;
        writeln!(f, "Planning steps: {}", self.planning_iterations)?;

        let Some(initial_cost) = self.initial_cost else {
            writeln!(f, "No path found! The maze may be unsolvable.")?;
            return Ok(());
        };
        writeln!(f, "Estimated initial cost: {}", initial_cost)?;
        writeln!(f, "Initial path length: {}", self.initial_path_length)?;
        if let Some(baseline) = self.baseline_cost {
            writeln!(f, "Baseline cost (Dijkstra): {}", baseline)?;
        }

        if let Some(outcome) = &self.execution {
            if outcome.reached() {
                writeln!(f, "Scientist escaped successfully!")?;
            } else {
                writeln!(f, "Failed to reach the exit: {}", outcome.status)?;
            }
            writeln!(f, "Steps taken: {}", outcome.steps_taken)?;
            writeln!(f, "Path cost: {}", outcome.total_cost)?;
            writeln!(f, "Replans: {}", outcome.replans)?;
        }
        Ok(())
    }
}

/// Aggregate over a batch of trials. Means cover escaped trials only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub trials: usize,
    pub escapes: usize,
    pub unsolvable: usize,
    pub total_replans: usize,
    total_steps: usize,
    total_cost: u64,
    total_extra_cost: u64,
}

impl Summary {
    pub fn from_reports(reports: &[TrialReport]) -> Self {
        let mut summary = Summary {
            trials: reports.len(),
            ..Summary::default()
        };

        for report in reports {
            let Some(outcome) = &report.execution else {
                summary.unsolvable += 1;
                continue;
            };
            summary.total_replans += outcome.replans;
            if outcome.reached() {
                summary.escapes += 1;
                summary.total_steps += outcome.steps_taken;
                summary.total_cost += outcome.total_cost;
                summary.total_extra_cost += report.extra_cost().unwrap_or(0);
            }
        }
        summary
    }

    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.escapes as f64 / self.trials as f64
        }
    }

    pub fn mean_steps(&self) -> f64 {
        self.per_escape(self.total_steps as f64)
    }

    pub fn mean_cost(&self) -> f64 {
        self.per_escape(self.total_cost as f64)
    }

    pub fn mean_extra_cost(&self) -> f64 {
        self.per_escape(self.total_extra_cost as f64)
    }

    fn per_escape(&self, total: f64) -> f64 {
        if self.escapes == 0 {
            0.0
        } else {
            total / self.escapes as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trials: {}", self.trials)?;
        writeln!(
            f,
            "Escapes: {} ({:.1}%)",
            self.escapes,
            self.success_rate() * 100.0
        )?;
        writeln!(f, "Unsolvable mazes: {}", self.unsolvable)?;
        writeln!(f, "Total replans: {}", self.total_replans)?;
        if self.escapes > 0 {
            writeln!(f, "Average steps per escape: {:.2}", self.mean_steps())?;
            writeln!(f, "Average cost per escape: {:.2}", self.mean_cost())?;
            writeln!(f, "Average cost over plan: {:.2}", self.mean_extra_cost())?;
        }
        Ok(())
    }
}
