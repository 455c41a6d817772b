//! Step-by-step execution of a planned path with replanning.
//!
//! The executor walks the agent one cell per step boundary. Before each
//! step it asks a [`MutationSource`] for a grid edit; an edit landing on the
//! unvisited part of the path triggers a fresh search from the agent's
//! current cell. Progress is pushed to a [`StepObserver`], which may also
//! abort the walk.

use crate::algorithms::{PathfindingAlgorithm, SearchOutcome, SearchResult};
use crate::error::Result;
use crate::grid::{Grid, Mutation, Position};
use std::collections::VecDeque;
use std::fmt;
use std::ops::ControlFlow;
use tracing::{debug, trace, warn};

/// Supplies at most one grid edit per step boundary.
pub trait MutationSource {
    fn next_mutation(&mut self, grid: &Grid, agent: Position) -> Option<Mutation>;
}

impl<F> MutationSource for F
where
    F: FnMut(&Grid, Position) -> Option<Mutation>,
{
    fn next_mutation(&mut self, grid: &Grid, agent: Position) -> Option<Mutation> {
        self(grid, agent)
    }
}

/// A static world.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMutations;

impl MutationSource for NoMutations {
    fn next_mutation(&mut self, _grid: &Grid, _agent: Position) -> Option<Mutation> {
        None
    }
}

/// Replays a fixed schedule; entry `i` is offered at boundary `i`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedMutations {
    schedule: VecDeque<Option<Mutation>>,
}

impl ScriptedMutations {
    pub fn new(schedule: impl IntoIterator<Item = Option<Mutation>>) -> Self {
        ScriptedMutations {
            schedule: schedule.into_iter().collect(),
        }
    }
}

impl MutationSource for ScriptedMutations {
    fn next_mutation(&mut self, _grid: &Grid, _agent: Position) -> Option<Mutation> {
        self.schedule.pop_front().flatten()
    }
}

#[derive(Debug)]
pub enum StepEvent<'a> {
    /// The agent entered `position`, paying `step_cost`.
    Stepped {
        position: Position,
        step_cost: u64,
        state: &'a ExecutionState,
    },
    Mutated {
        mutation: Mutation,
        invalidated: bool,
    },
    Replanned {
        from: Position,
        result: &'a SearchResult,
    },
    ReplanFailed {
        from: Position,
        iterations: usize,
    },
}

/// Receives progress events. Returning `ControlFlow::Break` aborts the walk
/// at the current boundary.
pub trait StepObserver {
    fn on_event(&mut self, grid: &Grid, event: &StepEvent<'_>) -> ControlFlow<()>;
}

impl<F> StepObserver for F
where
    F: FnMut(&Grid, &StepEvent<'_>) -> ControlFlow<()>,
{
    fn on_event(&mut self, grid: &Grid, event: &StepEvent<'_>) -> ControlFlow<()> {
        self(grid, event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn on_event(&mut self, _grid: &Grid, _event: &StepEvent<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Transient walk state. `path[cursor]` is always the agent's cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub path: Vec<Position>,
    pub cursor: usize,
    pub position: Position,
    pub total_cost: u64,
    pub steps_taken: usize,
    pub replans: usize,
    pub visited: Vec<Position>,
}

impl ExecutionState {
    fn new(path: Vec<Position>) -> Option<Self> {
        let position = *path.first()?;
        Some(ExecutionState {
            path,
            cursor: 0,
            position,
            total_cost: 0,
            steps_taken: 0,
            replans: 0,
            visited: Vec::new(),
        })
    }

    /// Cells of the current path the agent has not entered yet.
    pub fn remaining(&self) -> &[Position] {
        &self.path[self.cursor + 1..]
    }

    pub fn is_invalidated_by(&self, pos: Position) -> bool {
        self.remaining().contains(&pos)
    }

    /// Moves one cell along the path, charging its current entry cost.
    fn advance(&mut self, grid: &Grid) -> Option<u64> {
        let next = *self.path.get(self.cursor + 1)?;
        let step_cost = grid.cost_to_enter(next);

        self.cursor += 1;
        self.position = next;
        self.total_cost += step_cost;
        self.steps_taken += 1;
        self.visited.push(next);
        Some(step_cost)
    }

    fn replace_path(&mut self, path: Vec<Position>) {
        self.path = path;
        self.cursor = 0;
        self.replans += 1;
    }

    fn finish(self, status: ExecutionStatus) -> ExecutionOutcome {
        ExecutionOutcome {
            status,
            steps_taken: self.steps_taken,
            total_cost: self.total_cost,
            replans: self.replans,
            final_position: Some(self.position),
            visited: self.visited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Reached,
    /// A replan after an invalidating edit found no route.
    NoPath,
    /// The path ran out before reaching the goal.
    PathExhausted,
    /// The observer asked to stop.
    Aborted,
    BudgetExhausted,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExecutionStatus::Reached => "reached the exit",
            ExecutionStatus::NoPath => "no path after dynamic change",
            ExecutionStatus::PathExhausted => "path exhausted",
            ExecutionStatus::Aborted => "aborted",
            ExecutionStatus::BudgetExhausted => "step budget exhausted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub steps_taken: usize,
    pub total_cost: u64,
    pub replans: usize,
    pub final_position: Option<Position>,
    /// Every cell entered, in order. The starting cell is not included.
    pub visited: Vec<Position>,
}

impl ExecutionOutcome {
    fn empty() -> Self {
        ExecutionOutcome {
            status: ExecutionStatus::PathExhausted,
            steps_taken: 0,
            total_cost: 0,
            replans: 0,
            final_position: None,
            visited: Vec::new(),
        }
    }

    pub fn reached(&self) -> bool {
        self.status == ExecutionStatus::Reached
    }

    /// `(reached, steps_taken, total_cost)`.
    pub fn summary(&self) -> (bool, usize, u64) {
        (self.reached(), self.steps_taken, self.total_cost)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionConfig {
    /// Upper bound on step boundaries, replans included. `None` is unbounded.
    pub step_budget: Option<usize>,
}

pub struct Executor<P> {
    planner: P,
    config: ExecutionConfig,
}

impl<P: PathfindingAlgorithm> Executor<P> {
    pub fn new(planner: P) -> Self {
        Self::with_config(planner, ExecutionConfig::default())
    }

    pub fn with_config(planner: P, config: ExecutionConfig) -> Self {
        Executor { planner, config }
    }

    /// Walks `path` on a grid that never changes.
    pub fn execute_path(
        &mut self,
        path: Vec<Position>,
        grid: &mut Grid,
        goal: Position,
    ) -> Result<ExecutionOutcome> {
        self.execute(path, grid, goal, &mut NoMutations, &mut NullObserver)
    }

    /// Walks `initial_path` towards `goal`, applying edits from `mutations`
    /// between steps and replanning from the agent's cell whenever an edit
    /// lands on the unvisited remainder of the path.
    ///
    /// The grid is borrowed exclusively for the whole walk, so edits are only
    /// ever observed at step boundaries.
    pub fn execute<M, O>(
        &mut self,
        initial_path: Vec<Position>,
        grid: &mut Grid,
        goal: Position,
        mutations: &mut M,
        observer: &mut O,
    ) -> Result<ExecutionOutcome>
    where
        M: MutationSource + ?Sized,
        O: StepObserver + ?Sized,
    {
        let Some(mut state) = ExecutionState::new(initial_path) else {
            return Ok(ExecutionOutcome::empty());
        };
        let mut boundaries = 0;

        loop {
            if state.position == goal {
                debug!(
                    steps = state.steps_taken,
                    cost = state.total_cost,
                    replans = state.replans,
                    "agent reached goal"
                );
                return Ok(state.finish(ExecutionStatus::Reached));
            }

            if self.config.step_budget.is_some_and(|budget| boundaries >= budget) {
                warn!(boundaries, "step budget exhausted at {}", state.position);
                return Ok(state.finish(ExecutionStatus::BudgetExhausted));
            }
            boundaries += 1;

            if let Some(mutation) = mutations.next_mutation(grid, state.position) {
                grid.apply(&mutation)?;
                let invalidated = state.is_invalidated_by(mutation.position);
                debug!(
                    position = %mutation.position,
                    kind = ?mutation.kind,
                    invalidated,
                    "dynamic change"
                );

                let event = StepEvent::Mutated {
                    mutation,
                    invalidated,
                };
                if observer.on_event(grid, &event).is_break() {
                    return Ok(state.finish(ExecutionStatus::Aborted));
                }

                if invalidated {
                    let from = state.position;
                    match self.planner.find_path(grid, from, goal)? {
                        SearchOutcome::Found(result) => {
                            debug!(
                                planner = self.planner.name(),
                                from = %from,
                                len = result.path.len(),
                                cost = result.cost,
                                "replanned"
                            );
                            state.replace_path(result.path.clone());
                            let event = StepEvent::Replanned {
                                from,
                                result: &result,
                            };
                            if observer.on_event(grid, &event).is_break() {
                                return Ok(state.finish(ExecutionStatus::Aborted));
                            }
                            continue;
                        }
                        SearchOutcome::NoPath { iterations } => {
                            warn!(from = %from, iterations, "no alternative path after dynamic change");
                            // The walk ends here either way.
                            let _ = observer.on_event(grid, &StepEvent::ReplanFailed { from, iterations });
                            return Ok(state.finish(ExecutionStatus::NoPath));
                        }
                    }
                }
            }

            let Some(step_cost) = state.advance(grid) else {
                warn!(position = %state.position, "path exhausted before reaching goal");
                return Ok(state.finish(ExecutionStatus::PathExhausted));
            };
            trace!(
                step = state.steps_taken,
                position = %state.position,
                step_cost,
                total = state.total_cost,
                "step"
            );

            let event = StepEvent::Stepped {
                position: state.position,
                step_cost,
                state: &state,
            };
            if observer.on_event(grid, &event).is_break() {
                return Ok(state.finish(ExecutionStatus::Aborted));
            }
        }
    }
}
