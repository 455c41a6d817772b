use crate::error::Result;
use crate::grid::{Grid, Position};

/// A path found by a search, start and goal inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub path: Vec<Position>,
    /// Sum of entry costs over every cell after the first.
    pub cost: u64,
    /// Frontier pops performed. Diagnostic only.
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SearchResult),
    NoPath { iterations: usize },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn iterations(&self) -> usize {
        match self {
            SearchOutcome::Found(result) => result.iterations,
            SearchOutcome::NoPath { iterations } => *iterations,
        }
    }

    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Found(result) => Some(result),
            SearchOutcome::NoPath { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<SearchResult> {
        match self {
            SearchOutcome::Found(result) => Some(result),
            SearchOutcome::NoPath { .. } => None,
        }
    }
}

pub trait PathfindingAlgorithm {
    fn name(&self) -> &'static str;

    /// Searches `grid` from `start` to `goal`.
    ///
    /// An unreachable goal is `Ok(SearchOutcome::NoPath)`; `Err` is reserved
    /// for arguments the grid cannot answer for, such as positions outside it.
    fn find_path(&mut self, grid: &Grid, start: Position, goal: Position) -> Result<SearchOutcome>;
}

/// Manhattan distance. Admissible for 4-connected moves costing at least 1.
pub fn manhattan(a: Position, b: Position) -> u64 {
    (a.row.abs_diff(b.row) + a.col.abs_diff(b.col)) as u64
}

pub(crate) fn check_endpoints(grid: &Grid, start: Position, goal: Position) -> Result<()> {
    for pos in [start, goal] {
        if !grid.in_bounds(pos) {
            return Err(crate::error::MazeError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: grid.size(),
            });
        }
    }
    Ok(())
}
