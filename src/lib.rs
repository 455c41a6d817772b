//! Grid pathfinding with live replanning.
//!
//! A [`Grid`](grid::Grid) holds walls, traps with entry costs, and
//! single-use locks. [`AStar`](algorithms::AStar) plans a least-cost route
//! and the [`Executor`](execution::Executor) walks it, replanning from the
//! agent's cell whenever a grid change lands on the unvisited remainder.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod execution;
pub mod generator;
pub mod grid;
pub mod simulation;
pub mod statistics;

pub use algorithms::{search, AStar, PathfindingAlgorithm, SearchOutcome, SearchResult};
pub use error::{MazeError, Result};
pub use execution::{ExecutionOutcome, ExecutionStatus, Executor};
pub use grid::{CellKind, Grid, Mutation, Position};
