pub mod a_star;
pub mod common;
pub mod reference;

pub use a_star::{search, AStar};
pub use common::{manhattan, PathfindingAlgorithm, SearchOutcome, SearchResult};
pub use reference::{optimal_cost, ReferenceDijkstra};
