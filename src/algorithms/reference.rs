use crate::algorithms::common::{check_endpoints, PathfindingAlgorithm, SearchOutcome, SearchResult};
use crate::error::Result;
use crate::grid::{Grid, Position};
use pathfinding::prelude::dijkstra;

/// Uniform-cost search from the `pathfinding` crate over the same
/// neighbors and entry costs as [`AStar`](crate::algorithms::a_star::AStar).
///
/// Locks are treated as ordinary cells. Used as a baseline for the
/// cheapest possible route and as an oracle in tests.
#[derive(Default, Debug, Clone, Copy)]
pub struct ReferenceDijkstra;

impl ReferenceDijkstra {
    pub fn new() -> Self {
        ReferenceDijkstra
    }
}

impl PathfindingAlgorithm for ReferenceDijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn find_path(&mut self, grid: &Grid, start: Position, goal: Position) -> Result<SearchOutcome> {
        check_endpoints(grid, start, goal)?;

        let mut iterations = 0;
        let result = dijkstra(
            &start,
            |p| {
                iterations += 1;
                grid.neighbors(p)
                    .into_iter()
                    .map(|next| (next, grid.cost_to_enter(next)))
                    .collect::<Vec<_>>()
            },
            |p| *p == goal,
        );

        Ok(match result {
            Some((path, cost)) => SearchOutcome::Found(SearchResult {
                path,
                cost,
                iterations,
            }),
            None => SearchOutcome::NoPath { iterations },
        })
    }
}

/// Cheapest cost from `start` to `goal` ignoring lock rules, if any route exists.
pub fn optimal_cost(grid: &Grid, start: Position, goal: Position) -> Result<Option<u64>> {
    let outcome = ReferenceDijkstra::new().find_path(grid, start, goal)?;
    Ok(outcome.result().map(|result| result.cost))
}
