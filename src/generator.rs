use crate::error::{MazeError, Result};
use crate::execution::MutationSource;
use crate::grid::{CellKind, Grid, Mutation, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use tracing::debug;

/// Knobs for random maze generation. Ratios are fractions of all cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub size: usize,
    pub wall_ratio: f64,
    pub trap_ratio: f64,
    pub lock_ratio: f64,
    pub trap_cost_min: u32,
    pub trap_cost_max: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            size: 15,
            wall_ratio: 0.3,
            trap_ratio: 0.1,
            lock_ratio: 0.05,
            trap_cost_min: 10,
            trap_cost_max: 20,
        }
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(MazeError::InvalidConfiguration(format!(
                "grid size must be at least 2, got {}",
                self.size
            )));
        }
        for (name, ratio) in [
            ("wall", self.wall_ratio),
            ("trap", self.trap_ratio),
            ("lock", self.lock_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(MazeError::InvalidConfiguration(format!(
                    "{} ratio must be within [0, 1], got {}",
                    name, ratio
                )));
            }
        }
        if self.wall_ratio + self.trap_ratio + self.lock_ratio > 1.0 {
            return Err(MazeError::InvalidConfiguration(
                "wall, trap and lock ratios add up to more than 1".to_string(),
            ));
        }
        validate_cost_range(self.trap_cost_min, self.trap_cost_max)
    }

    pub fn trap_costs(&self) -> RangeInclusive<u32> {
        self.trap_cost_min..=self.trap_cost_max
    }

    fn count(&self, ratio: f64) -> usize {
        (ratio * (self.size * self.size) as f64) as usize
    }
}

fn validate_cost_range(min: u32, max: u32) -> Result<()> {
    if min == 0 || min > max {
        return Err(MazeError::InvalidConfiguration(format!(
            "trap cost range {}..={} must be non-empty and start at 1 or more",
            min, max
        )));
    }
    Ok(())
}

/// Seeded when reproducibility matters, from entropy otherwise.
pub fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Random maze generator.
///
/// Walls are placed first among all cells, then traps, then locks among the
/// cells still empty, and finally two distinct empty cells become the start
/// and the exit.
pub struct MazeGenerator {
    settings: GeneratorSettings,
    rng: StdRng,
}

impl MazeGenerator {
    pub fn new(settings: GeneratorSettings, seed: Option<u64>) -> Result<Self> {
        settings.validate()?;
        Ok(MazeGenerator {
            settings,
            rng: rng_from(seed),
        })
    }

    pub fn generate(&mut self) -> Result<Grid> {
        let mut grid = Grid::new(self.settings.size);

        let all: Vec<Position> = grid.positions().collect();
        let walls = self.pick(&all, self.settings.count(self.settings.wall_ratio));
        for pos in walls {
            grid.set_kind(pos, CellKind::Wall, None)?;
        }

        let traps = self.pick_empty(&grid, self.settings.count(self.settings.trap_ratio));
        for pos in traps {
            let cost = self.rng.gen_range(self.settings.trap_costs());
            grid.set_kind(pos, CellKind::Trap, Some(cost))?;
        }

        let locks = self.pick_empty(&grid, self.settings.count(self.settings.lock_ratio));
        for pos in locks {
            grid.set_kind(pos, CellKind::Lock, None)?;
        }

        let endpoints = self.pick_empty(&grid, 2);
        let &[start, exit] = endpoints.as_slice() else {
            return Err(MazeError::InvalidConfiguration(
                "not enough empty cells left for a start and an exit".to_string(),
            ));
        };
        grid.set_kind(start, CellKind::Start, None)?;
        grid.set_kind(exit, CellKind::Exit, None)?;

        debug!(size = grid.size(), start = %start, exit = %exit, "generated maze");
        Ok(grid)
    }

    fn pick_empty(&mut self, grid: &Grid, count: usize) -> Vec<Position> {
        let empty: Vec<Position> = grid.cells_of(CellKind::Empty).collect();
        self.pick(&empty, count)
    }

    fn pick(&mut self, from: &[Position], count: usize) -> Vec<Position> {
        from.choose_multiple(&mut self.rng, count.min(from.len()))
            .copied()
            .collect()
    }
}

/// Randomly drops a trap or a lock on an empty cell between steps.
pub struct RandomChanges {
    probability: f64,
    trap_costs: RangeInclusive<u32>,
    rng: StdRng,
}

impl RandomChanges {
    pub fn new(probability: f64, trap_costs: RangeInclusive<u32>, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(MazeError::InvalidConfiguration(format!(
                "change probability must be within [0, 1], got {}",
                probability
            )));
        }
        validate_cost_range(*trap_costs.start(), *trap_costs.end())?;

        Ok(RandomChanges {
            probability,
            trap_costs,
            rng: rng_from(seed),
        })
    }
}

impl MutationSource for RandomChanges {
    fn next_mutation(&mut self, grid: &Grid, agent: Position) -> Option<Mutation> {
        if !self.rng.gen_bool(self.probability) {
            return None;
        }

        let candidates: Vec<Position> = grid
            .cells_of(CellKind::Empty)
            .filter(|&pos| pos != agent)
            .collect();
        let &position = candidates.choose(&mut self.rng)?;

        Some(if self.rng.gen_bool(0.5) {
            Mutation::trap(position, self.rng.gen_range(self.trap_costs.clone()))
        } else {
            Mutation::new(position, CellKind::Lock)
        })
    }
}
