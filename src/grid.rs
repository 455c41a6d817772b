use crate::error::{MazeError, Result};
use rustc_hash::FxHashMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Trap cost used for `T` in text layouts.
pub const DEFAULT_TRAP_COST: u32 = 10;

/// Neighbor order: right, down, left, up. Search tie-breaks depend on it.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Wall,
    Trap,
    Exit,
    /// Passable, but only until a search has expanded it.
    Lock,
    Start,
}

impl CellKind {
    pub fn symbol(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Wall => '#',
            CellKind::Trap => 'T',
            CellKind::Exit => 'E',
            CellKind::Lock => 'L',
            CellKind::Start => 'S',
        }
    }
}

/// A single grid edit, applied between two steps of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub position: Position,
    pub kind: CellKind,
    pub cost: Option<u32>,
}

impl Mutation {
    pub fn new(position: Position, kind: CellKind) -> Self {
        Mutation {
            position,
            kind,
            cost: None,
        }
    }

    pub fn trap(position: Position, cost: u32) -> Self {
        Mutation {
            position,
            kind: CellKind::Trap,
            cost: Some(cost),
        }
    }
}

/// Square obstacle grid with per-cell entry costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<CellKind>>,
    trap_costs: FxHashMap<Position, u32>,
}

impl Grid {
    /// Creates a `size`x`size` grid of empty cells.
    pub fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![vec![CellKind::Empty; size]; size],
            trap_costs: FxHashMap::default(),
        }
    }

    /// Reads a text layout from disk. See the `FromStr` impl for the format.
    pub fn load(path: &Path) -> Result<Self> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Kind of the cell at `pos`. Anything outside the grid reads as a wall.
    pub fn kind(&self, pos: Position) -> CellKind {
        self.cells
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(CellKind::Wall)
    }

    pub fn trap_cost(&self, pos: Position) -> Option<u32> {
        self.trap_costs.get(&pos).copied()
    }

    /// In-bounds, non-wall cells adjacent to `pos`, in `DIRECTIONS` order.
    pub fn neighbors(&self, pos: &Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(DIRECTIONS.len());

        for (dr, dc) in DIRECTIONS {
            let (Some(row), Some(col)) = (
                pos.row.checked_add_signed(dr),
                pos.col.checked_add_signed(dc),
            ) else {
                continue;
            };
            let next = Position { row, col };
            if self.in_bounds(next) && self.kind(next) != CellKind::Wall {
                neighbors.push(next);
            }
        }
        neighbors
    }

    /// Cost paid when stepping onto `pos`: the trap cost for traps, 1 otherwise.
    /// Widened so that sums along a path cannot overflow.
    pub fn cost_to_enter(&self, pos: Position) -> u64 {
        self.trap_cost(pos).map_or(1, u64::from)
    }

    /// Changes the kind of one cell.
    ///
    /// A trap needs a positive `cost`; any other kind drops the stored cost.
    /// Start/Exit uniqueness is not checked here, see [`Grid::endpoints`].
    pub fn set_kind(&mut self, pos: Position, kind: CellKind, cost: Option<u32>) -> Result<()> {
        self.check_bounds(pos)?;

        if kind == CellKind::Trap {
            match cost {
                Some(cost) if cost > 0 => {
                    self.trap_costs.insert(pos, cost);
                }
                _ => {
                    return Err(MazeError::MissingTrapCost {
                        row: pos.row,
                        col: pos.col,
                    })
                }
            }
        } else {
            self.trap_costs.remove(&pos);
        }

        self.cells[pos.row][pos.col] = kind;
        Ok(())
    }

    pub fn apply(&mut self, mutation: &Mutation) -> Result<()> {
        self.set_kind(mutation.position, mutation.kind, mutation.cost)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Position { row, col }))
    }

    pub fn cells_of(&self, kind: CellKind) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&pos| self.kind(pos) == kind)
    }

    /// Locates the single Start and single Exit cell.
    pub fn endpoints(&self) -> Result<(Position, Position)> {
        Ok((self.single(CellKind::Start)?, self.single(CellKind::Exit)?))
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoints().map(|_| ())
    }

    fn single(&self, kind: CellKind) -> Result<Position> {
        let mut found = self.cells_of(kind);
        match (found.next(), found.next()) {
            (Some(pos), None) => Ok(pos),
            (None, _) => Err(MazeError::InvalidConfiguration(format!(
                "grid has no {:?} cell",
                kind
            ))),
            (Some(_), Some(_)) => Err(MazeError::InvalidConfiguration(format!(
                "grid has more than one {:?} cell",
                kind
            ))),
        }
    }

    fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            })
        }
    }

    /// Terminal view of the grid with the planned path and the agent overlaid.
    pub fn render(&self, path: &[Position], agent: Option<Position>) -> String {
        let mut out = String::new();
        out.push_str("Legend: S=Start, E=Exit, A=Agent, #=Wall, T=Trap, L=Lock, *=Path, .=Empty\n");

        out.push_str("   ");
        for col in 0..self.size {
            let _ = write!(out, "{:2}", col % 10);
        }
        out.push('\n');

        for row in 0..self.size {
            let _ = write!(out, "{:2} ", row);
            for col in 0..self.size {
                let pos = Position { row, col };
                let kind = self.kind(pos);
                let symbol = if Some(pos) == agent {
                    'A'
                } else if path.contains(&pos) && matches!(kind, CellKind::Empty) {
                    '*'
                } else {
                    kind.symbol()
                };
                let _ = write!(out, "{} ", symbol);
            }
            out.push('\n');
        }
        out
    }
}

/// Writes the grid in the text layout `FromStr` reads. Traps costing 1-9
/// keep their digit; any other trap is written as `T` and reads back at
/// [`DEFAULT_TRAP_COST`].
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, kinds) in self.cells.iter().enumerate() {
            for (col, kind) in kinds.iter().enumerate() {
                let symbol = match self.trap_cost(Position { row, col }) {
                    Some(cost @ 1..=9) => char::from_digit(cost, 10).unwrap_or('T'),
                    _ => kind.symbol(),
                };
                f.write_char(symbol)?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Parses a square text layout, one row per line:
/// `.` empty, `#` wall, `S` start, `E` exit, `L` lock,
/// `T` trap of [`DEFAULT_TRAP_COST`], `1`-`9` trap of that cost.
/// Blank lines and whitespace between cells are ignored.
impl FromStr for Grid {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<(usize, Vec<char>)> = s
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, line.chars().filter(|c| !c.is_whitespace()).collect()))
            .collect();

        if rows.is_empty() {
            return Err(MazeError::Layout {
                line: 0,
                reason: "layout is empty".to_string(),
            });
        }

        let size = rows.len();
        let mut grid = Grid::new(size);

        for (row, (line, symbols)) in rows.into_iter().enumerate() {
            if symbols.len() != size {
                return Err(MazeError::Layout {
                    line,
                    reason: format!("expected {} cells, found {}", size, symbols.len()),
                });
            }

            for (col, symbol) in symbols.into_iter().enumerate() {
                let pos = Position { row, col };
                let (kind, cost) = match symbol {
                    '.' => (CellKind::Empty, None),
                    '#' => (CellKind::Wall, None),
                    'S' => (CellKind::Start, None),
                    'E' => (CellKind::Exit, None),
                    'L' => (CellKind::Lock, None),
                    'T' => (CellKind::Trap, Some(DEFAULT_TRAP_COST)),
                    '1'..='9' => (CellKind::Trap, symbol.to_digit(10)),
                    other => {
                        return Err(MazeError::Layout {
                            line,
                            reason: format!("unknown cell symbol '{}'", other),
                        })
                    }
                };
                grid.set_kind(pos, kind, cost)?;
            }
        }

        Ok(grid)
    }
}
