//! Error types for maze_escape

use thiserror::Error;

/// Failures that are not a normal search outcome.
///
/// An unreachable exit is reported through `SearchOutcome::NoPath`, never
/// through this type.
#[derive(Error, Debug)]
pub enum MazeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Position ({row}, {col}) is outside the {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("Trap at ({row}, {col}) needs a positive cost")]
    MissingTrapCost { row: usize, col: usize },

    #[error("Layout error on line {line}: {reason}")]
    Layout { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
