use thiserror::Error;

use crate::models::Pos;

/// Failures raised by board construction and reveal operations.
///
/// `AlreadyRevealed` and `GameOver` are benign guards the game loop handles
/// locally; the rest propagate to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid configuration: a {width}x{height} board cannot hold {mines} mines")]
    InvalidConfiguration {
        width: usize,
        height: usize,
        mines: usize,
    },
    #[error("position ({}, {}) is outside the board", .pos.x, .pos.y)]
    OutOfBounds { pos: Pos },
    #[error("cell ({}, {}) is already revealed", .pos.x, .pos.y)]
    AlreadyRevealed { pos: Pos },
    #[error("the game has already finished")]
    GameOver,
    #[error("generated board has no zero-valued cell to open with")]
    NoZeroCell,
}
