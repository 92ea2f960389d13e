use serde::{Deserialize, Serialize};

/// Cell position, 0-indexed, column `x` and row `y`.
///
/// The solver protocol uses 1-indexed coordinates; conversion happens at the
/// encode/parse boundary so everything else works with `Pos` directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
            mines: 10,
        }
    }
}

/// Lifecycle of one game instance. Terminal states reject further reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost,
}

impl GameOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

/// Player-visible state of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Revealed { adjacent: u8 },
    /// Only shown once the game is lost; mines stay hidden while play goes on.
    Mine,
}

/// One cell disclosed by a reveal operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub adjacent: u8,
}
