use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use sweeper_common::{
    error::GameError,
    models::{CellUpdate, CellView, GameOutcome, GameParams, Pos},
};

#[derive(Debug, Clone)]
struct Cell {
    mine: bool,
    adjacent: u8,
    revealed: bool,
}

/// One game instance: the mine layout, fixed at construction, plus the
/// mutable reveal state. Revealed cells never revert to hidden.
#[derive(Debug)]
pub struct Board {
    width: usize,
    height: usize,
    mines: usize,
    outcome: GameOutcome,
    cells: Vec<Cell>,
}

/// What a single reveal did to the board. `updates` is empty when the reveal
/// hit a mine; the loss is carried in `outcome`.
#[derive(Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub outcome: GameOutcome,
    pub updates: Vec<CellUpdate>,
}

fn validate_params(width: usize, height: usize, mines: usize) -> Result<(), GameError> {
    if width == 0 || height == 0 || mines >= width * height {
        return Err(GameError::InvalidConfiguration {
            width,
            height,
            mines,
        });
    }
    Ok(())
}

impl Board {
    /// Generates a board with `params.mines` mines placed uniformly at
    /// random without replacement, then computes every non-mine cell's
    /// 8-neighbor mine count.
    #[instrument(level = "trace")]
    pub fn generate(params: &GameParams) -> Result<Self, GameError> {
        validate_params(params.width, params.height, params.mines)?;
        let mut board = Self::blank(params.width, params.height, params.mines);

        // Rejection-sample duplicate placements. Terminates because
        // mines < width * height.
        let mut rng = rand::rng();
        let mut placed = 0;
        while placed < params.mines {
            let x = rng.random_range(0..params.width);
            let y = rng.random_range(0..params.height);
            let cell = &mut board.cells[x + y * params.width];
            if !cell.mine {
                cell.mine = true;
                placed += 1;
            }
        }

        board.count_adjacent();
        info!(
            "Generated {}x{} board with {} mines",
            params.width, params.height, params.mines
        );
        Ok(board)
    }

    /// Builds a board with an explicit mine layout. Used by tests and for
    /// reproducing games; duplicate positions are rejected.
    pub fn with_mines(width: usize, height: usize, mines: &[Pos]) -> Result<Self, GameError> {
        validate_params(width, height, mines.len())?;
        let mut board = Self::blank(width, height, mines.len());
        for &pos in mines {
            let index = board.index(pos).ok_or(GameError::OutOfBounds { pos })?;
            if board.cells[index].mine {
                return Err(GameError::InvalidConfiguration {
                    width,
                    height,
                    mines: mines.len(),
                });
            }
            board.cells[index].mine = true;
        }
        board.count_adjacent();
        Ok(board)
    }

    fn blank(width: usize, height: usize, mines: usize) -> Self {
        Self {
            width,
            height,
            mines,
            outcome: GameOutcome::InProgress,
            cells: vec![
                Cell {
                    mine: false,
                    adjacent: 0,
                    revealed: false,
                };
                width * height
            ],
        }
    }

    fn count_adjacent(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { x, y };
                let count = self
                    .neighbors(pos)
                    .into_iter()
                    .filter(|n| self.cells[n.x + n.y * self.width].mine)
                    .count() as u8;
                let cell = &mut self.cells[x + y * self.width];
                if !cell.mine {
                    cell.adjacent = count;
                }
            }
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height).then(|| pos.x + pos.y * self.width)
    }

    fn cell(&self, pos: Pos) -> Result<&Cell, GameError> {
        let index = self.index(pos).ok_or(GameError::OutOfBounds { pos })?;
        Ok(&self.cells[index])
    }

    /// In-bounds 8-connected neighborhood of `pos`.
    fn neighbors(&self, pos: Pos) -> Vec<Pos> {
        let mut result = Vec::with_capacity(8);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = pos.x as i32 + dx;
                let y = pos.y as i32 + dy;
                if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                    result.push(Pos {
                        x: x as usize,
                        y: y as usize,
                    });
                }
            }
        }
        result
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn is_mine(&self, pos: Pos) -> Result<bool, GameError> {
        Ok(self.cell(pos)?.mine)
    }

    /// Number of mines among the 8-connected neighbors of a non-mine cell.
    pub fn neighbor_count(&self, pos: Pos) -> Result<u8, GameError> {
        Ok(self.cell(pos)?.adjacent)
    }

    pub fn is_revealed(&self, pos: Pos) -> Result<bool, GameError> {
        Ok(self.cell(pos)?.revealed)
    }

    /// What the player can see at `pos`. Mines only show after a loss.
    pub fn view(&self, pos: Pos) -> Result<CellView, GameError> {
        let cell = self.cell(pos)?;
        Ok(if cell.revealed {
            CellView::Revealed {
                adjacent: cell.adjacent,
            }
        } else if cell.mine && self.outcome == GameOutcome::Lost {
            CellView::Mine
        } else {
            CellView::Hidden
        })
    }

    /// True iff every non-mine cell is revealed.
    pub fn is_won(&self) -> bool {
        self.cells.iter().all(|cell| cell.mine || cell.revealed)
    }

    /// Revealed cells in row-major order. The iteration order is fixed so
    /// downstream consumers (the fact encoder in particular) are
    /// deterministic for a given reveal state.
    pub fn revealed_cells(&self) -> impl Iterator<Item = CellUpdate> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.revealed)
            .map(|(index, cell)| CellUpdate {
                pos: Pos {
                    x: index % self.width,
                    y: index / self.width,
                },
                adjacent: cell.adjacent,
            })
    }

    /// Reveals `pos` on behalf of the player.
    ///
    /// Hitting a mine is a terminal loss signal, not an error: the report
    /// comes back `Ok` with `outcome == Lost`. Revealing an already-revealed
    /// cell is rejected with `AlreadyRevealed` so the caller can pick a
    /// different move; the flood-fill below never trips over this because it
    /// short-circuits on revealed cells instead.
    #[instrument(level = "debug", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealReport, GameError> {
        if self.outcome.is_terminal() {
            return Err(GameError::GameOver);
        }
        let index = self.index(pos).ok_or(GameError::OutOfBounds { pos })?;
        if self.cells[index].revealed {
            return Err(GameError::AlreadyRevealed { pos });
        }

        if self.cells[index].mine {
            warn!("Hit a mine at ({}, {}) - game lost", pos.x, pos.y);
            self.outcome = GameOutcome::Lost;
            return Ok(RevealReport {
                outcome: self.outcome,
                updates: Vec::new(),
            });
        }

        let updates = self.flood_reveal(pos);
        debug!("Revealed {} cells", updates.len());

        if self.is_won() {
            info!("All safe cells revealed - game won");
            self.outcome = GameOutcome::Won;
        }
        Ok(RevealReport {
            outcome: self.outcome,
            updates,
        })
    }

    /// Worklist flood-fill starting at a non-mine cell. The revealed flag
    /// doubles as the visited guard, so every cell enters the frontier at
    /// most a bounded number of times and the loop terminates even on a
    /// fully-zero board. Zero-valued cells propagate to their neighbors;
    /// positive-valued cells are revealed but stop the fill.
    fn flood_reveal(&mut self, start: Pos) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        let mut frontier = VecDeque::from([start]);

        while let Some(pos) = frontier.pop_front() {
            let Some(index) = self.index(pos) else {
                continue;
            };
            if self.cells[index].revealed {
                continue;
            }
            self.cells[index].revealed = true;
            let adjacent = self.cells[index].adjacent;
            updates.push(CellUpdate { pos, adjacent });

            if adjacent != 0 {
                continue;
            }
            for neighbor in self.neighbors(pos) {
                let cell = &self.cells[neighbor.x + neighbor.y * self.width];
                if !cell.revealed && !cell.mine {
                    frontier.push_back(neighbor);
                }
            }
        }

        updates
    }

    /// Opens the game by revealing the first zero-valued cell in row-major
    /// order, so the opening move can never lose and the solver starts from
    /// a non-trivial set of facts. Degenerate boards without a zero cell
    /// report `NoZeroCell`; the caller should regenerate.
    pub fn first_move(&mut self) -> Result<RevealReport, GameError> {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[x + y * self.width];
                if !cell.mine && cell.adjacent == 0 {
                    return self.reveal(Pos { x, y });
                }
            }
        }
        Err(GameError::NoZeroCell)
    }
}
