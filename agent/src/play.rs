//! The sequential game loop: generate a board, open it, then alternate
//! encode / consult / negotiate / reveal until a terminal outcome.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use sweeper_common::{
    error::GameError,
    models::{GameOutcome, GameParams, Pos},
};
use sweeper_engine::{Board, encode};

use crate::display;
use crate::negotiate::Negotiation;
use crate::oracle::{OracleConfig, OracleError};
use crate::transcript::Transcript;

/// How many fresh boards to try when generation keeps producing a board
/// without a zero-valued opening cell.
const MAX_GENERATION_ATTEMPTS: usize = 16;

/// How many times a timed-out solver query is re-issued before giving up.
const MAX_TIMEOUT_RETRIES: usize = 2;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Generates a board and opens it with the guaranteed-safe first move,
/// regenerating with fresh randomness when the board has no zero cell.
fn open_board(params: &GameParams) -> Result<Board, PlayError> {
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let mut board = Board::generate(params)?;
        match board.first_move() {
            Ok(_) => return Ok(board),
            Err(GameError::NoZeroCell) => {
                debug!("Generated board without a zero cell (attempt {attempt}), regenerating");
            }
            Err(other) => return Err(other.into()),
        }
    }
    Err(GameError::NoZeroCell.into())
}

/// Picks the best unrevealed recommendation for this round, or
/// `NoSafeMoveFound` when the solver produced nothing playable.
fn choose_move(board: &Board, negotiation: &Negotiation) -> Result<Pos, OracleError> {
    for pos in negotiation.ranked_moves() {
        match board.is_revealed(pos) {
            Ok(false) => return Ok(pos),
            Ok(true) => debug!(
                "Skipping already revealed recommendation ({}, {})",
                pos.x, pos.y
            ),
            Err(_) => warn!("Solver recommended out-of-bounds cell ({}, {})", pos.x, pos.y),
        }
    }
    Err(OracleError::NoSafeMoveFound)
}

/// Explicit fallback policy when no safe move exists: a uniformly random
/// hidden cell, so the round never stays unresolved.
fn random_hidden_cell(board: &Board) -> Pos {
    let mut hidden = Vec::new();
    for y in 0..board.height() {
        for x in 0..board.width() {
            let pos = Pos { x, y };
            if !board.is_revealed(pos).unwrap_or(true) {
                hidden.push(pos);
            }
        }
    }
    // Non-empty while the game is in progress: a won board has no hidden
    // safe cell, and this only runs mid-game.
    let mut rng = rand::rng();
    hidden[rng.random_range(0..hidden.len())]
}

/// Consults the solver, re-issuing timed-out queries without touching game
/// state.
async fn consult_with_retry(
    oracle: &OracleConfig,
    facts: &str,
) -> Result<Vec<Transcript>, OracleError> {
    let mut attempts = 0;
    loop {
        match oracle.consult(facts).await {
            Err(OracleError::Timeout { limit }) if attempts < MAX_TIMEOUT_RETRIES => {
                attempts += 1;
                warn!(
                    "Solver query timed out after {}s, retrying ({attempts}/{MAX_TIMEOUT_RETRIES})",
                    limit.as_secs()
                );
            }
            other => return other,
        }
    }
}

/// Plays one full game and returns its terminal outcome.
#[instrument(level = "debug", skip(params, oracle))]
pub async fn run(params: &GameParams, oracle: &OracleConfig) -> Result<GameOutcome, PlayError> {
    let mut board = open_board(params)?;
    info!("Starting board:");
    println!("{}", display::render(&board));

    loop {
        if board.outcome().is_terminal() {
            return Ok(board.outcome());
        }

        let facts = encode::render_facts(&encode::board_facts(&board));
        let transcripts = consult_with_retry(oracle, &facts).await?;
        let negotiation = Negotiation::from_transcripts(&transcripts)?;
        let pos = match choose_move(&board, &negotiation) {
            Ok(pos) => pos,
            Err(OracleError::NoSafeMoveFound) => {
                warn!("No safe move found, guessing a random hidden cell");
                random_hidden_cell(&board)
            }
            Err(other) => return Err(other.into()),
        };

        match board.reveal(pos) {
            Ok(report) => {
                debug!(
                    "Played ({}, {}), revealed {} cells",
                    pos.x,
                    pos.y,
                    report.updates.len()
                );
                println!("{}", display::render(&board));
            }
            // Benign guards: pick again next round, or stop on a finished
            // game that won in the meantime.
            Err(GameError::AlreadyRevealed { pos }) => {
                warn!("Cannot play in an already revealed cell ({}, {})", pos.x, pos.y);
            }
            Err(GameError::GameOver) => return Ok(board.outcome()),
            Err(other) => return Err(other.into()),
        }
    }
}
