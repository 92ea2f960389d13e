//! Game engine for solver-driven minesweeper: the board model with its
//! flood-fill reveal logic, and the encoder that turns the revealed state
//! into solver input facts.

pub mod board;
pub mod encode;

pub use board::{Board, RevealReport};
