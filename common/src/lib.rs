//! Shared types for the ASP-driven minesweeper agent: the game data model,
//! the text fact format exchanged with the external solver, and the error
//! taxonomy used across the engine and agent crates.

pub mod error;
pub mod facts;
pub mod models;
