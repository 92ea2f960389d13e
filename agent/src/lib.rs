//! Agent that plays minesweeper by consulting an external ASP solver.
//!
//! Each round the agent encodes the revealed board state as a fact program,
//! runs the solver over one or two rule programs, reconciles the returned
//! answer models into a single recommended move, and feeds that move back
//! into the engine until the game ends.

pub mod display;
pub mod negotiate;
pub mod oracle;
pub mod play;
pub mod transcript;

pub use negotiate::Negotiation;
pub use oracle::{Mode, OracleConfig, OracleError};
pub use transcript::Transcript;
