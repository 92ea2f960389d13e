//! Text facts handed to the external solver.
//!
//! The solver consumes a logic program of ground facts, one per line, in the
//! form `fact_name(arg1,arg2,...).` with 1-indexed coordinates. The file is
//! regenerated in full before every solver call, never appended to.

use std::fmt;

use crate::models::Pos;

/// One line of the facts file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardFact {
    /// `board_size(W,H).`
    BoardSize { width: usize, height: usize },
    /// `danger_level(Col,Row,Value).` for one revealed cell, 1-indexed.
    DangerLevel { col: usize, row: usize, value: u8 },
}

impl BoardFact {
    /// Builds a danger fact from an engine-side position, shifting to the
    /// solver's 1-indexed convention.
    pub fn danger(pos: Pos, value: u8) -> Self {
        BoardFact::DangerLevel {
            col: pos.x + 1,
            row: pos.y + 1,
            value,
        }
    }

    /// The engine-side position a danger fact refers to, or `None` for the
    /// dimension fact.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            BoardFact::BoardSize { .. } => None,
            BoardFact::DangerLevel { col, row, .. } => Some(Pos {
                x: col - 1,
                y: row - 1,
            }),
        }
    }

    /// Parses one line of a facts file. Returns `None` for anything that is
    /// not a well-formed fact, including 0-valued coordinates (the solver
    /// convention starts at 1).
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim().strip_suffix('.')?;
        let (name, rest) = line.split_once('(')?;
        let args: Vec<&str> = rest.strip_suffix(')')?.split(',').collect();

        match (name.trim(), args.as_slice()) {
            ("board_size", [w, h]) => Some(BoardFact::BoardSize {
                width: parse_arg(w)?,
                height: parse_arg(h)?,
            }),
            ("danger_level", [c, r, v]) => Some(BoardFact::DangerLevel {
                col: parse_arg(c)?,
                row: parse_arg(r)?,
                value: v.trim().parse().ok()?,
            }),
            _ => None,
        }
    }
}

fn parse_arg(arg: &str) -> Option<usize> {
    let value: usize = arg.trim().parse().ok()?;
    (value > 0).then_some(value)
}

impl fmt::Display for BoardFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardFact::BoardSize { width, height } => {
                write!(f, "board_size({width},{height}).")
            }
            BoardFact::DangerLevel { col, row, value } => {
                write!(f, "danger_level({col},{row},{value}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_solver_syntax() {
        let size = BoardFact::BoardSize {
            width: 10,
            height: 8,
        };
        assert_eq!(size.to_string(), "board_size(10,8).");

        let danger = BoardFact::danger(Pos { x: 0, y: 4 }, 3);
        assert_eq!(danger.to_string(), "danger_level(1,5,3).");
    }

    #[test]
    fn parse_inverts_display() {
        let facts = [
            BoardFact::BoardSize {
                width: 9,
                height: 9,
            },
            BoardFact::DangerLevel {
                col: 3,
                row: 1,
                value: 0,
            },
            BoardFact::danger(Pos { x: 7, y: 2 }, 8),
        ];
        for fact in facts {
            assert_eq!(BoardFact::parse(&fact.to_string()), Some(fact));
        }
    }

    #[test]
    fn danger_pos_round_trips() {
        let pos = Pos { x: 2, y: 6 };
        assert_eq!(BoardFact::danger(pos, 1).pos(), Some(pos));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "board_size(10,8)",     // missing period
            "board_size(0,8).",     // 1-indexed arguments only
            "danger_level(1,2).",   // wrong arity
            "unknown_fact(1,2,3).", // unknown name
            "% comment",
        ] {
            assert_eq!(BoardFact::parse(line), None, "line: {line:?}");
        }
    }
}
