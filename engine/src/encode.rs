//! Turns the revealed board state into the fact program handed to the
//! solver. Only information a player could see is disclosed: board
//! dimensions and the danger value of each revealed cell, never mine
//! positions.

use std::fmt::Write;

use sweeper_common::facts::BoardFact;

use crate::board::Board;

/// Facts describing the current reveal state, dimension fact first, then one
/// danger fact per revealed cell in row-major order. The same reveal state
/// always yields the same fact list.
pub fn board_facts(board: &Board) -> Vec<BoardFact> {
    let mut facts = vec![BoardFact::BoardSize {
        width: board.width(),
        height: board.height(),
    }];
    facts.extend(
        board
            .revealed_cells()
            .map(|update| BoardFact::danger(update.pos, update.adjacent)),
    );
    facts
}

/// Renders facts as solver input text, one fact per line.
pub fn render_facts(facts: &[BoardFact]) -> String {
    let mut text = String::new();
    for fact in facts {
        let _ = writeln!(text, "{fact}");
    }
    text
}
