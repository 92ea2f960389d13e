//! Terminal rendering of the player-visible board. Presentation only; the
//! engine's queries are the single source of truth.

use sweeper_common::models::{CellView, Pos};
use sweeper_engine::Board;

/// ASCII grid of the reveal state: blank for hidden cells, the danger value
/// for revealed cells, `*` for mines once the game is lost.
pub fn render(board: &Board) -> String {
    let separator = "-".repeat(board.width() * 2 + 1);
    let mut out = String::new();

    for y in 0..board.height() {
        out.push_str(&separator);
        out.push('\n');
        out.push('|');
        for x in 0..board.width() {
            let glyph = match board.view(Pos { x, y }).unwrap_or(CellView::Hidden) {
                CellView::Hidden => ' ',
                CellView::Mine => '*',
                CellView::Revealed { adjacent } => {
                    char::from_digit(adjacent as u32, 10).unwrap_or('?')
                }
            };
            out.push(glyph);
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&separator);
    out.push('\n');
    out
}
