//! Win and draw rules for the 3x3 board.

mod draw;
mod win;

pub use draw::is_full;
pub use win::detect_line;

use super::{Board, Mark};
use tracing::instrument;

/// Terminal evaluation of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A mark completed a line.
    Won(Mark),
    /// The board is full with no line.
    Draw,
    /// Neither; play continues.
    InProgress,
}

/// Evaluates the board after a move.
///
/// A completed line takes precedence over a full board, so a move that
/// simultaneously wins and fills the board is a win, not a draw.
#[instrument]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(mark) = detect_line(board) {
        Outcome::Won(mark)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
