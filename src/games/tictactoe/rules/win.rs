//! Win detection logic for tic-tac-toe.

use super::super::{Board, Mark, Position, Square};
use tracing::instrument;

/// Checks the board for a completed line.
///
/// The 8 fixed triples (3 rows, 3 columns, 2 diagonals) are checked in a
/// fixed order; the mark of the first uniform non-empty triple is
/// returned, `None` otherwise.
#[instrument]
pub fn detect_line(board: &Board) -> Option<Mark> {
    const LINES: [[Position; 3]; 8] = [
        // Rows
        [Position::TopLeft, Position::TopCenter, Position::TopRight],
        [
            Position::MiddleLeft,
            Position::Center,
            Position::MiddleRight,
        ],
        [
            Position::BottomLeft,
            Position::BottomCenter,
            Position::BottomRight,
        ],
        // Columns
        [
            Position::TopLeft,
            Position::MiddleLeft,
            Position::BottomLeft,
        ],
        [
            Position::TopCenter,
            Position::Center,
            Position::BottomCenter,
        ],
        [
            Position::TopRight,
            Position::MiddleRight,
            Position::BottomRight,
        ],
        // Diagonals
        [Position::TopLeft, Position::Center, Position::BottomRight],
        [Position::TopRight, Position::Center, Position::BottomLeft],
    ];

    for [a, b, c] in LINES {
        let Square::Occupied(mark) = board.get(a) else {
            continue;
        };
        if board.get(b) == Square::Occupied(mark) && board.get(c) == Square::Occupied(mark) {
            return Some(mark);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(encoded: &str) -> Option<Mark> {
        detect_line(&Board::decode(encoded).expect("valid encoding"))
    }

    #[test]
    fn test_no_line_empty_board() {
        assert_eq!(line_of("---------"), None);
    }

    #[test]
    fn test_line_top_row() {
        assert_eq!(line_of("XXX------"), Some(Mark::X));
    }

    #[test]
    fn test_line_middle_column() {
        assert_eq!(line_of("-O--O--O-"), Some(Mark::O));
    }

    #[test]
    fn test_line_main_diagonal() {
        assert_eq!(line_of("O---O---O"), Some(Mark::O));
    }

    #[test]
    fn test_line_anti_diagonal() {
        assert_eq!(line_of("--X-X-X--"), Some(Mark::X));
    }

    #[test]
    fn test_no_line_incomplete() {
        assert_eq!(line_of("XX-------"), None);
    }

    #[test]
    fn test_no_line_mixed_marks() {
        assert_eq!(line_of("XOX------"), None);
    }
}
