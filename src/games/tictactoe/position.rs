//! Typed board positions for tic-tac-toe moves.

use super::Board;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A position on the tic-tac-toe board (0-8, row-major).
///
/// Using a closed enum instead of raw indices makes out-of-range cell
/// access unrepresentable past the validation boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Position {
    /// Top-left (position 0)
    TopLeft,
    /// Top-center (position 1)
    TopCenter,
    /// Top-right (position 2)
    TopRight,
    /// Middle-left (position 3)
    MiddleLeft,
    /// Center (position 4)
    Center,
    /// Middle-right (position 5)
    MiddleRight,
    /// Bottom-left (position 6)
    BottomLeft,
    /// Bottom-center (position 7)
    BottomCenter,
    /// Bottom-right (position 8)
    BottomRight,
}

/// Error for indices outside the 0-8 board range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("position {} is out of bounds (must be 0-8)", index)]
pub struct OutOfBounds {
    /// The rejected index.
    pub index: usize,
}

impl std::error::Error for OutOfBounds {}

impl Position {
    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    ///
    /// Variants are declared in row-major board order, so the
    /// discriminant is the index.
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// All 9 positions in board order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Filters positions by board state, returning only empty squares.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        <Position as strum::IntoEnumIterator>::iter()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl From<Position> for u8 {
    fn from(pos: Position) -> Self {
        pos.to_index() as u8
    }
}

impl TryFrom<u8> for Position {
    type Error = OutOfBounds;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(OutOfBounds {
            index: value as usize,
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
