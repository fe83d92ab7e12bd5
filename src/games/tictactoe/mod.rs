mod position;
mod rules;
mod types;

pub use position::{OutOfBounds, Position};
pub use rules::{Outcome, detect_line, evaluate, is_full};
pub use types::{Board, BoardParseError, Mark, Square};
