//! First-class invariants for game sessions.
//!
//! Invariants are logical properties that must hold after every mutation.
//! The engine asserts them in debug builds; tests check them directly.

use crate::games::tictactoe::detect_line;
use crate::session::{Session, SessionStatus};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariant: seating matches status.
///
/// A session is `Waiting` exactly while the second seat is empty, and
/// once play has started the turn always names a participant.
pub struct SeatingConsistent;

impl Invariant<Session> for SeatingConsistent {
    fn holds(session: &Session) -> bool {
        match session.status() {
            SessionStatus::Waiting => session.player_b().is_none() && session.moves().is_empty(),
            SessionStatus::InProgress => {
                session.player_b().is_some() && session.is_participant(session.turn())
            }
            SessionStatus::Finished => session.player_b().is_some(),
        }
    }

    fn description() -> &'static str {
        "Waiting iff second seat empty; turn names a participant while in progress"
    }
}

/// Invariant: the move log alternates between the players, starting with
/// player A, and its sequence numbers count 1, 2, 3, ...
pub struct AlternatingTurns;

impl Invariant<Session> for AlternatingTurns {
    fn holds(session: &Session) -> bool {
        for (i, record) in session.moves().iter().enumerate() {
            if *record.sequence() != i as u32 + 1 {
                return false;
            }
            let expected = match (i % 2, session.player_b()) {
                (0, _) => session.player_a(),
                (_, Some(player_b)) => player_b,
                (_, None) => return false,
            };
            if record.player_id() != expected {
                return false;
            }
        }
        true
    }

    fn description() -> &'static str {
        "Moves alternate strictly between the players, starting with player A"
    }
}

/// Invariant: replaying the move log from an empty board reproduces the
/// stored board exactly, with every cell written at most once.
pub struct BoardMatchesLog;

impl Invariant<Session> for BoardMatchesLog {
    fn holds(session: &Session) -> bool {
        session
            .replay_board()
            .is_some_and(|board| &board == session.board())
    }

    fn description() -> &'static str {
        "Replaying the move log reproduces the stored board"
    }
}

/// Invariant: a recorded winner is backed by a completed line of the
/// winner's own mark, on a finished session.
pub struct WinnerHasLine;

impl Invariant<Session> for WinnerHasLine {
    fn holds(session: &Session) -> bool {
        match session.winner() {
            None => true,
            Some(winner) => {
                *session.status() == SessionStatus::Finished
                    && match (detect_line(session.board()), session.mark_of(winner)) {
                        (Some(line_mark), Some(winner_mark)) => line_mark == winner_mark,
                        _ => false,
                    }
            }
        }
    }

    fn description() -> &'static str {
        "A winner holds a completed line of their own mark"
    }
}

fn check<I: Invariant<Session>>(session: &Session) -> Result<(), InvariantViolation> {
    if I::holds(session) {
        Ok(())
    } else {
        Err(InvariantViolation::new(I::description()))
    }
}

/// Checks every session invariant, reporting the first violation.
pub fn check_all(session: &Session) -> Result<(), InvariantViolation> {
    check::<SeatingConsistent>(session)?;
    check::<AlternatingTurns>(session)?;
    check::<BoardMatchesLog>(session)?;
    check::<WinnerHasLine>(session)
}
