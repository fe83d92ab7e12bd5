//! Move validation against current session state.

use crate::error::EngineError;
use crate::games::tictactoe::Position;
use crate::session::{Session, SessionStatus};
use tracing::{debug, instrument};

/// Checks whether `player_id` may mark `position` on the session as it
/// stands, returning the typed position on success.
///
/// Checks run in a fixed order and the first failure wins: the game must
/// be in progress, the mover must hold the turn, the position must be on
/// the board, and the target cell must be empty. A mover who is not
/// seated in the session can never hold the turn, so strangers are
/// rejected as [`EngineError::NotPlayersTurn`].
///
/// Purely advisory: nothing is mutated here. The engine re-runs this
/// against fresh state whenever it has to retry a save.
///
/// # Errors
///
/// Returns the specific [`EngineError`] for the first failing check.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn validate_move(
    session: &Session,
    player_id: &str,
    position: usize,
) -> Result<Position, EngineError> {
    if *session.status() != SessionStatus::InProgress {
        debug!(status = ?session.status(), "Move rejected, game not active");
        return Err(EngineError::GameNotActive);
    }
    if session.turn().as_str() != player_id {
        debug!(turn = %session.turn(), "Move rejected, not this player's turn");
        return Err(EngineError::NotPlayersTurn);
    }
    let position = Position::from_index(position).ok_or(EngineError::InvalidPosition)?;
    if !session.board().is_empty(position) {
        debug!(%position, "Move rejected, cell occupied");
        return Err(EngineError::CellOccupied);
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn in_progress() -> Session {
        let mut session = Session::new("s1".to_owned(), "p1".to_owned());
        session.seat_player_b("p2".to_owned());
        session
    }

    #[test]
    fn test_waiting_session_rejects_moves() {
        let session = Session::new("s1".to_owned(), "p1".to_owned());
        assert_eq!(
            validate_move(&session, "p1", 0),
            Err(EngineError::GameNotActive)
        );
    }

    #[test]
    fn test_finished_session_rejects_before_other_checks() {
        let mut session = in_progress();
        for (player, index) in [("p1", 0), ("p2", 3), ("p1", 1), ("p2", 4), ("p1", 2)] {
            session.apply_move(player, Position::from_index(index).unwrap(), Utc::now());
        }
        // Occupied cell and wrong turn are both true here, but the status
        // check comes first.
        assert_eq!(
            validate_move(&session, "p2", 0),
            Err(EngineError::GameNotActive)
        );
    }

    #[test]
    fn test_turn_check_precedes_bounds_check() {
        let session = in_progress();
        assert_eq!(
            validate_move(&session, "p2", 42),
            Err(EngineError::NotPlayersTurn)
        );
    }

    #[test]
    fn test_stranger_is_not_on_turn() {
        let session = in_progress();
        assert_eq!(
            validate_move(&session, "intruder", 0),
            Err(EngineError::NotPlayersTurn)
        );
    }

    #[test]
    fn test_out_of_bounds_position() {
        let session = in_progress();
        assert_eq!(
            validate_move(&session, "p1", 9),
            Err(EngineError::InvalidPosition)
        );
    }

    #[test]
    fn test_occupied_cell() {
        let mut session = in_progress();
        session.apply_move("p1", Position::Center, Utc::now());
        assert_eq!(
            validate_move(&session, "p2", 4),
            Err(EngineError::CellOccupied)
        );
    }

    #[test]
    fn test_legal_move_passes() {
        let session = in_progress();
        assert_eq!(validate_move(&session, "p1", 4), Ok(Position::Center));
    }
}
