//! Game session aggregate and move log.

use crate::games::tictactoe::{Board, Mark, Outcome, Position, Square, evaluate};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Lifecycle status of a session.
///
/// The progression `Waiting -> InProgress -> Finished` is monotonic;
/// a session never moves backwards and `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Created, second player not yet seated. No moves accepted.
    Waiting,
    /// Both players seated, moves accepted in turn order.
    InProgress,
    /// Won or drawn. No further moves accepted.
    Finished,
}

/// A single recorded move, appended to the session's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// Session this move belongs to.
    session_id: SessionId,
    /// Player who made the move.
    player_id: PlayerId,
    /// Cell the mark was placed in.
    position: Position,
    /// 1-based, strictly increasing per session.
    sequence: u32,
    /// Submission time; the sequence number is authoritative for ordering.
    timestamp: DateTime<Utc>,
}

/// A game session between two identified players.
///
/// The session is the aggregate the engine owns: board, seating, turn,
/// outcome, and the append-only move log that lets consumers replay the
/// game. All mutation goes through the engine, which holds the session's
/// exclusive guard while it loads, validates, applies, and persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque unique identifier, assigned at creation.
    id: SessionId,
    /// The creator, who carries [`Mark::X`] and moves first.
    player_a: PlayerId,
    /// The second seat, absent until someone joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_b: Option<PlayerId>,
    /// Current board state.
    board: Board,
    /// Lifecycle status.
    status: SessionStatus,
    /// Player allowed to move next; meaningful only while in progress.
    turn: PlayerId,
    /// Winner of the game; absent on draw or while unfinished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<PlayerId>,
    /// Ordered move log, append-only.
    moves: Vec<MoveRecord>,
    /// Optimistic concurrency token for the store contract.
    version: u64,
}

impl Session {
    /// Creates a new session in `Waiting`, seated and to be opened by
    /// its creator.
    #[instrument]
    pub fn new(id: SessionId, creator: PlayerId) -> Self {
        info!(session_id = %id, player_a = %creator, "Creating new game session");
        Self {
            id,
            player_a: creator.clone(),
            player_b: None,
            board: Board::new(),
            status: SessionStatus::Waiting,
            turn: creator,
            winner: None,
            moves: Vec::new(),
            version: 1,
        }
    }

    /// Checks whether the given id holds one of the two seats.
    pub fn is_participant(&self, player_id: &str) -> bool {
        self.player_a == player_id || self.player_b.as_deref() == Some(player_id)
    }

    /// Mark assigned to the given player, if seated.
    pub fn mark_of(&self, player_id: &str) -> Option<Mark> {
        if self.player_a == player_id {
            Some(Mark::X)
        } else if self.player_b.as_deref() == Some(player_id) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Player seated with the given mark, if any.
    pub fn player_with_mark(&self, mark: Mark) -> Option<&PlayerId> {
        match mark {
            Mark::X => Some(&self.player_a),
            Mark::O => self.player_b.as_ref(),
        }
    }

    /// The other participant, keyed by seat.
    ///
    /// This is the single turn-rotation function; call sites never
    /// recompute "the other player" on their own.
    pub fn opponent_of(&self, player_id: &str) -> Option<&PlayerId> {
        self.player_with_mark(self.mark_of(player_id)?.opponent())
    }

    /// Re-derives the board by replaying the move log from empty.
    ///
    /// Returns `None` if the log is inconsistent (a mover without a seat,
    /// or a cell written twice). For a well-formed session the result
    /// always equals the stored board.
    pub fn replay_board(&self) -> Option<Board> {
        let mut board = Board::new();
        for record in &self.moves {
            let mark = self.mark_of(record.player_id())?;
            if !board.is_empty(*record.position()) {
                return None;
            }
            board.set(*record.position(), Square::Occupied(mark));
        }
        Some(board)
    }

    /// Seats the second player and opens the game.
    ///
    /// The turn stays with `player_a`, who moves first.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn seat_player_b(&mut self, joiner: PlayerId) {
        info!(player_b = %joiner, "Second player seated, game in progress");
        self.player_b = Some(joiner);
        self.status = SessionStatus::InProgress;
    }

    /// Applies a validated move: marks the cell, appends the move record,
    /// and advances status, winner, and turn.
    ///
    /// The caller must have validated the move against this exact state;
    /// see [`crate::validate_move`].
    #[instrument(skip(self, at), fields(session_id = %self.id))]
    pub(crate) fn apply_move(&mut self, player_id: &str, position: Position, at: DateTime<Utc>) {
        let mark = if self.player_a == player_id {
            Mark::X
        } else {
            Mark::O
        };
        self.board.set(position, Square::Occupied(mark));

        let sequence = self.moves.len() as u32 + 1;
        self.moves.push(MoveRecord::new(
            self.id.clone(),
            player_id.to_owned(),
            position,
            sequence,
            at,
        ));

        match evaluate(&self.board) {
            Outcome::Won(line_mark) => {
                self.status = SessionStatus::Finished;
                // The detected line is authoritative; with single-write
                // cells it always belongs to the mover.
                let winner = self.player_with_mark(line_mark).cloned();
                if winner.as_deref() != Some(player_id) {
                    warn!(
                        mover = player_id,
                        ?line_mark,
                        "completed line does not belong to the mover"
                    );
                }
                self.winner = winner;
            }
            Outcome::Draw => {
                self.status = SessionStatus::Finished;
            }
            Outcome::InProgress => {
                if let Some(next) = self.opponent_of(player_id).cloned() {
                    self.turn = next;
                }
            }
        }
    }

    /// Advances the optimistic concurrency token ahead of a save.
    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_progress() -> Session {
        let mut session = Session::new("s1".to_owned(), "p1".to_owned());
        session.seat_player_b("p2".to_owned());
        session
    }

    #[test]
    fn test_new_session_waits_with_creator_to_move() {
        let session = Session::new("s1".to_owned(), "p1".to_owned());
        assert_eq!(*session.status(), SessionStatus::Waiting);
        assert_eq!(session.board().encode(), "---------");
        assert_eq!(session.turn(), "p1");
        assert!(session.player_b().is_none());
        assert!(session.moves().is_empty());
    }

    #[test]
    fn test_seat_player_b_opens_game() {
        let session = in_progress();
        assert_eq!(*session.status(), SessionStatus::InProgress);
        assert_eq!(session.player_b().as_deref(), Some("p2"));
        assert_eq!(session.turn(), "p1");
    }

    #[test]
    fn test_marks_follow_seating() {
        let session = in_progress();
        assert_eq!(session.mark_of("p1"), Some(Mark::X));
        assert_eq!(session.mark_of("p2"), Some(Mark::O));
        assert_eq!(session.mark_of("stranger"), None);
        assert_eq!(session.player_with_mark(Mark::O).map(String::as_str), Some("p2"));
    }

    #[test]
    fn test_opponent_rotation() {
        let session = in_progress();
        assert_eq!(session.opponent_of("p1").map(String::as_str), Some("p2"));
        assert_eq!(session.opponent_of("p2").map(String::as_str), Some("p1"));
        assert_eq!(session.opponent_of("stranger"), None);
    }

    #[test]
    fn test_apply_move_flips_turn_and_logs() {
        let mut session = in_progress();
        session.apply_move("p1", Position::Center, Utc::now());
        assert_eq!(session.board().encode(), "----X----");
        assert_eq!(session.turn(), "p2");
        assert_eq!(session.moves().len(), 1);
        assert_eq!(*session.moves()[0].sequence(), 1);
        assert_eq!(session.moves()[0].player_id(), "p1");
    }

    #[test]
    fn test_winning_move_finishes_with_mover_as_winner() {
        let mut session = in_progress();
        for (player, index) in [("p1", 0), ("p2", 3), ("p1", 1), ("p2", 4)] {
            session.apply_move(player, Position::from_index(index).unwrap(), Utc::now());
        }
        session.apply_move("p1", Position::TopRight, Utc::now());
        assert_eq!(*session.status(), SessionStatus::Finished);
        assert_eq!(session.winner().as_deref(), Some("p1"));
        assert_eq!(session.board().encode(), "XXXOO----");
    }

    #[test]
    fn test_replay_reproduces_board() {
        let mut session = in_progress();
        for (player, index) in [("p1", 4), ("p2", 0), ("p1", 8), ("p2", 2)] {
            session.apply_move(player, Position::from_index(index).unwrap(), Utc::now());
        }
        assert_eq!(session.replay_board().as_ref(), Some(session.board()));
    }
}
