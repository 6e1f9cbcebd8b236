//! Error types for the room layer.
//!
//! Two tiers, matching where the check lives: [`RuleError`] for actions that
//! are illegal given the current game state (wrong turn, occupied cell,
//! unknown card), [`RoomError`] for room-level problems (full, not found,
//! wrong game). Both are reported only to the connection whose action
//! failed, and a failed operation never changes any state.

use parlor_protocol::{GameKind, Role, RoomId};

/// An illegal move, choice, or flip given the current game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The match hasn't started or was reset to waiting.
    #[error("match is not in progress")]
    NotInProgress,

    /// The match already ended; nothing more is accepted until a restart.
    #[error("match is already over")]
    MatchOver,

    /// Board cell outside 0–8.
    #[error("cell {0} is out of range")]
    CellOutOfRange(u8),

    /// Board cell already holds a mark.
    #[error("cell {0} is already occupied")]
    CellOccupied(u8),

    /// The acting seat is not the one whose turn it is.
    #[error("it is not {0}'s turn")]
    NotYourTurn(Role),

    /// The mark in the request is not the sender's own seat.
    #[error("you are not playing as {0}")]
    WrongMark(Role),

    /// No card with that id.
    #[error("card {0} does not exist")]
    UnknownCard(u8),

    /// The card is already face up.
    #[error("card {0} is already face up")]
    CardFaceUp(u8),

    /// The card was already paired off.
    #[error("card {0} is already matched")]
    CardMatched(u8),
}

/// Errors from room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with that id.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// Players can't join a match that is under way.
    #[error("match has already started")]
    MatchInProgress,

    /// The connection is already in a room (at most one at a time).
    #[error("already in room {0}")]
    AlreadyInRoom(RoomId),

    /// The connection holds no seat in this room (spectator or stranger).
    #[error("you are not a player in this room")]
    NotAPlayer,

    /// The action belongs to a different game than this room runs.
    #[error("room is not running {0}")]
    WrongGame(GameKind),

    /// Restart is only possible once the match has finished.
    #[error("match is not finished")]
    NotFinished,

    /// The room's command channel is closed or full.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A game-rule violation, passed through from the engine.
    #[error(transparent)]
    Rule(#[from] RuleError),
}
