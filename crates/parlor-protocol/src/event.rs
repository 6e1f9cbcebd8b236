//! Outbound events: everything the server pushes to clients.

use serde::{Deserialize, Serialize};

use crate::types::{
    ChatMessage, GameKind, HandSign, PlayerInfo, Role, RoomId, RoomSnapshot,
    RoomSummary, ScoreEntry, Verdict,
};

/// How a valid memory-match flip resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlipOutcome {
    /// First card of a pair attempt turned face up.
    Revealed { card_id: u8 },
    /// Second card did not match. Both cards go back face down after the
    /// hide delay, and the turn has already passed to `turn`.
    Mismatch { pending: [u8; 2], turn: Role },
    /// Second card matched the pending one. `winner` is present only when
    /// this was the final pair.
    Matched { cards: [u8; 2], winner: Option<Verdict> },
}

/// The resolution of one rock-paper-scissors round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResolution {
    pub x: HandSign,
    pub o: HandSign,
    pub verdict: Verdict,
    pub round: u32,
}

/// A server → client event, internally tagged like [`ClientAction`].
///
/// Broadcast events go to every member of a room (or, for lobby events,
/// every connection). Error events are only ever unicast to the connection
/// whose action failed.
///
/// [`ClientAction`]: crate::ClientAction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake accepted; the connection is authenticated.
    Welcome { username: String },

    /// Unicast to a room's creator, who holds the first seat.
    RoomCreated {
        room_id: RoomId,
        name: String,
        kind: GameKind,
        role: Role,
    },

    /// Unicast to a player who just joined: their seat and the roster.
    RoleAssigned {
        role: Role,
        players: Vec<PlayerInfo>,
        kind: GameKind,
    },

    /// Unicast to a spectator who just joined, with the full room state.
    SpectatorJoined { snapshot: RoomSnapshot },

    /// Both seats are taken; the match is under way.
    MatchStarted {
        first_turn: Role,
        players: Vec<PlayerInfo>,
        kind: GameKind,
    },

    /// Full room state, broadcast after every state-changing action.
    StateSync { snapshot: RoomSnapshot },

    /// Unicast ack: sign recorded, waiting for the other seat.
    ChoiceAccepted { round: u32 },

    /// A rock-paper-scissors round resolved.
    RoundResult { result: RoundResolution },

    /// A memory-match flip went through.
    FlipResult { result: FlipOutcome },

    /// Unicast ack: restart vote counted, waiting for the other player.
    RestartPending { votes: usize },

    /// Both players voted; a fresh match begins with `first_turn` to act.
    RestartConfirmed {
        first_turn: Role,
        players: Vec<PlayerInfo>,
        kind: GameKind,
    },

    /// A player left mid-room; the match (if any) was reset.
    PlayerDisconnected {
        username: String,
        remaining_players: usize,
    },

    /// Current room listing.
    RoomList { rooms: Vec<RoomSummary> },

    /// Scoreboard ranking.
    Scores { entries: Vec<ScoreEntry> },

    /// A lobby chat line.
    LobbyMessage { message: ChatMessage },

    /// Recent lobby chat, replayed once to each new connection.
    LobbyHistory { messages: Vec<ChatMessage> },

    /// Who is online right now.
    LobbyUpdate { users: Vec<String> },

    /// A room chat line.
    RoomMessage { room_id: RoomId, message: ChatMessage },

    /// The sender's last action failed. Never broadcast.
    Error { message: String },
}
