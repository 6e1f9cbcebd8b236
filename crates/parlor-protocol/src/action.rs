//! Inbound actions: everything a client can ask the server to do.

use serde::{Deserialize, Serialize};

use crate::types::{GameKind, HandSign, Role, RoomId};

/// A client → server request, internally tagged:
/// `{ "type": "make_move", "room_id": 123456, "cell": 4, "mark": "X" }`.
///
/// Every action except `hello` requires an authenticated connection; the
/// router drops anything else that arrives before the handshake completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    /// First frame of every connection: protocol version + auth token.
    Hello { version: u32, token: String },

    /// Create a room and take its first seat.
    /// `name` defaults to "Room <id>" when omitted.
    CreateRoom {
        #[serde(default)]
        name: Option<String>,
        kind: GameKind,
    },

    /// Join an existing room, as a player or (read-only) spectator.
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        as_spectator: bool,
    },

    /// Leave the current room, if any.
    LeaveRoom,

    /// Tic-tac-toe: claim a cell (0–8). `mark` must be the sender's own
    /// seat — it travels on the wire so a stale client is caught early.
    MakeMove { room_id: RoomId, cell: u8, mark: Role },

    /// Rock-paper-scissors: commit a sign for the current round.
    SubmitChoice { room_id: RoomId, choice: HandSign },

    /// Memory-match: turn a card face up.
    FlipCard { room_id: RoomId, card_id: u8 },

    /// Vote to start a new match after the current one finished.
    RequestRestart { room_id: RoomId },

    /// Ask for the current room listing.
    ListRooms,

    /// Ask for the scoreboard ranking.
    GetScores,

    /// Say something in the lobby.
    LobbyChat { message: String },

    /// Say something in a room.
    RoomChat { room_id: RoomId, message: String },
}
