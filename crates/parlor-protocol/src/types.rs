//! Shared protocol vocabulary: ids, seats, game kinds, and snapshots.
//!
//! Everything here travels on the wire, so the serde attributes pin the
//! exact JSON shape clients see. The tests at the bottom lock those shapes
//! down — a mismatch means existing clients stop parsing us.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a room.
///
/// Externally visible — this is what players type to join. Generated as a
/// random 6-digit number, serialized as a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two player seats in a room.
///
/// Assigned in join order (first free seat wins) and stable for the room's
/// lifetime once taken. `X` always acts first in a brand-new match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    X,
    O,
}

impl Role {
    /// The opposite seat.
    pub fn other(self) -> Role {
        match self {
            Role::X => Role::O,
            Role::O => Role::X,
        }
    }

    /// Stable index (X = 0, O = 1) for per-role arrays.
    pub fn index(self) -> usize {
        match self {
            Role::X => 0,
            Role::O => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::X => write!(f, "X"),
            Role::O => write!(f, "O"),
        }
    }
}

/// Outcome of a finished match or a resolved round.
///
/// Serialized as `"X"`, `"O"`, or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl Verdict {
    /// The winning seat, or `None` for a draw.
    pub fn winning_role(self) -> Option<Role> {
        match self {
            Verdict::X => Some(Role::X),
            Verdict::O => Some(Role::O),
            Verdict::Draw => None,
        }
    }
}

impl From<Role> for Verdict {
    fn from(role: Role) -> Self {
        match role {
            Role::X => Verdict::X,
            Role::O => Verdict::O,
        }
    }
}

/// Which game a room runs. Fixed at room creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    TicTacToe,
    RockPaperScissors,
    MemoryMatch,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::TicTacToe => write!(f, "tic-tac-toe"),
            GameKind::RockPaperScissors => write!(f, "rock-paper-scissors"),
            GameKind::MemoryMatch => write!(f, "memory-match"),
        }
    }
}

/// A hand sign in rock-paper-scissors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSign {
    Rock,
    Paper,
    Scissors,
}

impl HandSign {
    /// Circular dominance: rock > scissors > paper > rock.
    pub fn beats(self, other: HandSign) -> bool {
        matches!(
            (self, other),
            (HandSign::Rock, HandSign::Scissors)
                | (HandSign::Scissors, HandSign::Paper)
                | (HandSign::Paper, HandSign::Rock)
        )
    }
}

/// Lifecycle phase of a room's current match.
///
/// Transitions are monotonic within a match:
/// waiting → in-progress → finished, and back to waiting only through a
/// restart or a mid-match player loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomPhase {
    Waiting,
    InProgress,
    Finished,
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomPhase::Waiting => write!(f, "waiting"),
            RoomPhase::InProgress => write!(f, "in-progress"),
            RoomPhase::Finished => write!(f, "finished"),
        }
    }
}

/// A seated player as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub username: String,
    pub role: Role,
}

/// A chat line (lobby or room). `timestamp` is Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    pub timestamp: u64,
}

/// One row of a room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub name: String,
    pub kind: GameKind,
    pub phase: RoomPhase,
    pub player_count: usize,
    pub spectator_count: usize,
    pub players: Vec<PlayerInfo>,
}

/// One card in a memory-match snapshot.
///
/// `symbol` is present only while the card is face up or already matched —
/// the server never leaks the hidden deck to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symbol: Option<String>,
    pub revealed: bool,
    pub matched: bool,
}

/// Per-seat pair tallies in a memory match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTallies {
    pub x: u8,
    pub o: u8,
}

/// Variant-specific half of a room snapshot, tagged by game kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "kebab-case")]
pub enum GameSnapshot {
    TicTacToe {
        board: Vec<Option<Role>>,
        turn: Role,
        winner: Option<Verdict>,
    },
    RockPaperScissors {
        round: u32,
        /// Seats that have already committed a sign this round.
        /// The signs themselves stay server-side until resolution.
        committed: Vec<Role>,
    },
    MemoryMatch {
        cards: Vec<CardView>,
        tallies: MatchTallies,
        turn: Role,
    },
}

/// Full room state, broadcast after every state-changing action and handed
/// to late joiners in place of the broadcasts they missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub name: String,
    pub kind: GameKind,
    pub phase: RoomPhase,
    pub players: Vec<PlayerInfo>,
    pub spectators: Vec<String>,
    pub game: GameSnapshot,
}

/// One row of the scoreboard ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games: u32,
    pub win_rate: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RoomId(482913)).unwrap();
        assert_eq!(json, "482913");
        let id: RoomId = serde_json::from_str("482913").unwrap();
        assert_eq!(id, RoomId(482913));
    }

    #[test]
    fn role_serializes_as_bare_letter() {
        assert_eq!(serde_json::to_string(&Role::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Role::O).unwrap(), "\"O\"");
    }

    #[test]
    fn role_other_flips() {
        assert_eq!(Role::X.other(), Role::O);
        assert_eq!(Role::O.other(), Role::X);
    }

    #[test]
    fn verdict_draw_is_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Draw).unwrap(), "\"draw\"");
        assert_eq!(serde_json::to_string(&Verdict::X).unwrap(), "\"X\"");
    }

    #[test]
    fn verdict_winning_role() {
        assert_eq!(Verdict::X.winning_role(), Some(Role::X));
        assert_eq!(Verdict::O.winning_role(), Some(Role::O));
        assert_eq!(Verdict::Draw.winning_role(), None);
    }

    #[test]
    fn game_kind_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&GameKind::TicTacToe).unwrap(),
            "\"tic-tac-toe\""
        );
        assert_eq!(
            serde_json::to_string(&GameKind::RockPaperScissors).unwrap(),
            "\"rock-paper-scissors\""
        );
        assert_eq!(
            serde_json::to_string(&GameKind::MemoryMatch).unwrap(),
            "\"memory-match\""
        );
    }

    #[test]
    fn hand_sign_dominance_table() {
        assert!(HandSign::Rock.beats(HandSign::Scissors));
        assert!(HandSign::Scissors.beats(HandSign::Paper));
        assert!(HandSign::Paper.beats(HandSign::Rock));
        // Each sign loses to exactly one other and never beats itself.
        assert!(!HandSign::Rock.beats(HandSign::Paper));
        assert!(!HandSign::Scissors.beats(HandSign::Rock));
        assert!(!HandSign::Paper.beats(HandSign::Scissors));
        assert!(!HandSign::Rock.beats(HandSign::Rock));
    }

    #[test]
    fn room_phase_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoomPhase::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&RoomPhase::Waiting).unwrap(),
            "\"waiting\""
        );
    }

    #[test]
    fn hidden_card_omits_symbol() {
        let card = CardView {
            id: 3,
            symbol: None,
            revealed: false,
            matched: false,
        };
        let json: serde_json::Value = serde_json::to_value(&card).unwrap();
        assert!(json.get("symbol").is_none());
    }

    #[test]
    fn revealed_card_carries_symbol() {
        let card = CardView {
            id: 3,
            symbol: Some("🍒".into()),
            revealed: true,
            matched: false,
        };
        let json: serde_json::Value = serde_json::to_value(&card).unwrap();
        assert_eq!(json["symbol"], "🍒");
    }

    #[test]
    fn game_snapshot_is_tagged_by_kind() {
        let snap = GameSnapshot::TicTacToe {
            board: vec![None; 9],
            turn: Role::X,
            winner: None,
        };
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["game"], "tic-tac-toe");
        assert_eq!(json["board"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn room_snapshot_round_trip() {
        let snap = RoomSnapshot {
            room_id: RoomId(123456),
            name: "Room 123456".into(),
            kind: GameKind::RockPaperScissors,
            phase: RoomPhase::InProgress,
            players: vec![
                PlayerInfo { username: "ada".into(), role: Role::X },
                PlayerInfo { username: "bob".into(), role: Role::O },
            ],
            spectators: vec!["eve".into()],
            game: GameSnapshot::RockPaperScissors {
                round: 4,
                committed: vec![Role::X],
            },
        };
        let text = serde_json::to_string(&snap).unwrap();
        let decoded: RoomSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(snap, decoded);
    }
}
