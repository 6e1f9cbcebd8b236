//! Wire protocol for Parlor.
//!
//! Defines the "language" that clients and the server speak:
//!
//! - **Types** ([`RoomId`], [`Role`], [`RoomSnapshot`], ...) — the shared
//!   vocabulary of rooms, seats, and game state.
//! - **Actions** ([`ClientAction`]) — everything a client can ask for.
//! - **Events** ([`ServerEvent`]) — everything the server pushes back.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how messages become text frames.
//!
//! The protocol layer sits between transport (raw frames) and the session
//! and room layers. It knows nothing about connections or rooms — only how
//! messages are shaped on the wire.

mod action;
mod codec;
mod error;
mod event;
mod types;

pub use action::ClientAction;
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use event::{FlipOutcome, RoundResolution, ServerEvent};
pub use types::{
    CardView, ChatMessage, GameKind, GameSnapshot, HandSign, MatchTallies,
    PlayerInfo, Role, RoomId, RoomPhase, RoomSnapshot, RoomSummary,
    ScoreEntry, Verdict,
};
