//! Room lifecycle and game rules for Parlor.
//!
//! Each room runs as an isolated Tokio task (actor model) owning a [`Room`]:
//! the roster, the restart votes, and exactly one game engine. All mutation
//! goes through the actor's command channel, so actions on one room are
//! applied strictly in arrival order and no locks are needed.
//!
//! # Key types
//!
//! - [`engine::Engine`] — pure rules for the three game variants
//! - [`Room`] — roster, roles, phase, restart protocol
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — creates rooms, routes connections, prunes empty rooms

mod actor;
pub mod engine;
mod error;
mod registry;
mod room;

pub use actor::{ChoiceReply, FlipReply, RestartReply, RoomHandle};
pub use error::{RoomError, RuleError};
pub use registry::RoomRegistry;
pub use room::{JoinOutcome, MatchRecord, Removal, RestartOutcome, Room};
