//! Unified error type for the server crate.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_session::AuthError;
use parlor_transport::TransportError;

/// Top-level error wrapping every layer's error type.
///
/// The `#[from]` attributes let `?` convert layer errors automatically, so
/// the router and server code read straight through.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An authentication failure during the handshake.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A room-level error that escaped the per-action reporting path.
    #[error(transparent)]
    Room(#[from] RoomError),
}
