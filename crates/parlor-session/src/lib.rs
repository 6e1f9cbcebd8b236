//! Session layer: who is this connection, and who is online?
//!
//! Identity is deliberately split from connection: a [`ConnectionId`] is
//! transient socket state, while an [`Identity`] is the verified user behind
//! it. There is no reconnect-with-state-recovery — when a connection drops,
//! everything keyed on it is torn down.
//!
//! [`ConnectionId`]: parlor_transport::ConnectionId

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod presence;

pub use auth::{AuthProvider, Identity};
pub use error::AuthError;
pub use presence::{EventSender, Presence};
