//! # Parlor
//!
//! A WebSocket server for two-player parlor games — tic-tac-toe,
//! rock-paper-scissors, and memory-match — with shared rooms, spectators,
//! restart voting, lobby chat, and an in-memory scoreboard.
//!
//! The server is layered: transport (WebSocket frames) → protocol (tagged
//! JSON actions/events) → session (identity + presence) → rooms (one actor
//! per room) → this crate, which ties them together in a per-connection
//! router.
//!
//! ```rust,no_run
//! use parlor::GameServerBuilder;
//! # use parlor_session::{AuthError, AuthProvider, Identity};
//! # use parlor_score::Scoreboard;
//! # struct MyAuth;
//! # impl AuthProvider for MyAuth {
//! #     async fn resolve(&self, t: &str) -> Result<Identity, AuthError> {
//! #         Ok(Identity { username: t.into() })
//! #     }
//! # }
//!
//! # async fn run() -> Result<(), parlor::ServerError> {
//! let server = GameServerBuilder::new()
//!     .bind("0.0.0.0:3000")
//!     .build(MyAuth, Scoreboard::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod lobby;
mod router;
mod server;

pub use error::ServerError;
pub use lobby::LobbyLog;
pub use server::{GameServer, GameServerBuilder, PROTOCOL_VERSION};
