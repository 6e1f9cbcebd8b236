//! Server builder and accept loop.

use std::sync::Arc;

use parlor_protocol::JsonCodec;
use parlor_room::RoomRegistry;
use parlor_score::ScoreRecorder;
use parlor_session::{AuthProvider, Presence};
use parlor_transport::{Transport, WsListener};
use tokio::sync::Mutex;

use crate::lobby::LobbyLog;
use crate::router::handle_connection;
use crate::ServerError;

/// Current protocol version; clients must send it in their `hello`.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state, one per process, handed to every connection task.
///
/// The mutexes guard the registries, never I/O — locks are taken briefly
/// and dropped before anything network-facing runs.
pub(crate) struct ServerState<P: AuthProvider, S: ScoreRecorder> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) presence: Mutex<Presence>,
    pub(crate) scores: Mutex<S>,
    pub(crate) lobby: Mutex<LobbyLog>,
    pub(crate) auth: P,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Parlor server.
pub struct GameServerBuilder {
    bind_addr: String,
}

impl GameServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build<P: AuthProvider, S: ScoreRecorder>(
        self,
        auth: P,
        scores: S,
    ) -> Result<GameServer<P, S>, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new()),
            presence: Mutex::new(Presence::new()),
            scores: Mutex::new(scores),
            lobby: Mutex::new(LobbyLog::new()),
            auth,
            codec: JsonCodec,
        });
        Ok(GameServer { listener, state })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor server. Call [`run`](Self::run) to start accepting.
pub struct GameServer<P: AuthProvider, S: ScoreRecorder> {
    listener: WsListener,
    state: Arc<ServerState<P, S>>,
}

impl<P: AuthProvider, S: ScoreRecorder> GameServer<P, S> {
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// The address actually bound (useful when binding to port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process is terminated, spawning a
    /// router task per connection.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("parlor server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
