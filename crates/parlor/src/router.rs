//! Per-connection router: handshake, action dispatch, and event fan-out.
//!
//! Each accepted connection gets its own task running [`handle_connection`]:
//!
//!   1. Receive `hello` → check version → resolve identity via the
//!      [`AuthProvider`] — nothing touches a room before this succeeds.
//!   2. Register with the lobby presence, replay lobby chat history.
//!   3. Loop: decode actions, route them to the registry/room actors,
//!      unicast failures back to this connection only.
//!   4. On any exit, tear down: leave the room, drop presence, broadcast
//!      the updated lobby and room list.
//!
//! Outbound events all flow through one writer task per connection, so a
//! client sees broadcasts and its own acks in a stable order.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parlor_protocol::{
    ChatMessage, ClientAction, Codec, GameKind, JsonCodec, RoomId,
    ServerEvent,
};
use parlor_room::{MatchRecord, RoomError};
use parlor_score::ScoreRecorder;
use parlor_session::{AuthProvider, EventSender, Identity};
use parlor_transport::{Connection, ConnectionId, WsConnection};
use tokio::sync::mpsc;

use crate::server::{ServerState, PROTOCOL_VERSION};
use crate::ServerError;

/// Delay before a mismatched memory pair is turned face down again.
const HIDE_DELAY: Duration = Duration::from_millis(1200);

/// How long a client gets to complete the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// How many scoreboard rows a `get_scores` request returns.
const SCOREBOARD_LIMIT: usize = 20;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P, S>(
    conn: WsConnection,
    state: Arc<ServerState<P, S>>,
) -> Result<(), ServerError>
where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let conn_id = conn.id();
    let Identity { username } = perform_handshake(&conn, &state).await?;
    tracing::info!(%conn_id, username, "connection authenticated");

    // Everything outbound goes through this channel; the writer task owns
    // the socket's send half.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer_conn = conn.clone();
    let codec = state.codec;
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match codec.encode(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&text).await.is_err() {
                break;
            }
        }
    });

    // Join the lobby: presence entry, who's-online broadcast, chat replay.
    {
        let mut presence = state.presence.lock().await;
        presence.insert(conn_id, &username, tx.clone());
        let users = presence.users();
        presence.broadcast(&ServerEvent::LobbyUpdate { users });
    }
    {
        let lobby = state.lobby.lock().await;
        let _ = tx.send(ServerEvent::LobbyHistory { messages: lobby.history() });
    }

    loop {
        match conn.recv().await {
            Ok(Some(text)) => match state.codec.decode::<ClientAction>(&text) {
                Ok(action) => {
                    dispatch(action, conn_id, &username, &tx, &state).await;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "undecodable frame");
                    report(&tx, format!("invalid action: {e}"));
                }
            },
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    disconnect_cleanup(conn_id, &username, &state).await;
    Ok(())
}

/// Receives and validates `hello`, resolves the identity, sends `welcome`.
async fn perform_handshake<P, S>(
    conn: &WsConnection,
    state: &Arc<ServerState<P, S>>,
) -> Result<Identity, ServerError>
where
    P: AuthProvider,
    S: ScoreRecorder,
{
    use parlor_protocol::ProtocolError::InvalidMessage;

    let text = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await
    {
        Ok(Ok(Some(text))) => text,
        Ok(Ok(None)) => {
            return Err(InvalidMessage("connection closed before hello".into())
                .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(InvalidMessage("handshake timed out".into()).into());
        }
    };

    let action: ClientAction = state.codec.decode(&text)?;
    let ClientAction::Hello { version, token } = action else {
        send_error(conn, &state.codec, "first message must be hello").await?;
        return Err(InvalidMessage("first message must be hello".into()).into());
    };

    if version != PROTOCOL_VERSION {
        let message = format!(
            "protocol version mismatch: expected {PROTOCOL_VERSION}, got {version}"
        );
        send_error(conn, &state.codec, &message).await?;
        return Err(InvalidMessage(message).into());
    }

    let identity = match state.auth.resolve(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            send_error(conn, &state.codec, &e.to_string()).await?;
            return Err(ServerError::Auth(e));
        }
    };

    let welcome = state.codec.encode(&ServerEvent::Welcome {
        username: identity.username.clone(),
    })?;
    conn.send(&welcome).await.map_err(ServerError::Transport)?;
    Ok(identity)
}

/// Routes one decoded action. Failures are unicast to `tx` and never
/// interrupt anyone else.
async fn dispatch<P, S>(
    action: ClientAction,
    conn_id: ConnectionId,
    username: &str,
    tx: &EventSender,
    state: &Arc<ServerState<P, S>>,
) where
    P: AuthProvider,
    S: ScoreRecorder,
{
    match action {
        ClientAction::Hello { .. } => {
            report(tx, "already authenticated");
        }

        ClientAction::CreateRoom { name, kind } => {
            create_room(conn_id, username, name, kind, tx, state).await;
        }

        ClientAction::JoinRoom { room_id, as_spectator } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry
                    .join(conn_id, username, room_id, as_spectator, false, tx.clone())
                    .await
            };
            match result {
                Ok(()) => broadcast_room_list(state).await,
                Err(e) => report(tx, e.to_string()),
            }
        }

        ClientAction::LeaveRoom => {
            let left = { state.registry.lock().await.leave(conn_id).await };
            if left.is_some() {
                broadcast_room_list(state).await;
            }
        }

        ClientAction::MakeMove { room_id, cell, mark } => {
            let Some(handle) = room_handle(state, room_id, tx).await else {
                return;
            };
            match handle.make_move(conn_id, cell, mark).await {
                Ok(Some(record)) => {
                    record_result(state, record).await;
                    broadcast_room_list(state).await;
                }
                Ok(None) => {}
                Err(e) => report(tx, e.to_string()),
            }
        }

        ClientAction::SubmitChoice { room_id, choice } => {
            let Some(handle) = room_handle(state, room_id, tx).await else {
                return;
            };
            match handle.submit_choice(conn_id, choice).await {
                Ok(reply) => match reply.record {
                    Some(record) => record_result(state, record).await,
                    None => {
                        let _ = tx.send(ServerEvent::ChoiceAccepted {
                            round: reply.round,
                        });
                    }
                },
                Err(e) => report(tx, e.to_string()),
            }
        }

        ClientAction::FlipCard { room_id, card_id } => {
            let Some(handle) = room_handle(state, room_id, tx).await else {
                return;
            };
            match handle.flip_card(conn_id, card_id).await {
                Ok(reply) => {
                    if let Some(cards) = reply.pending {
                        schedule_hide(state, room_id, cards);
                    }
                    if let Some(record) = reply.record {
                        record_result(state, record).await;
                        broadcast_room_list(state).await;
                    }
                }
                Err(e) => report(tx, e.to_string()),
            }
        }

        ClientAction::RequestRestart { room_id } => {
            let Some(handle) = room_handle(state, room_id, tx).await else {
                return;
            };
            match handle.request_restart(conn_id).await {
                Ok(reply) if reply.restarted => {
                    broadcast_room_list(state).await;
                }
                Ok(reply) => {
                    let _ = tx.send(ServerEvent::RestartPending {
                        votes: reply.votes,
                    });
                }
                Err(e) => report(tx, e.to_string()),
            }
        }

        ClientAction::ListRooms => {
            let rooms = { state.registry.lock().await.list().await };
            let _ = tx.send(ServerEvent::RoomList { rooms });
        }

        ClientAction::GetScores => {
            let entries =
                { state.scores.lock().await.top(SCOREBOARD_LIMIT) };
            let _ = tx.send(ServerEvent::Scores { entries });
        }

        ClientAction::LobbyChat { message } => {
            let message = message.trim();
            if message.is_empty() {
                return;
            }
            let chat = ChatMessage {
                username: username.to_string(),
                message: message.to_string(),
                timestamp: unix_millis(),
            };
            state.lobby.lock().await.push(chat.clone());
            state
                .presence
                .lock()
                .await
                .broadcast(&ServerEvent::LobbyMessage { message: chat });
        }

        ClientAction::RoomChat { room_id, message } => {
            let message = message.trim();
            if message.is_empty() {
                return;
            }
            let Some(handle) = room_handle(state, room_id, tx).await else {
                return;
            };
            let chat = ChatMessage {
                username: username.to_string(),
                message: message.to_string(),
                timestamp: unix_millis(),
            };
            if let Err(e) = handle.chat(chat).await {
                report(tx, e.to_string());
            }
        }
    }
}

/// Creates a room and seats its creator in one registry critical section.
async fn create_room<P, S>(
    conn_id: ConnectionId,
    username: &str,
    name: Option<String>,
    kind: GameKind,
    tx: &EventSender,
    state: &Arc<ServerState<P, S>>,
) where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let result = {
        let mut registry = state.registry.lock().await;
        // Check membership before creating, or a rejected creator would
        // leave an empty room behind.
        if let Some(current) = registry.member_room(conn_id) {
            Err(RoomError::AlreadyInRoom(current))
        } else {
            let room_id = registry.create(name, kind);
            registry
                .join(conn_id, username, room_id, false, true, tx.clone())
                .await
        }
    };
    match result {
        Ok(()) => broadcast_room_list(state).await,
        Err(e) => report(tx, e.to_string()),
    }
}

/// Looks up a room handle, reporting `not found` to the caller otherwise.
async fn room_handle<P, S>(
    state: &Arc<ServerState<P, S>>,
    room_id: RoomId,
    tx: &EventSender,
) -> Option<parlor_room::RoomHandle>
where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let handle = { state.registry.lock().await.handle(room_id) };
    if handle.is_none() {
        report(tx, RoomError::NotFound(room_id).to_string());
    }
    handle
}

/// Schedules the deferred hide of a mismatched pair.
///
/// At fire time the room handle is re-fetched from the registry and the
/// actor re-validates that each card is still face up and unmatched — a
/// room destroyed or a card matched in the interim makes this a silent
/// no-op. There is no cancellation; re-validation is the safety.
fn schedule_hide<P, S>(
    state: &Arc<ServerState<P, S>>,
    room_id: RoomId,
    cards: [u8; 2],
) where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::time::sleep(HIDE_DELAY).await;
        let handle = { state.registry.lock().await.handle(room_id) };
        if let Some(handle) = handle {
            handle.hide_cards(cards).await;
        }
    });
}

async fn record_result<P, S>(state: &Arc<ServerState<P, S>>, record: MatchRecord)
where
    P: AuthProvider,
    S: ScoreRecorder,
{
    state
        .scores
        .lock()
        .await
        .record_result(record.verdict, &record.roster);
}

/// Rebuilds the room listing and pushes it to every online connection.
async fn broadcast_room_list<P, S>(state: &Arc<ServerState<P, S>>)
where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let rooms = { state.registry.lock().await.list().await };
    state
        .presence
        .lock()
        .await
        .broadcast(&ServerEvent::RoomList { rooms });
}

/// Tears down everything keyed on this connection and tells the world.
async fn disconnect_cleanup<P, S>(
    conn_id: ConnectionId,
    username: &str,
    state: &Arc<ServerState<P, S>>,
) where
    P: AuthProvider,
    S: ScoreRecorder,
{
    let left = { state.registry.lock().await.leave(conn_id).await };

    {
        let mut presence = state.presence.lock().await;
        presence.remove(conn_id);
        let users = presence.users();
        presence.broadcast(&ServerEvent::LobbyUpdate { users });
    }

    if left.is_some() {
        broadcast_room_list(state).await;
    }
    tracing::info!(%conn_id, username, "connection closed");
}

/// Unicast an error to the connection whose action failed.
fn report(tx: &EventSender, message: impl Into<String>) {
    let _ = tx.send(ServerEvent::Error { message: message.into() });
}

/// Sends an error frame directly, for use before the writer task exists.
async fn send_error(
    conn: &WsConnection,
    codec: &JsonCodec,
    message: &str,
) -> Result<(), ServerError> {
    let text = codec.encode(&ServerEvent::Error {
        message: message.to_string(),
    })?;
    conn.send(&text).await.map_err(ServerError::Transport)?;
    Ok(())
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
