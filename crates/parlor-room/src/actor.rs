//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! All mutation flows through the actor's command channel, so actions on a
//! room are applied strictly in arrival order — the single-writer guarantee
//! the rest of the server relies on. Commands that need an answer carry a
//! oneshot reply channel.
//!
//! Event fan-out is split two ways: the actor broadcasts everything room-
//! wide (state syncs, match start, round results), while the router unicasts
//! per-connection messages (acks and errors) from the reply it gets back.

use std::collections::HashMap;

use parlor_protocol::{
    ChatMessage, FlipOutcome, HandSign, Role, RoomId, RoomSummary,
    ServerEvent,
};
use parlor_session::EventSender;
use parlor_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::engine::RoundProgress;
use crate::room::{JoinOutcome, MatchRecord, Removal, RestartOutcome, Room};
use crate::RoomError;

/// Reply to a choice submission.
#[derive(Debug, Clone)]
pub struct ChoiceReply {
    /// The round the submission applied to.
    pub round: u32,
    /// Present when the round resolved (every resolution is recorded).
    pub record: Option<MatchRecord>,
}

/// Reply to a card flip.
#[derive(Debug, Clone)]
pub struct FlipReply {
    /// Mismatched cards the caller must schedule a deferred hide for.
    pub pending: Option<[u8; 2]>,
    /// Present when the final pair ended the match.
    pub record: Option<MatchRecord>,
}

/// Reply to a restart vote.
#[derive(Debug, Clone, Copy)]
pub struct RestartReply {
    pub restarted: bool,
    /// Votes collected so far (meaningful while not restarted).
    pub votes: usize,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        conn: ConnectionId,
        username: String,
        as_spectator: bool,
        /// The joiner created this room — they get `room_created` instead
        /// of `role_assigned`.
        created: bool,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Option<Removal>>,
    },
    MakeMove {
        conn: ConnectionId,
        cell: u8,
        mark: Role,
        reply: oneshot::Sender<Result<Option<MatchRecord>, RoomError>>,
    },
    SubmitChoice {
        conn: ConnectionId,
        choice: HandSign,
        reply: oneshot::Sender<Result<ChoiceReply, RoomError>>,
    },
    FlipCard {
        conn: ConnectionId,
        card_id: u8,
        reply: oneshot::Sender<Result<FlipReply, RoomError>>,
    },
    RequestRestart {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<RestartReply, RoomError>>,
    },
    /// Deferred hide of a mismatched pair; re-validated on arrival.
    HideCards { cards: [u8; 2] },
    Chat { message: ChatMessage },
    Summary {
        reply: oneshot::Sender<RoomSummary>,
    },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id)
    }

    /// Adds a participant; their events flow through `sender` from now on.
    pub async fn join(
        &self,
        conn: ConnectionId,
        username: String,
        as_spectator: bool,
        created: bool,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn,
                username,
                as_spectator,
                created,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a participant. `None` means they weren't in the room.
    pub async fn leave(
        &self,
        conn: ConnectionId,
    ) -> Result<Option<Removal>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave { conn, reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn make_move(
        &self,
        conn: ConnectionId,
        cell: u8,
        mark: Role,
    ) -> Result<Option<MatchRecord>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::MakeMove { conn, cell, mark, reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn submit_choice(
        &self,
        conn: ConnectionId,
        choice: HandSign,
    ) -> Result<ChoiceReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::SubmitChoice { conn, choice, reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn flip_card(
        &self,
        conn: ConnectionId,
        card_id: u8,
    ) -> Result<FlipReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::FlipCard { conn, card_id, reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn request_restart(
        &self,
        conn: ConnectionId,
    ) -> Result<RestartReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::RequestRestart { conn, reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Fire-and-forget: hide a mismatched pair. A closed channel means the
    /// room is already gone, which is exactly the safe no-op case.
    pub async fn hide_cards(&self, cards: [u8; 2]) {
        let _ = self.sender.send(RoomCommand::HideCards { cards }).await;
    }

    /// Fire-and-forget: broadcast a chat line to the room.
    pub async fn chat(&self, message: ChatMessage) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat { message })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Summary { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }
}

/// The actor state. Runs inside its own Tokio task.
struct RoomActor {
    room: Room,
    /// Outbound channel per participant, players and spectators alike.
    senders: HashMap<ConnectionId, EventSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    username,
                    as_spectator,
                    created,
                    sender,
                    reply,
                } => {
                    let result = self
                        .handle_join(conn, &username, as_spectator, created, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn, reply } => {
                    let removal = self.handle_leave(conn);
                    let empty =
                        removal.as_ref().is_some_and(|r| r.now_empty);
                    let _ = reply.send(removal);
                    if empty {
                        // Self-terminate; the registry prunes the handle.
                        break;
                    }
                }
                RoomCommand::MakeMove { conn, cell, mark, reply } => {
                    let _ = reply.send(self.handle_move(conn, cell, mark));
                }
                RoomCommand::SubmitChoice { conn, choice, reply } => {
                    let _ = reply.send(self.handle_choice(conn, choice));
                }
                RoomCommand::FlipCard { conn, card_id, reply } => {
                    let _ = reply.send(self.handle_flip(conn, card_id));
                }
                RoomCommand::RequestRestart { conn, reply } => {
                    let _ = reply.send(self.handle_restart(conn));
                }
                RoomCommand::HideCards { cards } => {
                    if self.room.conceal_cards(cards) {
                        self.broadcast_state();
                    }
                }
                RoomCommand::Chat { message } => {
                    self.broadcast(ServerEvent::RoomMessage {
                        room_id: self.room.id(),
                        message,
                    });
                }
                RoomCommand::Summary { reply } => {
                    let _ = reply.send(self.room.summary());
                }
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        username: &str,
        as_spectator: bool,
        created: bool,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if as_spectator {
            self.room.add_spectator(conn, username);
            let _ = sender.send(ServerEvent::SpectatorJoined {
                snapshot: self.room.snapshot(),
            });
            self.senders.insert(conn, sender);
            self.broadcast_state();
            return Ok(());
        }

        let outcome = self.room.add_player(conn, username)?;
        let (role, started) = match outcome {
            JoinOutcome::Seated { role } => (role, None),
            JoinOutcome::Started { role, first_turn } => (role, Some(first_turn)),
        };

        // Unicast the seat assignment before any broadcast so the joiner
        // learns their own role first.
        let event = if created {
            ServerEvent::RoomCreated {
                room_id: self.room.id(),
                name: self.room.name().to_string(),
                kind: self.room.kind(),
                role,
            }
        } else {
            ServerEvent::RoleAssigned {
                role,
                players: self.room.roster(),
                kind: self.room.kind(),
            }
        };
        let _ = sender.send(event);
        self.senders.insert(conn, sender);

        if let Some(first_turn) = started {
            self.broadcast(ServerEvent::MatchStarted {
                first_turn,
                players: self.room.roster(),
                kind: self.room.kind(),
            });
        }
        self.broadcast_state();
        Ok(())
    }

    fn handle_leave(&mut self, conn: ConnectionId) -> Option<Removal> {
        let removal = self.room.remove(conn)?;
        self.senders.remove(&conn);

        if removal.was_player && self.room.player_count() > 0 {
            self.broadcast(ServerEvent::PlayerDisconnected {
                username: removal.username.clone(),
                remaining_players: self.room.player_count(),
            });
        }
        if !removal.now_empty {
            self.broadcast_state();
        }
        Some(removal)
    }

    fn handle_move(
        &mut self,
        conn: ConnectionId,
        cell: u8,
        mark: Role,
    ) -> Result<Option<MatchRecord>, RoomError> {
        let record = self.room.make_move(conn, cell, mark)?;
        self.broadcast_state();
        Ok(record)
    }

    fn handle_choice(
        &mut self,
        conn: ConnectionId,
        choice: HandSign,
    ) -> Result<ChoiceReply, RoomError> {
        match self.room.submit_choice(conn, choice)? {
            RoundProgress::Waiting { round } => {
                Ok(ChoiceReply { round, record: None })
            }
            RoundProgress::Resolved(result) => {
                self.broadcast(ServerEvent::RoundResult { result });
                self.broadcast_state();
                Ok(ChoiceReply {
                    round: result.round,
                    record: Some(MatchRecord {
                        verdict: result.verdict,
                        roster: self.room.roster(),
                    }),
                })
            }
        }
    }

    fn handle_flip(
        &mut self,
        conn: ConnectionId,
        card_id: u8,
    ) -> Result<FlipReply, RoomError> {
        let outcome = self.room.flip_card(conn, card_id)?;
        self.broadcast_state();

        let (pending, record) = match &outcome {
            FlipOutcome::Mismatch { pending, .. } => (Some(*pending), None),
            FlipOutcome::Matched { winner: Some(verdict), .. } => (
                None,
                Some(MatchRecord {
                    verdict: *verdict,
                    roster: self.room.roster(),
                }),
            ),
            _ => (None, None),
        };
        self.broadcast(ServerEvent::FlipResult { result: outcome });
        Ok(FlipReply { pending, record })
    }

    fn handle_restart(
        &mut self,
        conn: ConnectionId,
    ) -> Result<RestartReply, RoomError> {
        match self.room.request_restart(conn)? {
            RestartOutcome::Restarted { first_turn } => {
                self.broadcast(ServerEvent::RestartConfirmed {
                    first_turn,
                    players: self.room.roster(),
                    kind: self.room.kind(),
                });
                self.broadcast_state();
                Ok(RestartReply { restarted: true, votes: 0 })
            }
            RestartOutcome::Pending { votes } => {
                Ok(RestartReply { restarted: false, votes })
            }
        }
    }

    /// Sends an event to every participant. Dead receivers are skipped;
    /// their connections are mid-teardown and will be removed shortly.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn broadcast_state(&self) {
        self.broadcast(ServerEvent::StateSync {
            snapshot: self.room.snapshot(),
        });
    }
}

/// Spawns a room actor task and returns the handle to talk to it.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let room_id = room.id();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room,
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}
