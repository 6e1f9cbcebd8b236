//! Room registry: the process-wide table of live rooms.
//!
//! Owns the only external handle to each room actor and the
//! connection → room index that enforces "one room at a time". Rooms are
//! destroyed here the moment their last participant leaves.

use std::collections::HashMap;

use parlor_protocol::{GameKind, RoomId, RoomSummary};
use parlor_session::EventSender;
use parlor_transport::ConnectionId;
use rand::Rng;

use crate::actor::spawn_room;
use crate::room::{Removal, Room};
use crate::{RoomError, RoomHandle};

/// Command channel size per room actor.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates, tracks, and destroys rooms; routes connections to them.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Which room each connection is in. A connection can be in at most
    /// one room at a time.
    members: HashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Creates an empty room and returns its id. The creator still has to
    /// join it like everyone else.
    pub fn create(&mut self, name: Option<String>, kind: GameKind) -> RoomId {
        let id = self.fresh_id();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Room {id}"));
        let handle = spawn_room(Room::new(id, name, kind), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(id, handle);
        tracing::info!(room_id = %id, %kind, "room created");
        id
    }

    /// Random 6-digit id, retried on the (rare) collision.
    fn fresh_id(&self) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let id = RoomId(rng.random_range(100_000..1_000_000));
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Adds a connection to a room, as player or spectator.
    pub async fn join(
        &mut self,
        conn: ConnectionId,
        username: &str,
        room_id: RoomId,
        as_spectator: bool,
        created: bool,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.members.get(&conn) {
            return Err(RoomError::AlreadyInRoom(*current));
        }
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        handle
            .join(conn, username.to_string(), as_spectator, created, sender)
            .await?;
        self.members.insert(conn, room_id);
        Ok(())
    }

    /// Removes a connection from its room, if it is in one. Destroys the
    /// room when it empties.
    pub async fn leave(
        &mut self,
        conn: ConnectionId,
    ) -> Option<(RoomId, Removal)> {
        let room_id = self.members.remove(&conn)?;
        let handle = self.rooms.get(&room_id)?;

        let removal = handle.leave(conn).await.ok().flatten()?;
        if removal.now_empty {
            self.rooms.remove(&room_id);
            tracing::info!(room_id = %room_id, "room destroyed");
        }
        Some((room_id, removal))
    }

    /// A clone of the room's handle, for calls that shouldn't hold the
    /// registry lock across an await.
    pub fn handle(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms.get(&room_id).cloned()
    }

    /// The room a connection is currently in.
    pub fn member_room(&self, conn: ConnectionId) -> Option<RoomId> {
        self.members.get(&conn).copied()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Summaries of every live room, in stable id order. Rooms that fail
    /// to answer (mid-shutdown) are skipped.
    pub async fn list(&self) -> Vec<RoomSummary> {
        let mut summaries = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(summary) = handle.summary().await {
                summaries.push(summary);
            }
        }
        summaries.sort_by_key(|s| s.room_id.0);
        summaries
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
