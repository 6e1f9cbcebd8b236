//! The presence registry: every authenticated connection currently online.
//!
//! This backs the lobby — global broadcasts (room listings, lobby chat,
//! who's-online updates) fan out through the senders registered here.
//!
//! Not thread-safe by itself; the server wraps it in a `Mutex` and never
//! holds the lock across I/O.

use std::collections::HashMap;

use parlor_protocol::ServerEvent;
use parlor_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel for pushing events to one connection's writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

struct OnlineUser {
    username: String,
    sender: EventSender,
}

/// Tracks who is online and how to reach them.
#[derive(Default)]
pub struct Presence {
    online: HashMap<ConnectionId, OnlineUser>,
}

impl Presence {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly authenticated connection.
    ///
    /// A stale entry under the same id (shouldn't happen — ids are never
    /// reused) is replaced.
    pub fn insert(&mut self, conn: ConnectionId, username: &str, sender: EventSender) {
        self.online.insert(
            conn,
            OnlineUser { username: username.to_string(), sender },
        );
        tracing::debug!(%conn, username, online = self.online.len(), "user online");
    }

    /// Removes a connection; returns its username if it was registered.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<String> {
        let user = self.online.remove(&conn)?;
        tracing::debug!(
            %conn,
            username = %user.username,
            online = self.online.len(),
            "user offline"
        );
        Some(user.username)
    }

    /// The username behind a connection, if it is online.
    pub fn username(&self, conn: ConnectionId) -> Option<&str> {
        self.online.get(&conn).map(|u| u.username.as_str())
    }

    /// Usernames of everyone online, in no particular order.
    pub fn users(&self) -> Vec<String> {
        self.online.values().map(|u| u.username.clone()).collect()
    }

    /// Number of connections online.
    pub fn len(&self) -> usize {
        self.online.len()
    }

    /// Whether nobody is online.
    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }

    /// Sends an event to every online connection.
    ///
    /// Dead receivers (connection mid-teardown) are silently skipped; the
    /// disconnect path will prune them.
    pub fn broadcast(&self, event: &ServerEvent) {
        for user in self.online.values() {
            let _ = user.sender.send(event.clone());
        }
    }

    /// Sends an event to one connection, if it is online.
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(user) = self.online.get(&conn) {
            let _ = user.sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (EventSender, mpsc::UnboundedReceiver<ServerEvent>) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn insert_and_remove_track_usernames() {
        let mut presence = Presence::new();
        let (tx, _rx) = channel();
        presence.insert(ConnectionId::new(1), "ada", tx);

        assert_eq!(presence.username(ConnectionId::new(1)), Some("ada"));
        assert_eq!(presence.len(), 1);
        assert_eq!(presence.remove(ConnectionId::new(1)), Some("ada".into()));
        assert!(presence.is_empty());
        assert_eq!(presence.remove(ConnectionId::new(1)), None);
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let mut presence = Presence::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        presence.insert(ConnectionId::new(1), "ada", tx1);
        presence.insert(ConnectionId::new(2), "bob", tx2);

        presence.broadcast(&ServerEvent::LobbyUpdate {
            users: vec!["ada".into(), "bob".into()],
        });

        assert!(matches!(rx1.try_recv(), Ok(ServerEvent::LobbyUpdate { .. })));
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::LobbyUpdate { .. })));
    }

    #[test]
    fn send_to_is_unicast() {
        let mut presence = Presence::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        presence.insert(ConnectionId::new(1), "ada", tx1);
        presence.insert(ConnectionId::new(2), "bob", tx2);

        presence.send_to(
            ConnectionId::new(2),
            ServerEvent::Error { message: "nope".into() },
        );

        assert!(rx1.try_recv().is_err());
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::Error { .. })));
    }

    #[test]
    fn broadcast_skips_dead_receivers() {
        let mut presence = Presence::new();
        let (tx1, rx1) = channel();
        drop(rx1);
        let (tx2, mut rx2) = channel();
        presence.insert(ConnectionId::new(1), "ada", tx1);
        presence.insert(ConnectionId::new(2), "bob", tx2);

        // Must not panic or error out half-way.
        presence.broadcast(&ServerEvent::LobbyUpdate { users: vec![] });
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::LobbyUpdate { .. })));
    }
}
