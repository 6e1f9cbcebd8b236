//! Lobby chat log: a bounded ring of the most recent messages, replayed to
//! each new connection. Pure passthrough — nothing is persisted or
//! formatted here.

use std::collections::VecDeque;

use parlor_protocol::ChatMessage;

/// How many lobby messages are kept for replay.
const DEFAULT_CAPACITY: usize = 120;

/// Recent lobby messages, oldest first.
pub struct LobbyLog {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl LobbyLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a message, dropping the oldest past capacity.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// The retained messages, oldest first.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for LobbyLog {
    fn default() -> Self {
        Self::new()
    }
}
