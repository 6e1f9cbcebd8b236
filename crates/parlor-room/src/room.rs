//! The room state machine: roster, roles, phase, and the restart protocol.
//!
//! A `Room` is plain synchronous state — the actor in `actor.rs` owns one
//! and serializes access to it. Every operation returns a structured
//! outcome; a failed operation leaves the room untouched.

use std::collections::HashSet;

use parlor_protocol::{
    FlipOutcome, GameKind, HandSign, PlayerInfo, Role, RoomId, RoomPhase,
    RoomSnapshot, RoomSummary, Verdict,
};
use parlor_transport::ConnectionId;

use crate::engine::{Engine, RoundProgress};
use crate::{RoomError, RuleError};

#[derive(Debug, Clone)]
struct Player {
    conn: ConnectionId,
    username: String,
    role: Role,
}

#[derive(Debug, Clone)]
struct Spectator {
    conn: ConnectionId,
    username: String,
}

/// What happened when a player took a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Seated; still waiting for an opponent.
    Seated { role: Role },
    /// Seated as the second player; the match is under way.
    Started { role: Role, first_turn: Role },
}

/// What happened when a participant was removed.
#[derive(Debug, Clone)]
pub struct Removal {
    pub username: String,
    pub was_player: bool,
    /// A match was in progress and has been reset to waiting.
    pub match_reset: bool,
    /// Nobody is left; the room should be destroyed.
    pub now_empty: bool,
}

/// Progress of the restart vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// Vote counted; waiting for the other player.
    Pending { votes: usize },
    /// Unanimous: a fresh match started with `first_turn` to act.
    Restarted { first_turn: Role },
}

/// A terminal outcome to hand to the scoreboard.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub verdict: Verdict,
    pub roster: Vec<PlayerInfo>,
}

/// One game room: up to two players, any number of spectators, one engine.
pub struct Room {
    id: RoomId,
    name: String,
    kind: GameKind,
    players: Vec<Player>,
    spectators: Vec<Spectator>,
    restart_votes: HashSet<ConnectionId>,
    /// Seat that acted first in the most recent match; alternates on each
    /// restart so the disadvantage rotates.
    last_starter: Role,
    phase: RoomPhase,
    engine: Engine,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>, kind: GameKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            players: Vec::new(),
            spectators: Vec::new(),
            restart_votes: HashSet::new(),
            last_starter: Role::X,
            phase: RoomPhase::Waiting,
            engine: Engine::new(kind, Role::X),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// The seated players, in seat order.
    pub fn roster(&self) -> Vec<PlayerInfo> {
        self.players
            .iter()
            .map(|p| PlayerInfo {
                username: p.username.clone(),
                role: p.role,
            })
            .collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.spectators.is_empty()
    }

    fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        self.players.iter().find(|p| p.conn == conn).map(|p| p.role)
    }

    /// Seats a player.
    ///
    /// The free role is derived from current occupancy — if X is taken the
    /// newcomer is O, otherwise X — never from join history, so roles stay
    /// distinct even after a mid-wait departure. The second seat starts the
    /// match with a freshly initialized engine and X to act.
    pub fn add_player(
        &mut self,
        conn: ConnectionId,
        username: &str,
    ) -> Result<JoinOutcome, RoomError> {
        if self.players.len() >= 2 {
            return Err(RoomError::RoomFull(self.id));
        }
        if self.phase == RoomPhase::InProgress {
            return Err(RoomError::MatchInProgress);
        }

        let role = if self.players.iter().any(|p| p.role == Role::X) {
            Role::O
        } else {
            Role::X
        };
        self.players.push(Player {
            conn,
            username: username.to_string(),
            role,
        });
        tracing::info!(
            room_id = %self.id,
            %conn,
            username,
            %role,
            "player seated"
        );

        if self.players.len() == 2 {
            self.start_match(Role::X);
            Ok(JoinOutcome::Started { role, first_turn: Role::X })
        } else {
            Ok(JoinOutcome::Seated { role })
        }
    }

    /// Adds a read-only spectator. Always succeeds while the room exists.
    pub fn add_spectator(&mut self, conn: ConnectionId, username: &str) {
        self.spectators.push(Spectator {
            conn,
            username: username.to_string(),
        });
        tracing::debug!(room_id = %self.id, %conn, username, "spectator joined");
    }

    fn start_match(&mut self, first: Role) {
        self.phase = RoomPhase::InProgress;
        self.last_starter = first;
        self.restart_votes.clear();
        self.engine = Engine::new(self.kind, first);
        tracing::info!(room_id = %self.id, first_turn = %first, "match started");
    }

    /// Removes a participant (leave or disconnect).
    ///
    /// A player removed mid-match resets the room to waiting: the engine is
    /// reinitialized and pending restart votes are cleared. The remaining
    /// player keeps their seat and is not matched against anyone new.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Removal> {
        if let Some(idx) = self.players.iter().position(|p| p.conn == conn) {
            let player = self.players.remove(idx);
            self.restart_votes.remove(&conn);
            let match_reset = self.phase == RoomPhase::InProgress;
            if match_reset {
                self.phase = RoomPhase::Waiting;
                self.restart_votes.clear();
                self.engine = Engine::new(self.kind, Role::X);
            }
            tracing::info!(
                room_id = %self.id,
                %conn,
                username = %player.username,
                match_reset,
                "player removed"
            );
            return Some(Removal {
                username: player.username,
                was_player: true,
                match_reset,
                now_empty: self.is_empty(),
            });
        }

        if let Some(idx) = self.spectators.iter().position(|s| s.conn == conn) {
            let spectator = self.spectators.remove(idx);
            return Some(Removal {
                username: spectator.username,
                was_player: false,
                match_reset: false,
                now_empty: self.is_empty(),
            });
        }

        None
    }

    /// Tic-tac-toe move. Returns the scoreboard record if it ended the match.
    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        cell: u8,
        mark: Role,
    ) -> Result<Option<MatchRecord>, RoomError> {
        if self.phase != RoomPhase::InProgress {
            return Err(RuleError::NotInProgress.into());
        }
        let role = self.role_of(conn).ok_or(RoomError::NotAPlayer)?;
        if role != mark {
            return Err(RuleError::WrongMark(mark).into());
        }
        let Engine::TicTacToe(grid) = &mut self.engine else {
            return Err(RoomError::WrongGame(self.kind));
        };

        let verdict = grid.place(cell, mark)?;
        Ok(verdict.map(|verdict| {
            self.phase = RoomPhase::Finished;
            tracing::info!(room_id = %self.id, ?verdict, "match finished");
            MatchRecord { verdict, roster: self.roster() }
        }))
    }

    /// Rock-paper-scissors submission.
    pub fn submit_choice(
        &mut self,
        conn: ConnectionId,
        choice: HandSign,
    ) -> Result<RoundProgress, RoomError> {
        if self.phase != RoomPhase::InProgress {
            return Err(RuleError::NotInProgress.into());
        }
        let role = self.role_of(conn).ok_or(RoomError::NotAPlayer)?;
        let Engine::RockPaperScissors(game) = &mut self.engine else {
            return Err(RoomError::WrongGame(self.kind));
        };
        Ok(game.submit(role, choice))
    }

    /// Memory-match flip. Returns the outcome; the final pair moves the
    /// room to finished.
    pub fn flip_card(
        &mut self,
        conn: ConnectionId,
        card_id: u8,
    ) -> Result<FlipOutcome, RoomError> {
        if self.phase != RoomPhase::InProgress {
            return Err(RuleError::NotInProgress.into());
        }
        if self.role_of(conn).is_none() {
            return Err(RoomError::NotAPlayer);
        }
        let Engine::MemoryMatch(game) = &mut self.engine else {
            return Err(RoomError::WrongGame(self.kind));
        };

        let outcome = game.flip(card_id)?;
        if let FlipOutcome::Matched { winner: Some(verdict), .. } = &outcome {
            self.phase = RoomPhase::Finished;
            tracing::info!(room_id = %self.id, ?verdict, "match finished");
        }
        Ok(outcome)
    }

    /// Deferred hide of a mismatched pair. Safe no-op when the cards were
    /// matched or hidden in the meantime, or when this isn't memory-match.
    /// Returns whether anything changed.
    pub fn conceal_cards(&mut self, ids: [u8; 2]) -> bool {
        match &mut self.engine {
            Engine::MemoryMatch(game) => game.conceal(ids),
            _ => false,
        }
    }

    /// Records a restart vote.
    ///
    /// Valid only once the match finished, and only for seated players —
    /// spectators don't get a say. Voting twice is idempotent. Unanimity
    /// (both current players) starts a fresh match with the first-actor
    /// seat alternated from the previous match.
    pub fn request_restart(
        &mut self,
        conn: ConnectionId,
    ) -> Result<RestartOutcome, RoomError> {
        if self.phase != RoomPhase::Finished {
            return Err(RoomError::NotFinished);
        }
        if self.role_of(conn).is_none() {
            return Err(RoomError::NotAPlayer);
        }

        self.restart_votes.insert(conn);
        if self.players.len() == 2 && self.restart_votes.len() == 2 {
            let first = self.last_starter.other();
            self.start_match(first);
            Ok(RestartOutcome::Restarted { first_turn: first })
        } else {
            Ok(RestartOutcome::Pending { votes: self.restart_votes.len() })
        }
    }

    /// Full state for broadcasts and late joiners.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            phase: self.phase,
            players: self.roster(),
            spectators: self
                .spectators
                .iter()
                .map(|s| s.username.clone())
                .collect(),
            game: self.engine.snapshot(),
        }
    }

    /// Listing row.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            phase: self.phase,
            player_count: self.players.len(),
            spectator_count: self.spectators.len(),
            players: self.roster(),
        }
    }
}

#[cfg(test)]
impl Room {
    /// Swaps in a prepared engine; tests use this to pin memory-match decks.
    pub(crate) fn set_engine(&mut self, engine: Engine) {
        self.engine = engine;
    }
}
