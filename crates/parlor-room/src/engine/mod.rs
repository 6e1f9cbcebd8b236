//! Pure game rules, one module per variant. No I/O, no networking — every
//! function takes state and returns a result, which is what makes the rules
//! directly testable.

mod grid;
mod memory;
mod rps;

pub use grid::TicTacToe;
pub use memory::{MemoryMatch, SYMBOLS};
pub use rps::{RockPaperScissors, RoundProgress};

use parlor_protocol::{GameKind, GameSnapshot, Role};

/// Exactly one variant's rules apply per room, for its entire lifetime.
///
/// The variant set is closed, so this is an enum rather than a trait: the
/// room matches on it once per action and the rest of the server never sees
/// game internals.
#[derive(Debug, Clone)]
pub enum Engine {
    TicTacToe(TicTacToe),
    RockPaperScissors(RockPaperScissors),
    MemoryMatch(MemoryMatch),
}

impl Engine {
    /// A fresh engine for `kind` with `first` to act.
    ///
    /// Called at room creation, whenever a match (re)starts, and when a
    /// mid-match disconnect resets the room.
    pub fn new(kind: GameKind, first: Role) -> Self {
        match kind {
            GameKind::TicTacToe => Engine::TicTacToe(TicTacToe::new(first)),
            GameKind::RockPaperScissors => {
                Engine::RockPaperScissors(RockPaperScissors::new())
            }
            GameKind::MemoryMatch => Engine::MemoryMatch(MemoryMatch::deal(first)),
        }
    }

    /// Which variant this engine runs.
    pub fn kind(&self) -> GameKind {
        match self {
            Engine::TicTacToe(_) => GameKind::TicTacToe,
            Engine::RockPaperScissors(_) => GameKind::RockPaperScissors,
            Engine::MemoryMatch(_) => GameKind::MemoryMatch,
        }
    }

    /// The variant-specific half of a room snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        match self {
            Engine::TicTacToe(game) => game.snapshot(),
            Engine::RockPaperScissors(game) => game.snapshot(),
            Engine::MemoryMatch(game) => game.snapshot(),
        }
    }
}
