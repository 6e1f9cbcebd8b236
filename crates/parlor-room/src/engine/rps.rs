//! Rock-paper-scissors: simultaneous choices, one independent round at a
//! time. There is no terminal state — every resolved round is scored on its
//! own and play simply continues.

use parlor_protocol::{GameSnapshot, HandSign, Role, RoundResolution, Verdict};

/// What a submission did to the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundProgress {
    /// Sign recorded; the other seat hasn't committed yet.
    Waiting { round: u32 },
    /// Both seats committed; the round resolved and the next one is open.
    Resolved(RoundResolution),
}

/// Round state for a rock-paper-scissors room.
#[derive(Debug, Clone)]
pub struct RockPaperScissors {
    /// Committed sign per seat (X at 0, O at 1), cleared on resolution.
    committed: [Option<HandSign>; 2],
    round: u32,
}

impl RockPaperScissors {
    pub fn new() -> Self {
        Self {
            committed: [None; 2],
            round: 1,
        }
    }

    /// The current round number, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Records `sign` for `role`. A seat that submits again before the
    /// round resolves simply overwrites its earlier sign.
    ///
    /// When both seats have committed, the round resolves: circular
    /// dominance picks the winner, equal signs draw, the committed signs
    /// are cleared and the round counter advances.
    pub fn submit(&mut self, role: Role, sign: HandSign) -> RoundProgress {
        self.committed[role.index()] = Some(sign);
        let (Some(x), Some(o)) = (self.committed[0], self.committed[1]) else {
            return RoundProgress::Waiting { round: self.round };
        };

        let verdict = if x == o {
            Verdict::Draw
        } else if x.beats(o) {
            Verdict::X
        } else {
            Verdict::O
        };

        let round = self.round;
        self.committed = [None; 2];
        self.round += 1;
        RoundProgress::Resolved(RoundResolution { x, o, verdict, round })
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let committed = [Role::X, Role::O]
            .into_iter()
            .filter(|role| self.committed[role.index()].is_some())
            .collect();
        GameSnapshot::RockPaperScissors {
            round: self.round,
            committed,
        }
    }
}

impl Default for RockPaperScissors {
    fn default() -> Self {
        Self::new()
    }
}
