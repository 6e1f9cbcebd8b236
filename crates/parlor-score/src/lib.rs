//! The scoreboard: consumes terminal match outcomes, serves a ranking.
//!
//! The server only depends on the [`ScoreRecorder`] trait — persistence is
//! someone else's problem (a database-backed implementation slots in
//! without touching the core). [`Scoreboard`] is the in-memory reference
//! implementation.

use std::collections::HashMap;

use parlor_protocol::{PlayerInfo, ScoreEntry, Verdict};

/// Consumes terminal outcomes and answers ranking queries.
pub trait ScoreRecorder: Send + Sync + 'static {
    /// Records one finished match (or one resolved round): the winner gets
    /// a win, the loser a loss, and a draw credits both.
    fn record_result(&mut self, verdict: Verdict, roster: &[PlayerInfo]);

    /// The top `n` usernames, ordered by wins, then win rate, then games
    /// played.
    fn top(&self, n: usize) -> Vec<ScoreEntry>;
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    wins: u32,
    losses: u32,
    draws: u32,
}

/// In-memory [`ScoreRecorder`]. State dies with the process.
#[derive(Debug, Default)]
pub struct Scoreboard {
    tallies: HashMap<String, Tally>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn tally_mut(&mut self, username: &str) -> &mut Tally {
        self.tallies.entry(username.to_string()).or_default()
    }

    /// Stats for one user (all zeroes when unknown).
    pub fn stats(&self, username: &str) -> (u32, u32, u32) {
        let tally = self.tallies.get(username).copied().unwrap_or_default();
        (tally.wins, tally.losses, tally.draws)
    }
}

impl ScoreRecorder for Scoreboard {
    fn record_result(&mut self, verdict: Verdict, roster: &[PlayerInfo]) {
        // A result only makes sense with both seats occupied.
        if roster.len() != 2 {
            tracing::warn!(
                players = roster.len(),
                "dropping result without a full roster"
            );
            return;
        }

        match verdict.winning_role() {
            None => {
                for player in roster {
                    self.tally_mut(&player.username).draws += 1;
                }
            }
            Some(winner) => {
                for player in roster {
                    let tally = self.tally_mut(&player.username);
                    if player.role == winner {
                        tally.wins += 1;
                    } else {
                        tally.losses += 1;
                    }
                }
            }
        }
        tracing::debug!(?verdict, "result recorded");
    }

    fn top(&self, n: usize) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .tallies
            .iter()
            .map(|(username, tally)| {
                let games = tally.wins + tally.losses + tally.draws;
                let win_rate = if games > 0 {
                    tally.wins as f32 / games as f32 * 100.0
                } else {
                    0.0
                };
                ScoreEntry {
                    username: username.clone(),
                    wins: tally.wins,
                    losses: tally.losses,
                    draws: tally.draws,
                    games,
                    win_rate,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.win_rate.total_cmp(&a.win_rate))
                .then(b.games.cmp(&a.games))
        });
        entries.truncate(n);
        entries
    }
}

#[cfg(test)]
mod tests {
    use parlor_protocol::Role;

    use super::*;

    fn roster(a: &str, b: &str) -> Vec<PlayerInfo> {
        vec![
            PlayerInfo { username: a.into(), role: Role::X },
            PlayerInfo { username: b.into(), role: Role::O },
        ]
    }

    #[test]
    fn win_credits_winner_and_loser() {
        let mut board = Scoreboard::new();
        board.record_result(Verdict::X, &roster("ada", "bob"));
        assert_eq!(board.stats("ada"), (1, 0, 0));
        assert_eq!(board.stats("bob"), (0, 1, 0));
    }

    #[test]
    fn draw_credits_both() {
        let mut board = Scoreboard::new();
        board.record_result(Verdict::Draw, &roster("ada", "bob"));
        assert_eq!(board.stats("ada"), (0, 0, 1));
        assert_eq!(board.stats("bob"), (0, 0, 1));
    }

    #[test]
    fn winner_is_found_by_role_not_position() {
        let mut board = Scoreboard::new();
        board.record_result(Verdict::O, &roster("ada", "bob"));
        assert_eq!(board.stats("ada"), (0, 1, 0));
        assert_eq!(board.stats("bob"), (1, 0, 0));
    }

    #[test]
    fn partial_roster_is_dropped() {
        let mut board = Scoreboard::new();
        board.record_result(
            Verdict::X,
            &[PlayerInfo { username: "ada".into(), role: Role::X }],
        );
        assert_eq!(board.stats("ada"), (0, 0, 0));
    }

    #[test]
    fn ranking_orders_by_wins_then_rate_then_games() {
        let mut board = Scoreboard::new();
        // ada ends at 2W 1L (66.7% of 3), eve at 2W 1L 1D (50% of 4),
        // bob at 0W 2L 1D.
        board.record_result(Verdict::X, &roster("ada", "bob"));
        board.record_result(Verdict::X, &roster("ada", "eve"));
        board.record_result(Verdict::O, &roster("bob", "eve"));
        board.record_result(Verdict::O, &roster("ada", "eve"));
        board.record_result(Verdict::Draw, &roster("eve", "bob"));

        let top = board.top(10);
        // ada and eve both have 2 wins; ada's win rate is higher.
        assert_eq!(top[0].username, "ada");
        assert_eq!(top[1].username, "eve");
        assert_eq!(top[2].username, "bob");
        assert_eq!(top[0].wins, 2);
        assert_eq!(top[1].wins, 2);
    }

    #[test]
    fn top_truncates() {
        let mut board = Scoreboard::new();
        board.record_result(Verdict::X, &roster("ada", "bob"));
        board.record_result(Verdict::X, &roster("eve", "mal"));
        assert_eq!(board.top(2).len(), 2);
        assert_eq!(board.top(0).len(), 0);
    }

    #[test]
    fn win_rate_is_a_percentage() {
        let mut board = Scoreboard::new();
        board.record_result(Verdict::X, &roster("ada", "bob"));
        board.record_result(Verdict::Draw, &roster("ada", "bob"));
        let top = board.top(10);
        let ada = top.iter().find(|e| e.username == "ada").unwrap();
        assert_eq!(ada.games, 2);
        assert!((ada.win_rate - 50.0).abs() < f32::EPSILON);
    }
}
