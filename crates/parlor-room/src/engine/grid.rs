//! Tic-tac-toe: a 3×3 board, three identical marks in a line win.

use parlor_protocol::{GameSnapshot, Role, Verdict};

use crate::RuleError;

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Board state for one tic-tac-toe match.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: [Option<Role>; 9],
    turn: Role,
    verdict: Option<Verdict>,
}

impl TicTacToe {
    /// An empty board with `first` to act.
    pub fn new(first: Role) -> Self {
        Self {
            board: [None; 9],
            turn: first,
            verdict: None,
        }
    }

    /// Whose turn it is.
    pub fn turn(&self) -> Role {
        self.turn
    }

    /// The final verdict, once the match ended.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Claims `cell` for `mark`.
    ///
    /// On success returns the verdict if this move ended the match: a win
    /// is detected immediately on the completing move, a full board with no
    /// line is a draw. Otherwise the turn flips to the other seat.
    pub fn place(&mut self, cell: u8, mark: Role) -> Result<Option<Verdict>, RuleError> {
        if self.verdict.is_some() {
            return Err(RuleError::MatchOver);
        }
        let idx = usize::from(cell);
        if idx >= self.board.len() {
            return Err(RuleError::CellOutOfRange(cell));
        }
        if self.board[idx].is_some() {
            return Err(RuleError::CellOccupied(cell));
        }
        if mark != self.turn {
            return Err(RuleError::NotYourTurn(mark));
        }

        self.board[idx] = Some(mark);
        if let Some(verdict) = self.evaluate() {
            self.verdict = Some(verdict);
            return Ok(Some(verdict));
        }
        self.turn = self.turn.other();
        Ok(None)
    }

    fn evaluate(&self) -> Option<Verdict> {
        for [a, b, c] in LINES {
            if let Some(mark) = self.board[a] {
                if self.board[b] == Some(mark) && self.board[c] == Some(mark) {
                    return Some(mark.into());
                }
            }
        }
        if self.board.iter().all(Option::is_some) {
            return Some(Verdict::Draw);
        }
        None
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::TicTacToe {
            board: self.board.to_vec(),
            turn: self.turn,
            winner: self.verdict,
        }
    }
}
