//! Memory-match: a shuffled deck of symbol pairs, flipped two at a time.
//!
//! Turn handling follows the house rules: a matched pair keeps the turn and
//! credits the turn-holder, a mismatch passes the turn immediately. Whose
//! turn it is does not gate flips — the turn only decides who gets credit.

use std::cmp::Ordering;

use parlor_protocol::{
    CardView, FlipOutcome, GameSnapshot, MatchTallies, Role, Verdict,
};
use rand::seq::SliceRandom;

use crate::RuleError;

/// The standard deck symbols; each appears on exactly two cards.
pub const SYMBOLS: [&str; 6] = ["🍎", "🍌", "🍒", "🥝", "🍇", "🍋"];

#[derive(Debug, Clone)]
struct Card {
    symbol: String,
    revealed: bool,
    matched: bool,
}

/// Deck state for one memory match. Card ids are deck positions.
#[derive(Debug, Clone)]
pub struct MemoryMatch {
    cards: Vec<Card>,
    /// The one face-up, unmatched card of an open pair attempt.
    pending: Option<u8>,
    turn: Role,
    /// Pairs credited per seat (X at 0, O at 1).
    tallies: [u8; 2],
}

impl MemoryMatch {
    /// Deals the standard deck, uniformly shuffled, with `first` to act.
    pub fn deal(first: Role) -> Self {
        let mut deck: Vec<String> = SYMBOLS
            .iter()
            .flat_map(|s| [s.to_string(), s.to_string()])
            .collect();
        deck.shuffle(&mut rand::rng());
        Self::from_deck(deck, first)
    }

    /// Deals a fixed layout, symbols in the exact order given. Each symbol
    /// must appear exactly twice for the match to terminate cleanly.
    pub fn with_layout<S: Into<String>>(
        symbols: impl IntoIterator<Item = S>,
        first: Role,
    ) -> Self {
        Self::from_deck(symbols.into_iter().map(Into::into).collect(), first)
    }

    fn from_deck(deck: Vec<String>, first: Role) -> Self {
        Self {
            cards: deck
                .into_iter()
                .map(|symbol| Card {
                    symbol,
                    revealed: false,
                    matched: false,
                })
                .collect(),
            pending: None,
            turn: first,
            tallies: [0, 0],
        }
    }

    /// Whose turn it is (i.e. who gets credit for the next match).
    pub fn turn(&self) -> Role {
        self.turn
    }

    /// Pairs credited so far, per seat.
    pub fn tallies(&self) -> MatchTallies {
        MatchTallies {
            x: self.tallies[0],
            o: self.tallies[1],
        }
    }

    /// Total pairs in the deck.
    pub fn pairs_total(&self) -> u8 {
        (self.cards.len() / 2) as u8
    }

    fn pairs_matched(&self) -> u8 {
        self.tallies[0] + self.tallies[1]
    }

    /// Turns a card face up.
    ///
    /// Rejected when the card does not exist, is already face up, or is
    /// already matched. The first flip of an attempt stays pending; the
    /// second resolves it:
    /// - equal symbols: both cards matched, the turn-holder credited, same
    ///   seat keeps the turn. The last pair ends the match with the higher
    ///   tally winning (tie → draw).
    /// - different symbols: the turn passes immediately; both cards stay
    ///   face up until the caller's deferred hide runs [`Self::conceal`].
    pub fn flip(&mut self, card_id: u8) -> Result<FlipOutcome, RuleError> {
        let idx = usize::from(card_id);
        let card = self
            .cards
            .get(idx)
            .ok_or(RuleError::UnknownCard(card_id))?;
        if card.matched {
            return Err(RuleError::CardMatched(card_id));
        }
        if card.revealed {
            return Err(RuleError::CardFaceUp(card_id));
        }

        self.cards[idx].revealed = true;
        let Some(first_id) = self.pending.take() else {
            self.pending = Some(card_id);
            return Ok(FlipOutcome::Revealed { card_id });
        };

        let first_idx = usize::from(first_id);
        if self.cards[first_idx].symbol == self.cards[idx].symbol {
            self.cards[first_idx].matched = true;
            self.cards[idx].matched = true;
            self.tallies[self.turn.index()] += 1;
            let winner = (self.pairs_matched() == self.pairs_total())
                .then(|| self.leader());
            Ok(FlipOutcome::Matched {
                cards: [first_id, card_id],
                winner,
            })
        } else {
            self.turn = self.turn.other();
            Ok(FlipOutcome::Mismatch {
                pending: [first_id, card_id],
                turn: self.turn,
            })
        }
    }

    fn leader(&self) -> Verdict {
        match self.tallies[0].cmp(&self.tallies[1]) {
            Ordering::Greater => Verdict::X,
            Ordering::Less => Verdict::O,
            Ordering::Equal => Verdict::Draw,
        }
    }

    /// Turns `ids` face down again.
    ///
    /// Runs from a deferred task, so it re-checks every precondition: a
    /// card that was matched (or already hidden) in the meantime is left
    /// alone. Returns whether anything actually changed.
    pub fn conceal(&mut self, ids: [u8; 2]) -> bool {
        let mut changed = false;
        for id in ids {
            if let Some(card) = self.cards.get_mut(usize::from(id)) {
                if card.revealed && !card.matched {
                    card.revealed = false;
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::MemoryMatch {
            cards: self
                .cards
                .iter()
                .enumerate()
                .map(|(id, card)| CardView {
                    id: id as u8,
                    // Face-down cards never leak their symbol.
                    symbol: (card.revealed || card.matched)
                        .then(|| card.symbol.clone()),
                    revealed: card.revealed,
                    matched: card.matched,
                })
                .collect(),
            tallies: self.tallies(),
            turn: self.turn,
        }
    }
}
