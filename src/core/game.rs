use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::scoring;

/// A player's fixed identity for the duration of one game. The first
/// accepted connection sits at P0 and always guesses first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    P0,
    P1,
}

impl Seat {
    /// Turn order within a round.
    pub const ALL: [Seat; 2] = [Seat::P0, Seat::P1];

    pub fn index(self) -> usize {
        match self {
            Seat::P0 => 0,
            Seat::P1 => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::P0 => Seat::P1,
            Seat::P1 => Seat::P0,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}

/// Final result of a game, computed exactly once after the turn loop exits.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A seat guessed the secret exactly; play stopped on the spot.
    Exact { winner: Seat },
    /// Rounds ran out and one seat finished strictly ahead.
    ByScore { winner: Seat, total: u32 },
    /// Rounds ran out with equal totals.
    Draw { total: u32 },
    /// A seat's connection was lost mid-game; the survivor wins.
    Forfeit { winner: Seat },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Exact { winner } => {
                write!(f, "{winner} guessed the exact number and wins!")
            }
            Outcome::ByScore { winner, total } => {
                write!(f, "No one guessed the exact number, but {winner} wins by score: {total}.")
            }
            Outcome::Draw { total } => {
                write!(f, "It's a draw! Both players scored {total}.")
            }
            Outcome::Forfeit { winner } => {
                write!(f, "{winner} wins: the other player disconnected.")
            }
        }
    }
}

/// What one turn earned: the points awarded and the seat's new total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnScore {
    pub score: u32,
    pub total: u32,
}

/// All mutable state of one game, owned by the worker running it.
#[derive(Debug)]
pub struct GameState {
    secret: i32,
    max_rounds: u32,
    totals: [u32; 2],
    exact_winner: Option<Seat>,
    forfeit_winner: Option<Seat>,
}

impl GameState {
    pub fn new(secret: i32, max_rounds: u32) -> Self {
        Self {
            secret,
            max_rounds,
            totals: [0, 0],
            exact_winner: None,
            forfeit_winner: None,
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn totals(&self) -> [u32; 2] {
        self.totals
    }

    /// Score a guess, add it to the seat's total, and record the seat as the
    /// winner if the guess was exact.
    pub fn apply_guess(&mut self, seat: Seat, guess: i32) -> TurnScore {
        let score = scoring::score(guess, self.secret);
        self.totals[seat.index()] += score;
        if score == scoring::EXACT {
            self.exact_winner = Some(seat);
        }
        TurnScore {
            score,
            total: self.totals[seat.index()],
        }
    }

    /// A turn that produced no usable guess scores zero.
    pub fn forfeit_turn(&mut self, seat: Seat) -> TurnScore {
        TurnScore {
            score: 0,
            total: self.totals[seat.index()],
        }
    }

    /// Record that `quitter`'s connection is gone; the other seat wins.
    pub fn forfeit_game(&mut self, quitter: Seat) {
        self.forfeit_winner = Some(quitter.other());
    }

    /// True once an exact match or a forfeit has ended the game early.
    pub fn is_over(&self) -> bool {
        self.exact_winner.is_some() || self.forfeit_winner.is_some()
    }

    /// Resolution order: forfeit, then exact match, then total comparison.
    pub fn outcome(&self) -> Outcome {
        if let Some(winner) = self.forfeit_winner {
            return Outcome::Forfeit { winner };
        }
        if let Some(winner) = self.exact_winner {
            return Outcome::Exact { winner };
        }
        let [p0, p1] = self.totals;
        match p0.cmp(&p1) {
            std::cmp::Ordering::Greater => Outcome::ByScore { winner: Seat::P0, total: p0 },
            std::cmp::Ordering::Less => Outcome::ByScore { winner: Seat::P1, total: p1 },
            std::cmp::Ordering::Equal => Outcome::Draw { total: p0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_per_seat() {
        let mut state = GameState::new(50, 3);
        assert_eq!(state.apply_guess(Seat::P0, 45), TurnScore { score: 50, total: 50 });
        assert_eq!(state.apply_guess(Seat::P1, 90), TurnScore { score: 35, total: 35 });
        assert_eq!(state.apply_guess(Seat::P0, 60), TurnScore { score: 50, total: 100 });
        assert_eq!(state.totals(), [100, 35]);
        assert!(!state.is_over());
    }

    #[test]
    fn exact_guess_ends_the_game() {
        let mut state = GameState::new(50, 3);
        let turn = state.apply_guess(Seat::P1, 50);
        assert_eq!(turn.score, 100);
        assert!(state.is_over());
        assert_eq!(state.outcome(), Outcome::Exact { winner: Seat::P1 });
    }

    #[test]
    fn exact_match_outranks_a_higher_total() {
        let mut state = GameState::new(50, 3);
        state.apply_guess(Seat::P0, 45); // 50 points
        state.apply_guess(Seat::P0, 55); // 100 total
        state.apply_guess(Seat::P1, 50); // exact, total only 100 as well
        assert_eq!(state.outcome(), Outcome::Exact { winner: Seat::P1 });
    }

    #[test]
    fn higher_total_wins_when_no_one_was_exact() {
        let mut state = GameState::new(50, 3);
        state.apply_guess(Seat::P0, 45);
        state.apply_guess(Seat::P1, 150);
        assert_eq!(
            state.outcome(),
            Outcome::ByScore { winner: Seat::P0, total: 50 }
        );
    }

    #[test]
    fn equal_totals_draw() {
        let mut state = GameState::new(50, 1);
        state.apply_guess(Seat::P0, 45);
        state.apply_guess(Seat::P1, 55);
        assert_eq!(state.outcome(), Outcome::Draw { total: 50 });
    }

    #[test]
    fn forfeit_outranks_everything() {
        let mut state = GameState::new(50, 3);
        state.apply_guess(Seat::P0, 50); // exact
        state.forfeit_game(Seat::P0);    // then P0 drops before game over
        assert_eq!(state.outcome(), Outcome::Forfeit { winner: Seat::P1 });
    }

    #[test]
    fn forfeited_turn_scores_zero() {
        let mut state = GameState::new(50, 3);
        state.apply_guess(Seat::P0, 45);
        let turn = state.forfeit_turn(Seat::P0);
        assert_eq!(turn, TurnScore { score: 0, total: 50 });
        assert_eq!(state.totals(), [50, 0]);
    }
}
