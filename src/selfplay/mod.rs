//! Self-play training statistics
//!
//! Counters live only as long as the process; nothing here is persisted.

use crate::core::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Side),
    Draw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub games_played: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl TrainingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: GameOutcome) {
        self.games_played += 1;
        match outcome {
            GameOutcome::Win(Side::White) => self.white_wins += 1,
            GameOutcome::Win(Side::Black) => self.black_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }

    /// `None` until at least one game has been played.
    pub fn win_rates(&self) -> Option<WinRates> {
        if self.games_played == 0 {
            return None;
        }
        let total = self.games_played as f64;
        Some(WinRates {
            white: self.white_wins as f64 / total * 100.0,
            black: self.black_wins as f64 / total * 100.0,
            draws: self.draws as f64 / total * 100.0,
        })
    }
}

impl fmt::Display for TrainingStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.win_rates() {
            Some(rates) => write!(
                f,
                "Games: {} | White wins: {} ({}) | Black wins: {} ({}) | Draws: {} ({})",
                self.games_played,
                self.white_wins,
                WinRates::percent(rates.white),
                self.black_wins,
                WinRates::percent(rates.black),
                self.draws,
                WinRates::percent(rates.draws),
            ),
            None => write!(
                f,
                "Games: 0 | White wins: {} | Black wins: {} | Draws: {}",
                self.white_wins, self.black_wins, self.draws
            ),
        }
    }
}

/// Percentages of `games_played`, 0.0..=100.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinRates {
    pub white: f64,
    pub black: f64,
    pub draws: f64,
}

impl WinRates {
    /// One decimal place, e.g. `"100.0%"`.
    pub fn percent(value: f64) -> String {
        format!("{:.1}%", value)
    }

    pub fn white_text(&self) -> String {
        Self::percent(self.white)
    }

    pub fn black_text(&self) -> String {
        Self::percent(self.black)
    }

    pub fn draws_text(&self) -> String {
        Self::percent(self.draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rates_before_first_game() {
        let stats = TrainingStats::new();
        assert!(stats.win_rates().is_none());
        assert_eq!(
            stats.to_string(),
            "Games: 0 | White wins: 0 | Black wins: 0 | Draws: 0"
        );
    }

    #[test]
    fn test_record_and_rates() {
        let mut stats = TrainingStats::new();
        stats.record(GameOutcome::Win(Side::White));
        stats.record(GameOutcome::Win(Side::Black));
        stats.record(GameOutcome::Draw);

        assert_eq!(stats.games_played, 3);
        let rates = stats.win_rates().unwrap();
        assert_eq!(rates.white_text(), "33.3%");
        assert_eq!(rates.black_text(), "33.3%");
        assert_eq!(rates.draws_text(), "33.3%");
        assert_eq!(
            stats.to_string(),
            "Games: 3 | White wins: 1 (33.3%) | Black wins: 1 (33.3%) | Draws: 1 (33.3%)"
        );
    }

    #[test]
    fn test_single_black_win() {
        let mut stats = TrainingStats::new();
        stats.record(GameOutcome::Win(Side::Black));
        let rates = stats.win_rates().unwrap();
        assert_eq!(rates.black_text(), "100.0%");
        assert_eq!(rates.white_text(), "0.0%");
    }
}
