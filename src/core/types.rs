use serde::{Deserialize, Serialize};
use std::fmt;

/// 手番 (先手 = White)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Default for Side {
    fn default() -> Self {
        Side::White
    }
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strength parameter handed to the move service (ELO-like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(pub u32);

impl Difficulty {
    pub const MIN: u32 = 400;
    pub const MAX: u32 = 3000;

    /// Slider semantics: out-of-range values stick to the nearest end.
    pub fn new(elo: u32) -> Self {
        Difficulty(elo.clamp(Self::MIN, Self::MAX))
    }

    pub fn elo(self) -> u32 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(1500)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_clamps_to_slider_range() {
        assert_eq!(Difficulty::new(100).elo(), Difficulty::MIN);
        assert_eq!(Difficulty::new(9999).elo(), Difficulty::MAX);
        assert_eq!(Difficulty::new(1200).elo(), 1200);
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::White.opponent(), Side::Black);
        assert_eq!(Side::Black.opponent().name(), "White");
    }
}
