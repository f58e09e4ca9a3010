use shakmaty::{Role, Square};
use std::fmt;

/// 指し手
///
/// Either a from/to pair coming from the board (a drag and drop), or a
/// notation string coming from the move service. Neither is meaningful
/// without the position it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Structured {
        from: Square,
        to: Square,
        /// Piece chosen when a pawn reaches the last rank. `None` means queen.
        promotion: Option<Role>,
    },
    Notation(String),
}

impl Move {
    pub fn structured(from: Square, to: Square) -> Self {
        Move::Structured {
            from,
            to,
            promotion: None,
        }
    }

    pub fn notation(text: impl Into<String>) -> Self {
        Move::Notation(text.into())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Move::Structured {
                from,
                to,
                promotion,
            } => match promotion {
                Some(role) => write!(f, "{}{}{}", from, to, role.char()),
                None => write!(f, "{}{}", from, to),
            },
            Move::Notation(text) => f.write_str(text),
        }
    }
}
