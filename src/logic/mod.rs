//! Rules engine adapter
//!
//! The session never inspects chess rules itself; it asks a [`RulesEngine`]
//! whether a move applies and what the resulting position looks like.
//! [`ChessRules`] is the standard-chess implementation on top of `shakmaty`.

use crate::core::{Move, Side};
use crate::error::{RulesError, RulesResult};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, Rank, Role, Square};
use std::collections::HashMap;

/// Capability the session controller needs from a rules engine.
pub trait RulesEngine {
    /// Validate and apply a move. On error the position is untouched.
    fn apply(&mut self, mv: &Move) -> RulesResult<()>;

    /// Current position in six-field FEN.
    fn fen(&self) -> String;

    fn turn(&self) -> Side;

    /// Owner of the piece on `square`, if any.
    fn piece_side(&self, square: Square) -> Option<Side>;

    fn is_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Back to the standard starting position.
    fn reset(&mut self);
}

/// 標準チェスのルール (shakmaty)
#[derive(Debug, Clone)]
pub struct ChessRules {
    position: Chess,
    /// 局面履歴 (千日手ならぬ三回同形の判定用)
    seen: HashMap<String, u32>,
}

impl ChessRules {
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    pub fn from_fen(fen: &str) -> RulesResult<Self> {
        Ok(Self::with_position(load_position(fen)?))
    }

    fn with_position(position: Chess) -> Self {
        let mut rules = ChessRules {
            position,
            seen: HashMap::new(),
        };
        rules.remember_position();
        rules
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn remember_position(&mut self) {
        let key = repetition_key(&self.position);
        *self.seen.entry(key).or_insert(0) += 1;
    }

    fn is_threefold_repetition(&self) -> bool {
        self.seen
            .get(&repetition_key(&self.position))
            .is_some_and(|&count| count >= 3)
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ChessRules {
    fn apply(&mut self, mv: &Move) -> RulesResult<()> {
        let resolved = resolve(&self.position, mv)?;
        self.position.play_unchecked(resolved);
        self.remember_position();
        Ok(())
    }

    fn fen(&self) -> String {
        to_fen(&self.position)
    }

    fn turn(&self) -> Side {
        self.position.turn().into()
    }

    fn piece_side(&self, square: Square) -> Option<Side> {
        self.position
            .board()
            .piece_at(square)
            .map(|piece| piece.color.into())
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_stalemate()
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.is_threefold_repetition()
    }

    fn reset(&mut self) {
        self.position = Chess::default();
        self.seen.clear();
        self.remember_position();
    }
}

/// Parse a six-field FEN into a standard chess position.
pub fn load_position(fen: &str) -> RulesResult<Chess> {
    let invalid = |message: String| RulesError::InvalidFen {
        fen: fen.to_string(),
        message,
    };
    let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{}", e)))
}

pub fn to_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Placement, side to move, castling and en passant: the fields that make
/// two positions "the same" for repetition purposes.
fn repetition_key(position: &Chess) -> String {
    to_fen(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve(position: &Chess, mv: &Move) -> RulesResult<shakmaty::Move> {
    match mv {
        Move::Structured {
            from,
            to,
            promotion,
        } => resolve_structured(position, *from, *to, *promotion),
        Move::Notation(text) => resolve_notation(position, text),
    }
}

fn resolve_structured(
    position: &Chess,
    from: Square,
    to: Square,
    promotion: Option<Role>,
) -> RulesResult<shakmaty::Move> {
    // 最終段に到達するポーンだけが成る (既定はクイーン)
    let promotion = match position.board().role_at(from) {
        Some(Role::Pawn) if is_last_rank(to) => Some(promotion.unwrap_or(Role::Queen)),
        _ => None,
    };
    let uci = UciMove::Normal {
        from,
        to,
        promotion,
    };
    uci.to_move(position).map_err(|_| RulesError::Illegal {
        mv: uci.to_string(),
    })
}

/// Accepts UCI (`e2e4`, `e7e8q`), the separated long form (`e2-e4`,
/// `e4xd5`) and SAN (`Nf3`, `O-O`, `e8=Q+`).
fn resolve_notation(position: &Chess, text: &str) -> RulesResult<shakmaty::Move> {
    let text = text.trim();
    let mut recognised = false;

    if let Some(long) = long_algebraic(text) {
        if let Ok(uci) = long.parse::<UciMove>() {
            recognised = true;
            // 成り駒の指定がなければクイーン
            let mv = match uci {
                UciMove::Normal {
                    from,
                    to,
                    promotion: None,
                } => resolve_structured(position, from, to, None),
                _ => uci.to_move(position).map_err(|_| RulesError::Illegal {
                    mv: uci.to_string(),
                }),
            };
            if let Ok(mv) = mv {
                return Ok(mv);
            }
        }
    }

    if let Ok(san) = text.parse::<SanPlus>() {
        recognised = true;
        if let Ok(mv) = san.san.to_move(position) {
            return Ok(mv);
        }
    }

    if recognised {
        Err(RulesError::Illegal {
            mv: text.to_string(),
        })
    } else {
        Err(RulesError::Unparseable {
            notation: text.to_string(),
        })
    }
}

/// Normalise `e2e4` / `e2-e4` / `e4xd5` (optionally with a promotion
/// letter) to bare UCI. Anything else is not long algebraic.
fn long_algebraic(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let is_square = |b: &[u8]| {
        b.len() == 2 && (b'a'..=b'h').contains(&b[0]) && (b'1'..=b'8').contains(&b[1])
    };

    let (from, rest) = bytes.split_at(bytes.len().min(2));
    if !is_square(from) {
        return None;
    }
    let rest = match rest.first() {
        Some(b'-') | Some(b'x') => &rest[1..],
        _ => rest,
    };
    if rest.len() < 2 || !is_square(&rest[..2]) {
        return None;
    }
    match &rest[2..] {
        [] | [b'q' | b'r' | b'b' | b'n'] => {
            Some(format!("{}{}", &lower[..2], String::from_utf8_lossy(rest)))
        }
        [b'=', p @ (b'q' | b'r' | b'b' | b'n')] => Some(format!(
            "{}{}{}",
            &lower[..2],
            String::from_utf8_lossy(&rest[..2]),
            *p as char
        )),
        _ => None,
    }
}

fn is_last_rank(square: Square) -> bool {
    matches!(square.rank(), Rank::First | Rank::Eighth)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_start_position() {
        let rules = ChessRules::new();
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.turn(), Side::White);
        assert!(!rules.is_check());
        assert!(!rules.is_game_over());
    }

    #[test]
    fn test_position_matches_shakmaty_fold() {
        let line = ["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6"];
        let mut rules = ChessRules::new();
        let mut folded = Chess::default();

        for text in line {
            rules.apply(&Move::notation(text)).unwrap();
            let uci: UciMove = text.parse().unwrap();
            let mv = uci.to_move(&folded).unwrap();
            folded = folded.play(mv).unwrap();
            assert_eq!(rules.fen(), to_fen(&folded));
        }
    }

    #[test]
    fn test_wrong_side_is_rejected_without_change() {
        let mut rules = ChessRules::new();
        let before = rules.fen();
        let result = rules.apply(&Move::structured(sq("e7"), sq("e5")));
        assert!(matches!(result, Err(RulesError::Illegal { .. })));
        assert_eq!(rules.fen(), before);
    }

    #[test]
    fn test_loose_notation_forms() {
        let mut rules = ChessRules::new();
        rules.apply(&Move::notation("e4")).unwrap();
        rules.apply(&Move::notation(" e7-e5 ")).unwrap();
        rules.apply(&Move::notation("Nf3")).unwrap();
        rules.apply(&Move::notation("b8c6")).unwrap();
        rules.apply(&Move::notation("Bc4")).unwrap();
        rules.apply(&Move::notation("Nf6")).unwrap();
        rules.apply(&Move::notation("O-O")).unwrap();
        assert_eq!(
            rules.fen(),
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4"
        );
    }

    #[test]
    fn test_promotion_letter_defaults_to_queen() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";

        let mut rules = ChessRules::from_fen(fen).unwrap();
        rules.apply(&Move::notation("e7e8")).unwrap();
        assert_eq!(rules.position().board().role_at(sq("e8")), Some(Role::Queen));

        let mut rules = ChessRules::from_fen(fen).unwrap();
        rules.apply(&Move::notation("e7e8n")).unwrap();
        assert_eq!(rules.position().board().role_at(sq("e8")), Some(Role::Knight));

        let mut rules = ChessRules::from_fen(fen).unwrap();
        rules.apply(&Move::notation("e8=Q+")).unwrap();
        assert_eq!(rules.position().board().role_at(sq("e8")), Some(Role::Queen));
    }

    #[test]
    fn test_capture_long_form() {
        let mut rules = ChessRules::new();
        for text in ["e2e4", "d7d5"] {
            rules.apply(&Move::notation(text)).unwrap();
        }
        rules.apply(&Move::notation("e4xd5")).unwrap();
        assert_eq!(rules.piece_side(sq("d5")), Some(Side::White));
    }

    #[test]
    fn test_garbage_is_unparseable() {
        let mut rules = ChessRules::new();
        for text in ["", "hello", "z9z9", "e2e4e5"] {
            let result = rules.apply(&Move::notation(text));
            assert!(
                matches!(result, Err(RulesError::Unparseable { .. })),
                "{:?} should not parse",
                text
            );
        }
    }

    #[test]
    fn test_well_formed_but_illegal() {
        let mut rules = ChessRules::new();
        let result = rules.apply(&Move::notation("e2e5"));
        assert!(matches!(result, Err(RulesError::Illegal { .. })));
    }

    #[test]
    fn test_structured_pawn_promotes_to_queen_by_default() {
        let mut rules = ChessRules::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        rules.apply(&Move::structured(sq("e7"), sq("e8"))).unwrap();
        assert_eq!(
            rules.position().board().role_at(sq("e8")),
            Some(Role::Queen)
        );
    }

    #[test]
    fn test_structured_castling_by_king_step() {
        let mut rules =
            ChessRules::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        rules.apply(&Move::structured(sq("e1"), sq("g1"))).unwrap();
        assert_eq!(rules.position().board().role_at(sq("f1")), Some(Role::Rook));
        assert_eq!(rules.position().board().role_at(sq("g1")), Some(Role::King));
    }

    #[test]
    fn test_checkmate_detection() {
        let mut rules = ChessRules::new();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            rules.apply(&Move::notation(text)).unwrap();
        }
        assert!(rules.is_checkmate());
        assert!(rules.is_check());
        assert!(!rules.is_draw());
        assert!(rules.is_game_over());
        assert_eq!(rules.turn(), Side::White);
    }

    #[test]
    fn test_stalemate_is_draw() {
        let rules = ChessRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!rules.is_checkmate());
        assert!(rules.is_draw());
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let rules = ChessRules::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert!(rules.is_draw());
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut rules = ChessRules::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for text in shuffle.iter().chain(shuffle.iter()) {
            assert!(!rules.is_draw());
            rules.apply(&Move::notation(*text)).unwrap();
        }
        assert!(rules.is_draw());
    }

    #[test]
    fn test_reset_restores_start_and_forgets_history() {
        let mut rules = ChessRules::new();
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            rules.apply(&Move::notation(text)).unwrap();
        }
        rules.reset();
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.seen.len(), 1);
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(
            ChessRules::from_fen("not a fen"),
            Err(RulesError::InvalidFen { .. })
        ));
    }
}
