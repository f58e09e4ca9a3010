use crate::logic::RulesEngine;
use crate::selfplay::GameOutcome;

pub const THINKING: &str = "AI is thinking...";
pub const SERVICE_FAILED: &str = "Error: AI failed to respond";
pub const INVALID_SERVICE_MOVE: &str = "Error: AI returned an invalid move";

/// Human-readable status for the current position.
pub fn describe<R: RulesEngine + ?Sized>(rules: &R) -> String {
    let to_move = rules.turn();

    if rules.is_checkmate() {
        // 手番側が詰んでいる
        return format!("Game over, {} is in checkmate.", to_move);
    }
    if rules.is_draw() {
        return "Game over, drawn position".to_string();
    }

    let mut status = format!("{} to move", to_move);
    if rules.is_check() {
        status.push_str(&format!(", {} is in check", to_move));
    }
    status
}

/// Result of the game if the position is terminal.
pub fn outcome<R: RulesEngine + ?Sized>(rules: &R) -> Option<GameOutcome> {
    if rules.is_checkmate() {
        Some(GameOutcome::Win(rules.turn().opponent()))
    } else if rules.is_draw() {
        Some(GameOutcome::Draw)
    } else {
        None
    }
}
