//! Session controller
//!
//! [`Session`] is the single owner of the game state and the training
//! counters. It never sleeps and never touches the network: every operation
//! returns the [`Effect`]s the caller has to carry out (start a timer, fetch
//! a move), and the results come back in through [`Session::fire`] and
//! [`Session::on_automated_move_received`]. The async side lives in
//! [`driver`].

pub mod driver;
pub mod status;

use crate::config::Timings;
use crate::core::{Difficulty, Move, Side};
use crate::error::ServiceError;
use crate::logic::{ChessRules, RulesEngine};
use crate::network::MoveRequest;
use crate::selfplay::TrainingStats;
use shakmaty::{Role, Square};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Deferred work the session asks to be run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestAutomatedMove,
    RestartGame,
}

/// Side effects requested by a session operation.
///
/// `epoch` identifies the game the effect belongs to; completions carrying
/// an older epoch are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Schedule {
        delay: Duration,
        action: Action,
        epoch: u64,
    },
    FetchMove {
        request: MoveRequest,
        epoch: u64,
    },
}

/// What the board should do with a dropped piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanMove {
    Accepted,
    /// Rejected: the piece goes back where it came from.
    Snapback,
}

/// Read-only snapshot for the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub fen: String,
    pub status: String,
    pub stats: TrainingStats,
    pub training: bool,
    pub input_enabled: bool,
    pub difficulty: Difficulty,
    pub game_over: bool,
}

impl SessionView {
    pub fn stats_text(&self) -> String {
        self.stats.to_string()
    }
}

pub struct Session<R: RulesEngine = ChessRules> {
    rules: R,
    stats: TrainingStats,
    training: bool,
    difficulty: Difficulty,
    status: String,
    timings: Timings,
    /// Bumped on every reset.
    epoch: u64,
    awaiting_move: bool,
    outcome_recorded: bool,
    human: Side,
}

impl Session<ChessRules> {
    pub fn new(difficulty: Difficulty, timings: Timings) -> Self {
        Self::with_rules(ChessRules::new(), difficulty, timings)
    }
}

impl<R: RulesEngine> Session<R> {
    pub fn with_rules(rules: R, difficulty: Difficulty, timings: Timings) -> Self {
        let status = status::describe(&rules);
        Session {
            rules,
            stats: TrainingStats::new(),
            training: false,
            difficulty,
            status,
            timings,
            epoch: 0,
            awaiting_move: false,
            outcome_recorded: false,
            human: Side::White,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            fen: self.rules.fen(),
            status: self.status.clone(),
            stats: self.stats,
            training: self.training,
            input_enabled: !self.training,
            difficulty: self.difficulty,
            game_over: self.rules.is_game_over(),
        }
    }

    /// Drag-start guard: only the human's own pieces, on the human's turn,
    /// outside training and before the game is over.
    pub fn can_drag(&self, square: Square) -> bool {
        !self.training
            && !self.rules.is_game_over()
            && self.rules.turn() == self.human
            && self.rules.piece_side(square) == Some(self.human)
    }

    /// Ignored while training; the control is disabled then.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.training {
            debug!(%difficulty, "difficulty change ignored during training");
            return false;
        }
        self.difficulty = difficulty;
        true
    }

    pub fn apply_human_move(&mut self, from: Square, to: Square) -> (HumanMove, Vec<Effect>) {
        if self.training || self.rules.turn() != self.human {
            debug!(%from, %to, "human move out of turn");
            return (HumanMove::Snapback, Vec::new());
        }

        let mv = Move::Structured {
            from,
            to,
            promotion: Some(Role::Queen),
        };
        if let Err(e) = self.rules.apply(&mv) {
            debug!(%mv, error = %e, "human move rejected");
            return (HumanMove::Snapback, Vec::new());
        }
        info!(%mv, "human move");

        let mut effects = self.recompute_status();
        effects.push(self.schedule(
            self.timings.after_human_move,
            Action::RequestAutomatedMove,
        ));
        (HumanMove::Accepted, effects)
    }

    pub fn request_automated_move(&mut self) -> Vec<Effect> {
        if self.rules.is_game_over() {
            return Vec::new();
        }
        // A timer left over from training may still land here after a stop;
        // it only goes through on the automated side's turn.
        if !self.training && self.rules.turn() == self.human {
            debug!("not the automated side's turn");
            return Vec::new();
        }
        if self.awaiting_move {
            debug!("move request already in flight");
            return Vec::new();
        }

        let request = MoveRequest {
            fen: self.rules.fen(),
            elo: self.difficulty,
        };
        debug!(fen = %request.fen, elo = %request.elo, "requesting automated move");
        self.status = status::THINKING.to_string();
        self.awaiting_move = true;
        vec![Effect::FetchMove {
            request,
            epoch: self.epoch,
        }]
    }

    pub fn on_automated_move_received(
        &mut self,
        epoch: u64,
        result: Result<String, ServiceError>,
    ) -> Vec<Effect> {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding move for a finished game");
            return Vec::new();
        }
        self.awaiting_move = false;

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "move service failed");
                self.status = status::SERVICE_FAILED.to_string();
                return Vec::new();
            }
        };

        if let Err(e) = self.rules.apply(&Move::notation(text.as_str())) {
            warn!(mv = %text, error = %e, "move service returned an unusable move");
            self.status = status::INVALID_SERVICE_MOVE.to_string();
            return Vec::new();
        }
        info!(mv = %text, "automated move");

        let mut effects = self.recompute_status();
        if self.training && !self.rules.is_game_over() {
            effects.push(self.schedule(
                self.timings.between_training_moves,
                Action::RequestAutomatedMove,
            ));
        }
        effects
    }

    /// Derive the status text; while training, a newly terminal position is
    /// counted once and a restart is scheduled.
    pub fn recompute_status(&mut self) -> Vec<Effect> {
        self.status = status::describe(&self.rules);

        let Some(outcome) = status::outcome(&self.rules) else {
            return Vec::new();
        };
        info!(?outcome, status = %self.status, "game finished");
        if !self.training || self.outcome_recorded {
            return Vec::new();
        }

        self.outcome_recorded = true;
        self.stats.record(outcome);
        info!(stats = %self.stats, "training game recorded");
        vec![self.schedule(self.timings.before_restart, Action::RestartGame)]
    }

    /// Timer expiry. Timers from an earlier game are ignored.
    pub fn fire(&mut self, action: Action, epoch: u64) -> Vec<Effect> {
        if epoch != self.epoch {
            debug!(?action, epoch, "stale timer");
            return Vec::new();
        }
        match action {
            Action::RequestAutomatedMove => self.request_automated_move(),
            Action::RestartGame => self.restart_game(),
        }
    }

    /// Back to the starting position with a fresh status. Training counters
    /// are left alone; if training is running the next game's first move is
    /// scheduled rather than requested, so the status stays untouched.
    pub fn reset(&mut self) -> Vec<Effect> {
        self.reset_board();
        if self.training {
            vec![self.schedule(
                self.timings.between_training_moves,
                Action::RequestAutomatedMove,
            )]
        } else {
            Vec::new()
        }
    }

    pub fn start_training(&mut self) -> Vec<Effect> {
        if self.training {
            return Vec::new();
        }
        info!(elo = %self.difficulty, "training started");
        self.training = true;
        self.stats = TrainingStats::new();
        self.reset_board();
        self.request_automated_move()
    }

    /// Stops scheduling further moves. A request already on the wire still
    /// lands, and the counters stay for display.
    pub fn stop_training(&mut self) {
        if !self.training {
            return;
        }
        info!(stats = %self.stats, "training stopped");
        self.training = false;
    }

    fn restart_game(&mut self) -> Vec<Effect> {
        self.reset_board();
        if self.training {
            self.request_automated_move()
        } else {
            Vec::new()
        }
    }

    fn reset_board(&mut self) {
        self.rules.reset();
        self.epoch += 1;
        self.awaiting_move = false;
        self.outcome_recorded = false;
        // 開始局面は終局ではないので効果は出ない
        let effects = self.recompute_status();
        debug_assert!(effects.is_empty());
    }

    fn schedule(&self, delay: Duration, action: Action) -> Effect {
        Effect::Schedule {
            delay,
            action,
            epoch: self.epoch,
        }
    }
}
