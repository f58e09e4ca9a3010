//! Async runtime for a [`Session`]
//!
//! One task owns the session and handles events in arrival order. Timers and
//! move requests run as spawned tasks that post their completion back to
//! that task, so the session is only ever mutated in one place.

use super::{Action, Effect, HumanMove, Session, SessionView};
use crate::core::Difficulty;
use crate::error::ServiceError;
use crate::logic::RulesEngine;
use crate::network::MoveService;
use shakmaty::Square;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// User gestures reported by the presentation side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Drop { from: Square, to: Square },
    Reset,
    StartTraining,
    StopTraining,
    SetDifficulty(Difficulty),
    Quit,
}

/// Completions posted back by spawned tasks.
#[derive(Debug)]
enum Internal {
    Timer {
        action: Action,
        epoch: u64,
    },
    MoveReceived {
        epoch: u64,
        result: Result<String, ServiceError>,
    },
}

/// Presentation adapter
pub trait Presenter: Send {
    fn render(&mut self, view: &SessionView);

    /// A dropped piece was refused and goes back to `from`.
    fn snapback(&mut self, _from: Square, _to: Square) {}
}

/// Run until `Quit` or until the UI side hangs up. Returns the session so
/// the caller can inspect final state.
pub async fn run<R, P>(
    mut session: Session<R>,
    service: Arc<dyn MoveService>,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    mut presenter: P,
) -> anyhow::Result<Session<R>>
where
    R: RulesEngine,
    P: Presenter,
{
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<Internal>();
    presenter.render(&session.view());

    loop {
        let effects = tokio::select! {
            event = ui_rx.recv() => match event {
                None | Some(UiEvent::Quit) => break,
                Some(event) => handle_ui(&mut session, event, &mut presenter),
            },
            Some(internal) = internal_rx.recv() => match internal {
                Internal::Timer { action, epoch } => session.fire(action, epoch),
                Internal::MoveReceived { epoch, result } => {
                    session.on_automated_move_received(epoch, result)
                }
            },
        };

        for effect in effects {
            dispatch(effect, &service, &internal_tx);
        }
        presenter.render(&session.view());
    }

    debug!("session loop finished");
    Ok(session)
}

fn handle_ui<R: RulesEngine, P: Presenter>(
    session: &mut Session<R>,
    event: UiEvent,
    presenter: &mut P,
) -> Vec<Effect> {
    debug!(?event, "ui event");
    match event {
        UiEvent::Drop { from, to } => {
            if !session.can_drag(from) {
                presenter.snapback(from, to);
                return Vec::new();
            }
            let (outcome, effects) = session.apply_human_move(from, to);
            if outcome == HumanMove::Snapback {
                presenter.snapback(from, to);
            }
            effects
        }
        UiEvent::Reset => session.reset(),
        UiEvent::StartTraining => session.start_training(),
        UiEvent::StopTraining => {
            session.stop_training();
            Vec::new()
        }
        UiEvent::SetDifficulty(difficulty) => {
            session.set_difficulty(difficulty);
            Vec::new()
        }
        UiEvent::Quit => Vec::new(),
    }
}

fn dispatch(
    effect: Effect,
    service: &Arc<dyn MoveService>,
    internal_tx: &mpsc::UnboundedSender<Internal>,
) {
    let tx = internal_tx.clone();
    match effect {
        Effect::Schedule {
            delay,
            action,
            epoch,
        } => {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(Internal::Timer { action, epoch });
            });
        }
        Effect::FetchMove { request, epoch } => {
            let service = Arc::clone(service);
            tokio::spawn(async move {
                let result = service.request_move(&request).await;
                let _ = tx.send(Internal::MoveReceived { epoch, result });
            });
        }
    }
}
