use chess_trainer::config::SessionConfig;
use chess_trainer::core::Difficulty;
use chess_trainer::display::{InputLine, TerminalPresenter};
use chess_trainer::game::driver::{self, UiEvent};
use chess_trainer::network::{MoveService, MoveServiceClient, RandomMoveService};
use chess_trainer::Session;
use crossterm::{execute, terminal};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_PATH: &str = "chess-trainer.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = SessionConfig::load_or_default();
    let offline = std::env::args().any(|a| a == "--offline") || config.service_url == "offline";
    let service = connect(&config, offline).await?;

    // ターミナル初期化
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;

    let res = run(config, service).await;

    // ターミナル復帰
    execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    res
}

fn init_logging() -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_PATH)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chess_trainer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn connect(config: &SessionConfig, offline: bool) -> anyhow::Result<Arc<dyn MoveService>> {
    if offline {
        info!("offline mode: random moves");
        return Ok(Arc::new(RandomMoveService::new()));
    }

    let client = MoveServiceClient::new(&config.service_url, config.request_timeout())?;
    match client.ping().await {
        Ok(()) => info!(url = %client.base_url(), "move service reachable"),
        Err(e) => warn!(url = %client.base_url(), error = %e, "move service not answering ping"),
    }
    Ok(Arc::new(client))
}

async fn run(config: SessionConfig, service: Arc<dyn MoveService>) -> anyhow::Result<()> {
    let session = Session::new(config.difficulty(), config.timings());
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();

    let difficulty = config.difficulty();
    let input = InputLine::default();
    let typed = input.clone();
    std::thread::spawn(move || {
        if let Err(e) = read_input(ui_tx, difficulty, typed) {
            warn!(error = %e, "input loop failed");
        }
    });

    let session = driver::run(session, service, ui_rx, TerminalPresenter::with_input(input)).await?;
    info!(stats = %session.stats(), "session closed");
    Ok(())
}

/// Keyboard side of the presentation adapter. Owns the difficulty control
/// and the training toggle, the way the page owns its slider and button.
/// Typed text goes into `input` so the next frame redraws it.
fn read_input(
    tx: mpsc::UnboundedSender<UiEvent>,
    mut difficulty: Difficulty,
    input: InputLine,
) -> anyhow::Result<()> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind};
    use std::time::Duration;

    let mut training = false;

    loop {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let event = match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Char('t') => {
                training = !training;
                Some(if training {
                    UiEvent::StartTraining
                } else {
                    UiEvent::StopTraining
                })
            }
            KeyCode::Char('r') => Some(UiEvent::Reset),
            KeyCode::Char('+') | KeyCode::Char('-') if !training => {
                let step: i64 = if key.code == KeyCode::Char('+') { 100 } else { -100 };
                let elo = (difficulty.elo() as i64 + step).max(0) as u32;
                difficulty = Difficulty::new(elo);
                Some(UiEvent::SetDifficulty(difficulty))
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => {
                edit_line(&input, |line| line.push(c));
                // 次の描画までの即時エコー
                print!("{}", c);
                io::Write::flush(&mut io::stdout())?;
                None
            }
            KeyCode::Backspace => {
                if edit_line(&input, |line| line.pop().is_some()) {
                    print!("\u{8} \u{8}");
                    io::Write::flush(&mut io::stdout())?;
                }
                None
            }
            KeyCode::Enter => {
                let typed = edit_line(&input, std::mem::take);
                parse_drop(&typed)
            }
            _ => None,
        };

        if let Some(event) = event {
            let quit = event == UiEvent::Quit;
            if tx.send(event).is_err() || quit {
                return Ok(());
            }
        }
    }
}

fn edit_line<T>(input: &InputLine, f: impl FnOnce(&mut String) -> T) -> T {
    let mut line = input.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut *line)
}

/// `e2e4` → drop from e2 to e4.
fn parse_drop(text: &str) -> Option<UiEvent> {
    let text = text.trim();
    if text.len() != 4 || !text.is_ascii() {
        return None;
    }
    let from = text[..2].parse().ok()?;
    let to = text[2..].parse().ok()?;
    Some(UiEvent::Drop { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drop() {
        let from = "e2".parse().unwrap();
        let to = "e4".parse().unwrap();
        assert_eq!(parse_drop(" e2e4 "), Some(UiEvent::Drop { from, to }));
        assert_eq!(parse_drop("e2e"), None);
        assert_eq!(parse_drop("z9e4"), None);
    }

    #[test]
    fn test_enter_takes_typed_line() {
        let input = InputLine::default();
        edit_line(&input, |line| line.push_str("g1f3"));
        let typed = edit_line(&input, std::mem::take);
        assert_eq!(typed, "g1f3");
        assert!(input.lock().unwrap().is_empty());
    }
}
