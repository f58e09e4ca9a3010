use crate::game::driver::Presenter;
use crate::game::SessionView;
use crate::logic::load_position;
use crossterm::{cursor, execute, style::Stylize, terminal};
use shakmaty::{Color, File, Position, Rank, Square};
use std::io::{stdout, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub const HELP: &str =
    "[e2e4 Enter]: Move | [t]: Start/stop training | [r]: Reset | [+/-]: ELO | [q]: Quit";

/// Text typed so far on the prompt line. The keyboard thread writes it,
/// every frame redraws it.
pub type InputLine = Arc<Mutex<String>>;

/// Terminal presentation adapter.
#[derive(Default)]
pub struct TerminalPresenter {
    /// Last refused drop, shown once on the next frame.
    snapback: Option<(Square, Square)>,
    input: InputLine,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: InputLine) -> Self {
        Self {
            snapback: None,
            input,
        }
    }

    fn prompt(&self) -> String {
        // ロック失敗時は空のプロンプト
        let typed = self.input.lock().map(|s| s.clone()).unwrap_or_default();
        format!("> {}", typed)
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, view: &SessionView) {
        let snapback = self.snapback.take();
        let prompt = self.prompt();
        if let Err(e) = render_view(view, snapback, &prompt) {
            warn!(error = %e, "render failed");
        }
    }

    fn snapback(&mut self, from: Square, to: Square) {
        self.snapback = Some((from, to));
    }
}

pub fn render_view(
    view: &SessionView,
    snapback: Option<(Square, Square)>,
    prompt: &str,
) -> std::io::Result<()> {
    let mut out = stdout();

    // 画面クリア（スクロール防止）
    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    print!("=== Chess Trainer ===\r\n");
    print!("{}\r\n", view.status.clone().bold().yellow());
    print!("\r\n");

    match load_position(&view.fen) {
        Ok(position) => render_board(&position, snapback),
        Err(_) => print!("{}\r\n", view.fen),
    }

    print!("\r\n");
    let mode = if view.training {
        "Training (running)".green()
    } else {
        "Manual".cyan()
    };
    let elo = if view.input_enabled {
        format!("ELO: {}", view.difficulty).stylize()
    } else {
        format!("ELO: {} (locked)", view.difficulty).dark_grey()
    };
    print!("Mode: {} | {}\r\n", mode, elo);
    print!("{}\r\n", view.stats_text());
    if let Some((from, to)) = snapback {
        print!("{}\r\n", format!("Move {}{} refused", from, to).red());
    }
    print!("\r\n{}\r\n{}", HELP, prompt);
    out.flush()
}

fn render_board(position: &shakmaty::Chess, snapback: Option<(Square, Square)>) {
    let board = position.board();

    print!("    a  b  c  d  e  f  g  h\r\n");
    print!("   +{}+\r\n", "-".repeat(24));
    for rank in Rank::ALL.iter().rev() {
        print!("{} |", rank.char());
        for file in File::ALL {
            let square = Square::from_coords(file, *rank);
            let cell = match board.piece_at(square) {
                Some(piece) => format!(" {} ", piece.char()),
                None => " . ".to_string(),
            };

            let refused = snapback.is_some_and(|(from, to)| from == square || to == square);
            if refused {
                print!("{}", cell.red());
            } else {
                match board.piece_at(square).map(|p| p.color) {
                    Some(Color::White) => print!("{}", cell.cyan()),
                    Some(Color::Black) => print!("{}", cell.magenta()),
                    None => print!("{}", cell),
                }
            }
        }
        print!("|\r\n");
    }
    print!("   +{}+\r\n", "-".repeat(24));
}
