use crate::{
    command::{Command, parse_command},
    feeders::{TICK_RATE, spawn_tui_feeders},
    input::InputLine,
    styles,
    transcript::Transcript,
    view::{self, ViewSnap},
};
use anyhow::Result;
use crossterm::{
    event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, Stdout},
    time::Instant,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use verity_core::{AnalysisError, AnalysisEvent, Analyzer, messages};

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    Analysis(AnalysisEvent),
    AnalysisDone(std::result::Result<(), AnalysisError>),
    OpError(String),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// UI state, kept apart from the terminal so it can be driven in tests.
pub struct TuiApp {
    analyzer: Analyzer,
    tx: mpsc::Sender<TuiMsg>,

    input: InputLine,
    transcript: Transcript,
    scroll: usize, // from bottom
    dirty: bool,

    // one analysis at a time
    running: Option<CancellationToken>,
    spin_idx: usize,
    backend: String,
}

impl TuiApp {
    pub fn new(analyzer: Analyzer, tx: mpsc::Sender<TuiMsg>) -> Self {
        let backend = format!(
            "{} → {}/{}",
            analyzer.search_provider(),
            analyzer.llm_provider(),
            analyzer.model()
        );
        let mut transcript = Transcript::default();
        transcript.push_styled(
            "Type a news claim and press Enter to analyze. `/help` lists commands.",
            styles::system(),
        );
        transcript.push_blank();

        Self {
            analyzer,
            tx,
            input: InputLine::default(),
            transcript,
            scroll: 0,
            dirty: true,
            running: None,
            spin_idx: 0,
            backend,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn handle(&mut self, msg: TuiMsg) -> Flow {
        match msg {
            TuiMsg::InputEvent(CtEvent::Key(k)) if k.kind != KeyEventKind::Release => {
                return self.handle_key(k);
            }
            TuiMsg::InputEvent(CtEvent::Resize(..)) => self.dirty = true,
            TuiMsg::InputEvent(_) => {}
            TuiMsg::Analysis(ev) => {
                let provider = self.analyzer.search_provider().to_string();
                self.transcript.event(&ev, &provider);
                self.scroll = 0;
                self.dirty = true;
            }
            TuiMsg::AnalysisDone(result) => {
                if let Err(e) = result {
                    self.transcript.failure(&e);
                }
                self.running = None;
                self.dirty = true;
            }
            TuiMsg::OpError(e) => {
                tracing::warn!(error = %e, "tui.op_error");
                self.transcript
                    .push_styled(format!("× Error: {e}"), styles::error());
                self.transcript.push_blank();
                self.dirty = true;
            }
            TuiMsg::Tick => self.step_spinner(),
            TuiMsg::Shutdown => return Flow::Quit,
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Flow::Quit,
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Enter, _) => {
                let line = self.input.take();
                self.dirty = true;
                return self.submit(&line);
            }
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Esc, _) => self.input.clear(),
            (KeyCode::Char(ch), m) if !m.contains(KeyModifiers::CONTROL) => self.input.insert(ch),
            _ => return Flow::Continue,
        }
        self.dirty = true;
        Flow::Continue
    }

    /// Route one submitted line: a `/command` or a claim to analyze.
    ///
    /// Claims are passed on exactly as typed.
    pub fn submit(&mut self, line: &str) -> Flow {
        if let Some(cmd) = parse_command(line) {
            return self.handle_command(cmd);
        }
        if line.trim().is_empty() {
            self.transcript
                .push_styled(messages::EMPTY_CLAIM_WARNING, styles::warning());
            self.transcript.push_blank();
            self.dirty = true;
            return Flow::Continue;
        }
        if self.is_busy() {
            self.transcript.push_styled(
                "× An analysis is already running. Wait for it or use `/cancel`.",
                styles::error(),
            );
            self.transcript.push_blank();
            self.dirty = true;
            return Flow::Continue;
        }
        self.start_analysis(line.to_string());
        Flow::Continue
    }

    fn start_analysis(&mut self, claim: String) {
        let cancel = CancellationToken::new();
        self.running = Some(cancel.clone());
        self.dirty = true;

        let analyzer = self.analyzer.clone();
        let (ev_tx, mut ev_rx) = mpsc::channel::<AnalysisEvent>(8);
        let job = tokio::spawn(async move { analyzer.analyze(&claim, &ev_tx, &cancel).await });

        // Forward events, then the result, so the UI sees them in order.
        let ui = self.tx.clone();
        tokio::spawn(async move {
            while let Some(ev) = ev_rx.recv().await {
                if ui.send(TuiMsg::Analysis(ev)).await.is_err() {
                    return;
                }
            }
            let msg = match job.await {
                Ok(res) => TuiMsg::AnalysisDone(res.map(|_| ())),
                Err(e) => TuiMsg::OpError(format!("analysis task: {e}")),
            };
            let _ = ui.send(msg).await;
        });
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Quit => return Flow::Quit,
            Command::Help => {
                self.transcript.push_styled("Commands:", styles::label());
                for help in [
                    "  <text>    analyze a news claim (\"/r/news says ...\" counts as text)",
                    "  /cancel   stop the running analysis",
                    "  /clear    clear the transcript",
                    "  /quit     exit (also Ctrl+C / Ctrl+Q)",
                    "  ↑/↓ PgUp/PgDn scroll, Esc clears the input",
                ] {
                    self.transcript.push_styled(help, styles::value());
                }
                self.transcript.push_blank();
            }
            Command::Clear => {
                self.transcript.clear();
                self.scroll = 0;
            }
            Command::Cancel => match &self.running {
                Some(token) => token.cancel(),
                None => {
                    self.transcript
                        .push_styled("Nothing to cancel.", styles::dim());
                    self.transcript.push_blank();
                }
            },
            Command::Unknown(s) => {
                self.transcript
                    .push_styled(format!("× Unknown command: {s}"), styles::error());
                self.transcript.push_styled("Try `/help`.", styles::dim());
                self.transcript.push_blank();
            }
        }
        self.dirty = true;
        Flow::Continue
    }

    fn spinner(&self) -> &'static str {
        if self.is_busy() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn step_spinner(&mut self) {
        if self.is_busy() {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    fn draw(&mut self, term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let snap = ViewSnap {
            input: self.input.text(),
            input_cursor: self.input.cursor(),
            lines: self.transcript.lines(),
            scroll: self.scroll,
            busy: self.is_busy(),
            spinner: self.spinner(),
            backend: &self.backend,
        };
        view::draw(term, &snap)?;
        self.dirty = false;
        Ok(())
    }

    fn cancel_running(&mut self) {
        if let Some(token) = self.running.take() {
            token.cancel();
        }
    }
}

/// Run the interactive UI until the user quits.
pub async fn run(analyzer: Analyzer) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<TuiMsg>(256);
    let shutdown = CancellationToken::new();

    let mut term = setup_terminal()?;
    spawn_tui_feeders(tx.clone(), shutdown.clone());
    let mut app = TuiApp::new(analyzer, tx);
    tracing::info!(backend = %app.backend, "tui.start");

    let result = async {
        let mut last_draw = Instant::now();
        app.draw(&mut term)?;
        while let Some(msg) = rx.recv().await {
            let tick = matches!(msg, TuiMsg::Tick);
            if app.handle(msg) == Flow::Quit {
                break;
            }
            if app.dirty && (tick || last_draw.elapsed() >= TICK_RATE) {
                app.draw(&mut term)?;
                last_draw = Instant::now();
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    shutdown.cancel();
    app.cancel_running();
    restore_terminal(&mut term);
    tracing::info!("tui.stop");
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;
    term.clear()?;
    Ok(term)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) {
    disable_raw_mode().ok();
    let _ = execute!(term.backend_mut(), LeaveAlternateScreen);
    let _ = term.show_cursor();
}
