pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flashdeck::{
    card::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    content::{BundledDeck, ContentProvider, JsonDeckFile},
    filter::{Selection, ALL},
    history::{HistoryStore, SessionSummary},
    runtime::{CrosstermEventSource, FixedTicker, Runner, StudyEvent},
    store::KvStore,
    timer::{Clock, IntervalClock},
    tracker::Outcome,
    SessionPhase, StudyEngine,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::Duration,
};

const POLL_RATE_MS: u64 = 250;

/// terminal flashcards for technical interview study
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Flip through interview flashcards by technology and category, track accuracy and streaks per session, and keep a short history of past sessions."
)]
pub struct Cli {
    /// technology to study ("all" for every deck)
    #[clap(short = 't', long)]
    technology: Option<String>,

    /// category within the selected technology ("all" for every category)
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// load cards from a JSON deck file instead of the bundled deck
    #[clap(long, value_name = "PATH")]
    deck: Option<PathBuf>,

    /// do not read or write the local store (no history, no progress)
    #[clap(long)]
    no_persist: bool,

    /// print technologies with card counts and exit
    #[clap(long)]
    list: bool,

    /// print past session summaries and exit
    #[clap(long)]
    history: bool,

    /// write past session summaries to a CSV file and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// delete past session summaries (after printing or exporting them) and exit
    #[clap(long)]
    clear_history: bool,
}

impl Cli {
    /// CLI flags win over the remembered config
    fn resolve(&self, config: &Config) -> Config {
        let mut resolved = config.clone();
        if let Some(tech) = &self.technology {
            resolved.technology = Selection::from(tech.as_str());
            resolved.category = Selection::All;
        }
        if let Some(cat) = &self.category {
            resolved.category = Selection::from(cat.as_str());
        }
        if let Some(deck) = &self.deck {
            resolved.deck_path = Some(deck.clone());
        }
        resolved
    }

    fn is_report(&self) -> bool {
        self.list || self.history || self.export_history.is_some() || self.clear_history
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub engine: StudyEngine,
    pub show_answer: bool,
    pub dark_mode: bool,
}

impl App {
    pub fn new(engine: StudyEngine, config: &Config) -> Self {
        let dark_mode = engine.history().dark_mode();
        let mut app = Self {
            engine,
            show_answer: false,
            dark_mode,
        };
        app.engine.set_technology(config.technology.clone());
        app.engine.set_category(config.category.clone());
        app
    }

    pub fn config(&self, deck_path: Option<PathBuf>) -> Config {
        let selection = self.engine.selection();
        Config {
            technology: selection.technology.clone(),
            category: selection.category.clone(),
            deck_path,
        }
    }

    fn technology_options(&self) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(
                self.engine
                    .technologies()
                    .into_iter()
                    .map(|(t, _)| Selection::from(t.id)),
            )
            .collect()
    }

    fn category_options(&self) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(self.engine.categories().into_iter().map(Selection::Only))
            .collect()
    }

    fn cycle_technology(&mut self, forward: bool) {
        let options = self.technology_options();
        let next = cycle(&options, &self.engine.selection().technology, forward);
        self.engine.set_technology(next);
    }

    fn cycle_category(&mut self, forward: bool) {
        let options = self.category_options();
        let next = cycle(&options, &self.engine.selection().category, forward);
        self.engine.set_category(next);
    }

    fn answer(&mut self, outcome: Outcome) {
        if let Err(e) = self.engine.answer_current(outcome) {
            log::error!("{e}");
        }
        self.show_answer = false;
        self.engine.advance();
    }

    fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.engine.history().set_dark_mode(self.dark_mode);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.engine.phase() {
            SessionPhase::Idle => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.show_answer = false;
                    self.engine.start_session();
                }
                KeyCode::Right | KeyCode::Char('l') => self.cycle_technology(true),
                KeyCode::Left | KeyCode::Char('h') => self.cycle_technology(false),
                KeyCode::Down | KeyCode::Char('j') => self.cycle_category(true),
                KeyCode::Up | KeyCode::Char('k') => self.cycle_category(false),
                KeyCode::Char('d') => self.toggle_dark_mode(),
                _ => {}
            },
            SessionPhase::Active => match key.code {
                KeyCode::Esc => {
                    self.show_answer = false;
                    self.engine.interrupt();
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.show_answer = !self.show_answer,
                KeyCode::Char('y') => self.answer(Outcome::Correct),
                KeyCode::Char('n') => self.answer(Outcome::Incorrect),
                KeyCode::Right | KeyCode::Char('l') => {
                    self.show_answer = false;
                    self.engine.advance();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.show_answer = false;
                    self.engine.retreat();
                }
                _ => {}
            },
            SessionPhase::Reviewing => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Char('r') => {
                    self.show_answer = false;
                    self.engine.restart();
                }
                KeyCode::Enter | KeyCode::Char('b') => self.engine.close_review(),
                KeyCode::Char('d') => self.toggle_dark_mode(),
                _ => {}
            },
        }
        Flow::Continue
    }
}

fn cycle(options: &[Selection], current: &Selection, forward: bool) -> Selection {
    let len = options.len();
    if len == 0 {
        return Selection::All;
    }
    let idx = options.iter().position(|o| o == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    options[next].clone()
}

const HISTORY_CSV_HEADER: [&str; 4] = ["date", "cardsStudied", "accuracy", "timeSpent"];

fn deck(deck_path: Option<&Path>) -> Box<dyn ContentProvider> {
    match deck_path {
        Some(path) => Box::new(JsonDeckFile::new(path)),
        None => Box::new(BundledDeck),
    }
}

fn open_history(no_persist: bool) -> HistoryStore {
    if no_persist {
        HistoryStore::new(KvStore::unavailable())
    } else {
        HistoryStore::new(KvStore::open_default())
    }
}

/// The header row is written even when there is no history
fn write_history_csv<W: Write>(out: W, history: &[SessionSummary]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(HISTORY_CSV_HEADER)?;
    for summary in history {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_report(cli: &Cli, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout().lock();

    if cli.list {
        let cards = deck(config.deck_path.as_deref()).load()?;
        let catalog = Catalog::new(cards);
        writeln!(out, "{:<14} {:>5}", ALL, catalog.len())?;
        for (tech, count) in catalog.technologies_with_counts() {
            writeln!(out, "{:<14} {:>5}  {}", tech.id, count, tech.name)?;
        }
    }

    if !cli.history && cli.export_history.is_none() && !cli.clear_history {
        return Ok(());
    }

    let history = open_history(cli.no_persist);
    if cli.history {
        let sessions = history.session_history();
        if sessions.is_empty() {
            writeln!(out, "no sessions recorded")?;
        }
        for s in sessions.iter().rev() {
            writeln!(
                out,
                "{}  {:>3} cards  {:>3}% acc  {}",
                s.date,
                s.cards_studied,
                s.accuracy,
                flashdeck::util::format_time(s.time_spent)
            )?;
        }
    }

    if let Some(path) = &cli.export_history {
        let file = std::fs::File::create(path)?;
        write_history_csv(file, &history.session_history())?;
    }

    if cli.clear_history {
        history.clear_history();
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();
    let config_store = FileConfigStore::new();
    let config = cli.resolve(&config_store.load());

    if cli.is_report() {
        return run_report(&cli, &config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let provider = deck(config.deck_path.as_deref());
    let event_source = CrosstermEventSource::new();
    let clock: Box<dyn Clock> = Box::new(IntervalClock::new(event_source.sender()));
    let history = open_history(cli.no_persist);
    let engine = StudyEngine::from_provider(provider.as_ref(), clock, history)?;
    let mut app = App::new(engine, &config);
    let runner = Runner::new(
        event_source,
        FixedTicker::new(Duration::from_millis(POLL_RATE_MS)),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if !cli.no_persist {
        if let Err(e) = config_store.save(&app.config(config.deck_path.clone())) {
            log::warn!("could not save config: {e}");
        }
    }

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            Some(StudyEvent::Tick { generation }) => {
                if app.engine.on_tick(generation) {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            Some(StudyEvent::Resize) => {
                terminal.draw(|f| ui(app, f))?;
            }
            Some(StudyEvent::Key(key)) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
            None => {}
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashdeck::store::MemoryBackend;
    use flashdeck::timer::ManualClock;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> (App, MemoryBackend) {
        let backend = MemoryBackend::new();
        let engine = StudyEngine::new(
            BundledDeck.load().unwrap(),
            Box::new(ManualClock::new()),
            HistoryStore::new(KvStore::new(Box::new(backend.clone()))),
        );
        (App::new(engine, &Config::default()), backend)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["flashdeck"]);
        assert!(cli.technology.is_none());
        assert!(cli.category.is_none());
        assert!(!cli.no_persist);
        assert!(!cli.is_report());
    }

    #[test]
    fn test_cli_resolve_overrides_config() {
        let cli = Cli::parse_from(["flashdeck", "-t", "react", "--deck", "cards.json"]);
        let remembered = Config {
            technology: "angular".into(),
            category: "Signals".into(),
            deck_path: None,
        };
        let resolved = cli.resolve(&remembered);
        assert_eq!(resolved.technology, Selection::from("react"));
        // a new technology drops the remembered category
        assert!(resolved.category.is_all());
        assert_eq!(resolved.deck_path, Some(PathBuf::from("cards.json")));
    }

    #[test]
    fn test_cli_resolve_keeps_config_when_no_flags() {
        let cli = Cli::parse_from(["flashdeck"]);
        let remembered = Config {
            technology: "css".into(),
            category: "Grid".into(),
            deck_path: None,
        };
        assert_eq!(cli.resolve(&remembered), remembered);
    }

    #[test]
    fn test_cli_report_flags() {
        assert!(Cli::parse_from(["flashdeck", "--list"]).is_report());
        assert!(Cli::parse_from(["flashdeck", "--history"]).is_report());
        assert!(Cli::parse_from(["flashdeck", "--export-history", "h.csv"]).is_report());
        assert!(Cli::parse_from(["flashdeck", "--clear-history"]).is_report());
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        let (a, b) = (Selection::from("a"), Selection::from("b"));
        let options = vec![Selection::All, a.clone(), b.clone()];
        assert_eq!(cycle(&options, &Selection::All, true), a);
        assert_eq!(cycle(&options, &b, true), Selection::All);
        assert_eq!(cycle(&options, &Selection::All, false), b);
        // unknown current value starts from the front
        assert_eq!(cycle(&options, &"zzz".into(), true), a);
        assert_eq!(cycle(&[], &Selection::All, true), Selection::All);
    }

    #[test]
    fn test_idle_keys_cycle_filters() {
        let (mut app, _) = test_app();
        app.on_key(key(KeyCode::Right));
        assert_eq!(
            app.engine.selection().technology,
            Selection::from("angular")
        );
        app.on_key(key(KeyCode::Down));
        assert_eq!(
            app.engine.selection().category,
            Selection::from("Lifecycle Hooks")
        );
        app.on_key(key(KeyCode::Left));
        assert!(app.engine.selection().technology.is_all());
        assert!(app.engine.selection().category.is_all());
    }

    #[test]
    fn test_study_flow_through_keys() {
        let (mut app, backend) = test_app();
        app.on_key(key(KeyCode::Right)); // angular
        assert_eq!(app.on_key(key(KeyCode::Enter)), Flow::Continue);
        assert_eq!(app.engine.phase(), SessionPhase::Active);

        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.show_answer);
        app.on_key(key(KeyCode::Char('y')));
        assert!(!app.show_answer);
        assert_eq!(app.engine.current_index(), 1);

        let total = app.engine.total_cards();
        for _ in 1..total {
            app.on_key(key(KeyCode::Char('n')));
        }
        assert_eq!(app.engine.phase(), SessionPhase::Reviewing);
        let summary = app.engine.last_summary().unwrap();
        assert_eq!(summary.cards_studied, total);
        assert!(backend.raw("sessionHistory").is_some());

        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.engine.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_escape_interrupts_then_quits() {
        let (mut app, _) = test_app();
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.on_key(key(KeyCode::Esc)), Flow::Continue);
        assert_eq!(app.engine.phase(), SessionPhase::Reviewing);
        assert_eq!(app.engine.session_history().len(), 1);
        assert_eq!(app.on_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(app.engine.session_history().len(), 1);
    }

    #[test]
    fn test_ctrl_c_quits_in_any_phase() {
        let (mut app, _) = test_app();
        app.on_key(key(KeyCode::Enter));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c), Flow::Quit);
    }

    #[test]
    fn test_dark_mode_toggle_persists() {
        let (mut app, backend) = test_app();
        assert!(app.dark_mode);
        app.on_key(key(KeyCode::Char('d')));
        assert!(!app.dark_mode);
        assert_eq!(backend.raw("darkMode").as_deref(), Some("false"));
    }

    #[test]
    fn test_app_config_reflects_selection() {
        let (mut app, _) = test_app();
        app.engine.set_technology("react");
        app.engine.set_category("Hooks");
        let cfg = app.config(None);
        assert_eq!(cfg.technology, Selection::from("react"));
        assert_eq!(cfg.category, Selection::from("Hooks"));
    }

    #[test]
    fn test_write_history_csv() {
        let history = vec![SessionSummary {
            date: "2026-01-01T10:00:00Z".into(),
            cards_studied: 4,
            accuracy: 75,
            time_spent: 63,
        }];
        let mut buf = Vec::new();
        write_history_csv(&mut buf, &history).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,cardsStudied,accuracy,timeSpent\n2026-01-01T10:00:00Z,4,75,63\n"
        );
    }

    #[test]
    fn test_write_history_csv_empty_has_header() {
        let mut buf = Vec::new();
        write_history_csv(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,cardsStudied,accuracy,timeSpent\n"
        );
    }

    #[test]
    fn test_deck_falls_back_to_bundled() {
        let bundled = deck(None).load().unwrap();
        assert_eq!(bundled.len(), BundledDeck.load().unwrap().len());
        assert!(deck(Some(Path::new("/nonexistent/deck.json"))).load().is_err());
    }

    #[test]
    fn test_ui_renders_every_phase() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| ui(&mut app, f)).unwrap();
        app.engine.start_session();
        terminal.draw(|f| ui(&mut app, f)).unwrap();
        app.engine.interrupt();
        terminal.draw(|f| ui(&mut app, f)).unwrap();
    }
}
