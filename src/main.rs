use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use envwatch::export::{build_export, write_export};
use envwatch::prefs::DEFAULT_PREFS_FILE;
use envwatch::ui::{self, Theme};
use envwatch::{
    events, App, DashboardState, FileSource, HttpSource, PollHandle, PollState, PreferenceStore,
    SensorSource, Settings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
    /// Detect from the terminal background
    Auto,
}

#[derive(Parser, Debug)]
#[command(name = "envwatch")]
#[command(about = "Terminal dashboard for environmental sensors")]
struct Args {
    /// Sensor API base URL [default: https://apisensor-production.up.railway.app]
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Replay a captured API response file instead of polling HTTP
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Settings file (TOML, optional)
    #[arg(short, long, default_value = "envwatch.toml")]
    config: PathBuf,

    /// Samples kept per sensor for sparklines and charts
    #[arg(long)]
    max_points: Option<usize>,

    /// Color theme (defaults to the stored preference)
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Preferences file for the theme choice
    #[arg(long, default_value = DEFAULT_PREFS_FILE)]
    prefs: PathBuf,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch once, print the classified snapshot as JSON and exit
    #[arg(short, long)]
    once: bool,

    /// Fetch once, write the JSON export to a file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let mut settings = Settings::load(Some(&args.config))
        .with_context(|| format!("loading settings from {}", args.config.display()))?;
    if let Some(ref url) = args.url {
        settings.api_base_url = url.clone();
    }
    if let Some(max_points) = args.max_points {
        settings.max_points = max_points;
    }

    let source = build_source(&args, &settings)?;
    let rt = tokio::runtime::Runtime::new()?;

    // Non-interactive modes
    if args.once || args.export.is_some() {
        let state = rt.block_on(fetch_once(source.as_ref(), &settings));
        if let Some(ref err) = state.last_error {
            bail!("Fetch from {} failed: {}", source.description(), err);
        }
        if args.once {
            println!("{}", serde_json::to_string_pretty(&build_export(&state))?);
        }
        if let Some(ref path) = args.export {
            write_export(&state, path)?;
            println!("Exported sensor state to: {}", path.display());
        }
        return Ok(());
    }

    let store = PreferenceStore::new(&args.prefs);
    let theme = match args.theme {
        Some(ThemeArg::Dark) => Theme::dark(),
        Some(ThemeArg::Light) => Theme::light(),
        Some(ThemeArg::Auto) => Theme::auto_detect(),
        None => Theme::from_preference(store.load().theme),
    };

    // The poll loop and the clock run on the runtime while the TUI owns the main thread
    let poller = {
        let _guard = rt.enter();
        PollHandle::spawn(source, settings.poll_config())
    };

    let mut app = App::new(poller, theme, Some(store));
    let result = run_tui(&mut app);

    rt.block_on(app.into_poller().shutdown());
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_source(args: &Args, settings: &Settings) -> Result<Arc<dyn SensorSource>> {
    if let Some(ref path) = args.file {
        return Ok(Arc::new(FileSource::new(path)));
    }
    let source = HttpSource::with_timeout(&settings.api_base_url, settings.request_timeout())
        .context("building HTTP client")?;
    Ok(Arc::new(source))
}

/// Run a single poll through the state machine.
async fn fetch_once(source: &dyn SensorSource, settings: &Settings) -> DashboardState {
    let mut state = PollState::new(settings.backoff, settings.max_points);
    let seq = state.begin();
    let outcome = source.fetch().await;
    state.apply(seq, outcome, Local::now());
    state.view().clone()
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange);
        original_hook(panic);
    }));

    info!("Dashboard started for {}", app.source_description());
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.reload_data();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            events::handle_event(app, event);
        }
    }

    Ok(())
}
