use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use movies_home::aggregator::Subscription;
use movies_home::app::App;
use movies_home::config::Cli;
use movies_home::home::HomeViewModel;
use movies_home::home_state::HomeUiState;
use movies_home::source::{MovieRepository, TmdbRepository};
use movies_home::{input, logging, refresh, ui};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode, alternate-screen and focus reporting via
/// [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Redraw period, so the status bar stays current between snapshots.
const TICK_RATE: Duration = Duration::from_millis(250);

enum Step {
    Snapshot(Arc<HomeUiState>),
    Terminal(Option<io::Result<Event>>),
    Tick,
}

/// Next snapshot for the screen, or never while the screen is not observing.
async fn next_snapshot(subscription: &mut Option<Subscription>) -> Option<Arc<HomeUiState>> {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = logging::init()? {
        info!(%path, "logging to file");
    }
    install_panic_hook();

    // -- wire data sources and state -----------------------------------------
    let repository: Arc<dyn MovieRepository> =
        Arc::new(TmdbRepository::new(&cli.base_url, &cli.api_key, &cli.genres));
    let view_model = HomeViewModel::new(repository, &cli.genres, cli.grace());
    info!(sections = view_model.sections().len(), "home screen starting");

    // -- start background refreshing ------------------------------------------
    let (refresher, refresh_task) = refresh::spawn(
        view_model.repository(),
        view_model.sections().to_vec(),
        view_model.signals(),
        cli.refresh_interval(),
    );

    // -- terminal setup (RAII — Drop restores on exit or panic) ---------------
    let mut guard = TerminalGuard::new()?;
    let ui_state = view_model.ui_state();
    let mut app = App::new(ui_state.latest());
    let mut subscription = Some(ui_state);

    // -- main event loop -------------------------------------------------------
    // Each iteration renders, then waits for whichever comes first: a new
    // snapshot, a terminal event or the redraw tick.  Losing terminal focus
    // drops the subscription; regaining it subscribes again.
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);

    loop {
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        let step = tokio::select! {
            Some(state) = next_snapshot(&mut subscription) => Step::Snapshot(state),
            event = events.next() => Step::Terminal(event),
            _ = tick.tick() => Step::Tick,
        };

        match step {
            Step::Snapshot(state) => app.apply_snapshot(state),
            Step::Terminal(Some(Ok(Event::Key(key)))) => input::handle_key_event(&mut app, key),
            Step::Terminal(Some(Ok(Event::FocusLost))) => {
                subscription = None;
                app.observing = false;
            }
            Step::Terminal(Some(Ok(Event::FocusGained))) => {
                if subscription.is_none() {
                    let ui_state = view_model.ui_state();
                    app.apply_snapshot(ui_state.latest());
                    subscription = Some(ui_state);
                }
                app.observing = true;
            }
            Step::Terminal(Some(Ok(_))) | Step::Tick => {}
            Step::Terminal(Some(Err(e))) => return Err(e.into()),
            Step::Terminal(None) => break,
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            refresher.request();
        }
        if app.quit {
            break;
        }
    }

    drop(subscription);
    refresh_task.abort();
    info!(
        upstream_starts = view_model.aggregator().upstream_starts(),
        "home screen closed"
    );

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
