//! newsfeed-tui: a terminal reader for summarized AI news.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ FetchOutcome ┌──────────────────┐  view()  ┌──────────┐
//! │ fetch.rs │ ───────────► │ app.rs           │ ───────► │  ui.rs   │
//! │ (tokio)  │  (channel)   │  └ controller.rs │          │ (render) │
//! └──────────┘ ◄─────────── └──────────────────┘          └──────────┘
//!               FetchTicket          ▲
//!                                    │ handle_key_event()
//!                               ┌──────────┐
//!                               │ input.rs │
//!                               └──────────┘
//! ```
//!
//! * **`source/`**: the `NewsApi` trait, the backend's wire types, and the
//!   reqwest implementation.
//! * **`controller`**: feed state (pagination, de-duplication, trend filter,
//!   stale-response discard).
//! * **`fetch`**: runs fetch tickets on tokio tasks.
//! * **`app`**: UI-side state around the controller (cursor, status line).
//! * **`ui`**: pure rendering of the controller's view.
//! * **`input`**: maps key events to `App` actions.
//! * **`cli`**: flags and environment configuration.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod cli;
mod controller;
mod error;
mod fetch;
mod input;
mod source;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use fetch::Fetcher;
use source::HttpApi;

// ---------------------------------------------------------------------------
// RAII terminal guard, restores the terminal even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
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
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!(%info, "panicked");
        original_hook(info);
    }));
}

/// Send `tracing` output to `cli.log_file`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` level.
fn init_tracing(cli: &Cli) -> Result<()> {
    let file = File::create(&cli.log_file)
        .with_context(|| format!("creating log file {}", cli.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // -- parse arguments -----------------------------------------------------
    let cli = Cli::parse();
    init_tracing(&cli)?;
    install_panic_hook();
    info!(timeframe = %cli.timeframe, "newsfeed-tui starting");

    // -- backend + background fetching ---------------------------------------
    let api = HttpApi::new(&cli.api_base, cli.timeout()).context("building HTTP client")?;
    info!(base = api.base(), "using news backend");
    let (fetcher, mut rx) = Fetcher::new(api);

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(cli.timeframe);
    app.select_timeframe(cli.timeframe);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Dispatch tickets issued since the last tick.
    //   2. Apply any fetch outcomes that have arrived.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Start requested fetches
        for ticket in app.take_requests() {
            fetcher.dispatch(ticket);
        }

        // 2. Process fetch outcomes
        while let Ok(outcome) = rx.try_recv() {
            app.handle_outcome(outcome);
        }

        // 3. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 4. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("newsfeed-tui exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
