use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tasklane_client::{FileTokenStore, HttpClient, Session};
use tasklane_core::Route;
use tasklane_tui::app::App;
use tasklane_tui::config::Config;
use tasklane_tui::dispatch::Dispatcher;
use tracing::info;

const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let config = Config::parse();
    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    init_logging(&config.log_file())?;

    info!("tasklane starting");
    info!("server: {}", config.server_url);

    let session = Session::open(FileTokenStore::new(&data_dir)).context("failed to open session")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let api = Arc::new(HttpClient::new(&config.server_url, session.clone()));
    let dispatcher = Dispatcher::new(api, runtime.handle().clone());
    let app = App::with_route(session, Route::from_path(&config.route));

    run_tui(app, dispatcher)
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("tasklane_tui=info,tasklane_client=info")
            }),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(app: App, dispatcher: Dispatcher) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, dispatcher);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut dispatcher: Dispatcher,
) -> Result<()> {
    loop {
        for command in app.take_commands() {
            dispatcher.submit(command);
        }
        while let Some(outcome) = dispatcher.try_next() {
            app.apply(outcome);
        }
        app.sync();

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C always quits
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                // q quits unless we're in an input mode
                if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                    break;
                }
                app.handle_key(key);
            }
        }
    }

    info!("tasklane exiting");
    Ok(())
}
