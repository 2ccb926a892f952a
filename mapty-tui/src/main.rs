// mapty-tui/src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mapty_lib::{logging, AppService};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::{error, info};

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::App;

// Short enough for the form restore timer to fire on time
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    // Logs go to a file; the terminal belongs to the UI
    match logging::init_file_logging("mapty-tui", "info") {
        Ok(path) => info!(path = %path.display(), "Logging to file"),
        Err(e) => eprintln!("Warning: file logging disabled: {e}"),
    }

    let mut app_service = AppService::initialize().context("Failed to initialize mapty")?;
    app_service.start_map();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run it
    let mut app = App::new(app_service);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "TUI exited with an error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.refresh(Instant::now());

        terminal.draw(|f| ui::render_ui(f, app))?;

        if event::poll(EVENT_POLL_INTERVAL)? {
            match event::read()? {
                // Only process key press events
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
