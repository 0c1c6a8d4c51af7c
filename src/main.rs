//! gridform - Terminal Form Grid
//!
//! A terminal form of 10 x 5 free-text cells. Every edit is persisted to a
//! local key-value store, and the grid can be exported to an xlsx file that
//! is handed to the system's default handler.

use std::io;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use gridform::application::{App, AppMode};
use gridform::infrastructure::{
    init_file_logger, AppConfig, Exporter, FileStore, GridStore, KeyValueStore, MemoryStore,
    SystemShare,
};
use gridform::presentation::{render_ui, visible_grid_rows, InputHandler};

/// Entry point for the gridform terminal application.
///
/// Resolves directories, sets up logging and storage, then runs the event
/// loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues
/// with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    if let Err(e) = init_file_logger(&config.log_file()) {
        eprintln!("Logging disabled: {e}");
    }
    log::debug!("Data dir: {}", config.data_dir.display());
    log::debug!("Cache dir: {}", config.cache_dir.display());

    let kv: Box<dyn KeyValueStore> = match FileStore::in_dir(&config.data_dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::error!("Data directory unusable, edits will not survive restart: {e}");
            Box::new(MemoryStore::new())
        }
    };
    let store = GridStore::with_default_size(kv);
    let exporter = Exporter::new(&config.cache_dir, Box::new(SystemShare));
    let mut app = App::new(store, exporter);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Terminal error: {err}");
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Renders the form and dispatches key presses until the user presses
/// 'q' in normal mode.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let size = terminal.size()?;
        app.update_viewport_size(visible_grid_rows(size.height));
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if app.mode == AppMode::Normal => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
