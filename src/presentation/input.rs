use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    /// Applies one key press to the application state.
    ///
    /// Storage and export failures are logged and otherwise ignored so the
    /// form stays usable.
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ConfirmClear => Self::handle_confirm_clear_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('e') => {
                    Self::export(app);
                    return;
                }
                KeyCode::Char('x') => {
                    app.start_clear_all();
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(),
            KeyCode::Left | KeyCode::Char('h') => app.move_left(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.move_right(),
            KeyCode::Enter | KeyCode::F(2) => app.start_editing(),
            KeyCode::Char('e') => Self::export(app),
            KeyCode::Backspace | KeyCode::Delete => {
                if let Err(e) = app.clear_selected_cell() {
                    log::error!("Failed to clear cell: {e}");
                }
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        let result = match key {
            KeyCode::Enter => {
                app.finish_editing();
                Ok(())
            }
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_before_cursor(),
            KeyCode::Delete => app.delete_at_cursor(),
            KeyCode::Left => {
                app.move_cursor_left();
                Ok(())
            }
            KeyCode::Right => {
                app.move_cursor_right();
                Ok(())
            }
            KeyCode::Home => {
                app.move_cursor_home();
                Ok(())
            }
            KeyCode::End => {
                app.move_cursor_end();
                Ok(())
            }
            // Control chords are shortcuts, never cell text.
            KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => Ok(()),
            KeyCode::Char(c) => app.insert_char(c),
            _ => Ok(()),
        };

        if let Err(e) = result {
            log::error!("Failed to save grid: {e}");
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_confirm_clear_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(e) = app.confirm_clear_all() {
                    log::error!("Failed to clear stored grid: {e}");
                }
            }
            _ => app.cancel_clear_all(),
        }
    }

    fn export(app: &mut App) {
        if let Err(e) = app.export() {
            log::error!("Error saving file: {e}");
        }
    }
}
