//! Application state for the form grid.
//!
//! [`App`] owns the in-memory grid together with the store that persists it
//! and the exporter that ships it. Every edit goes through [`App::set_cell`],
//! which writes the whole grid back to storage before returning.

use crate::domain::{Grid, GridError};
use crate::infrastructure::{
    ExportError, ExportReceipt, Exporter, GridStore, PersistenceError,
};
use thiserror::Error;

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Arrow keys move the selection, shortcuts are available
    Normal,
    /// The selected cell is being typed into
    Editing,
    /// Key help popup is shown
    Help,
    /// Waiting for confirmation before clearing every cell
    ConfirmClear,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Main application state.
///
/// Holds the grid, its persistence and export collaborators, and the
/// cursor and input state needed to render the terminal UI.
pub struct App {
    /// The form grid as currently shown
    pub grid: Grid,
    store: GridStore,
    exporter: Exporter,
    /// Currently selected row (zero-based)
    pub selected_row: usize,
    /// Currently selected column (zero-based)
    pub selected_col: usize,
    /// Top-most row visible in the viewport
    pub scroll_row: usize,
    /// Viewport height in rows
    pub viewport_rows: usize,
    /// Current application mode
    pub mode: AppMode,
    /// Text of the cell being edited
    pub input: String,
    /// Cursor position within `input`, in characters
    pub cursor_position: usize,
    /// Cell value when editing began, restored on cancel
    original_value: String,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
}

impl App {
    /// Builds the application, loading the persisted grid or a blank one.
    pub fn new(store: GridStore, exporter: Exporter) -> Self {
        let grid = store.load_or_blank();
        Self {
            grid,
            store,
            exporter,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            viewport_rows: 10,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            original_value: String::new(),
            help_scroll: 0,
            status_message: None,
        }
    }

    /// Sets one cell and persists the whole grid.
    ///
    /// The in-memory grid keeps the new value even when the save fails.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), EditError> {
        self.grid.set(row, col, value)?;
        self.store.save(&self.grid)?;
        Ok(())
    }

    /// Switches to editing mode for the selected cell.
    pub fn start_editing(&mut self) {
        let value = self
            .grid
            .get(self.selected_row, self.selected_col)
            .unwrap_or_default()
            .to_string();
        self.mode = AppMode::Editing;
        self.cursor_position = value.chars().count();
        self.original_value = value.clone();
        self.input = value;
        self.status_message = None;
    }

    pub fn insert_char(&mut self, c: char) -> Result<(), EditError> {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor_position += 1;
        self.commit_input()
    }

    /// Deletes the character before the cursor.
    pub fn delete_before_cursor(&mut self) -> Result<(), EditError> {
        if self.cursor_position == 0 {
            return Ok(());
        }
        self.cursor_position -= 1;
        let idx = self.byte_index();
        self.input.remove(idx);
        self.commit_input()
    }

    /// Deletes the character under the cursor.
    pub fn delete_at_cursor(&mut self) -> Result<(), EditError> {
        if self.cursor_position >= self.input.chars().count() {
            return Ok(());
        }
        let idx = self.byte_index();
        self.input.remove(idx);
        self.commit_input()
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    /// Leaves editing mode and moves the selection down one row.
    ///
    /// The value is already persisted by the keystrokes that produced it.
    pub fn finish_editing(&mut self) {
        if self.selected_row + 1 < self.grid.rows() {
            self.selected_row += 1;
            self.ensure_cursor_visible();
        }
        self.reset_input();
    }

    /// Leaves editing mode, restoring the value the cell had before.
    pub fn cancel_editing(&mut self) -> Result<(), EditError> {
        let original = std::mem::take(&mut self.original_value);
        let changed = self.input != original;
        self.reset_input();
        if changed {
            self.set_cell(self.selected_row, self.selected_col, &original)?;
        }
        Ok(())
    }

    /// Empties the selected cell.
    pub fn clear_selected_cell(&mut self) -> Result<(), EditError> {
        let filled = self
            .grid
            .get(self.selected_row, self.selected_col)
            .is_some_and(|v| !v.is_empty());
        if filled {
            self.set_cell(self.selected_row, self.selected_col, "")?;
        }
        Ok(())
    }

    pub fn start_clear_all(&mut self) {
        self.mode = AppMode::ConfirmClear;
        self.status_message = None;
    }

    /// Empties every cell and drops the persisted snapshot.
    pub fn confirm_clear_all(&mut self) -> Result<(), PersistenceError> {
        self.mode = AppMode::Normal;
        self.grid.clear();
        self.store.clear()?;
        self.status_message = Some("Cleared all cells".to_string());
        Ok(())
    }

    pub fn cancel_clear_all(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Exports the in-memory grid and shares the resulting file.
    pub fn export(&mut self) -> Result<ExportReceipt, ExportError> {
        let receipt = self.exporter.export(&self.grid)?;
        self.status_message = Some(format!("Exported to {}", receipt.path.display()));
        Ok(receipt)
    }

    pub fn move_up(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_row + 1 < self.grid.rows() {
            self.selected_row += 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        self.selected_col = self.selected_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.selected_col + 1 < self.grid.cols() {
            self.selected_col += 1;
        }
    }

    /// Updates the viewport height for scrolling calculations.
    pub fn update_viewport_size(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.ensure_cursor_visible();
    }

    /// Scrolls so that the selected row is inside the viewport.
    pub fn ensure_cursor_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }
    }

    fn commit_input(&mut self) -> Result<(), EditError> {
        let value = self.input.clone();
        self.set_cell(self.selected_row, self.selected_col, &value)
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn reset_input(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.original_value.clear();
        self.cursor_position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::share::testing::RecordingShare;
    use crate::infrastructure::{FileStore, KeyValueStore, MemoryStore, GRID_KEY};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        app: App,
        kv: FileStore,
        share: RecordingShare,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let kv = FileStore::in_dir(&dir.path().join("data")).unwrap();
        let share = RecordingShare::default();
        let store = GridStore::with_default_size(Box::new(kv.clone()));
        let exporter = Exporter::new(&dir.path().join("cache"), Box::new(share.clone()));
        Fixture {
            app: App::new(store, exporter),
            _dir: dir,
            kv,
            share,
        }
    }

    fn persisted(kv: &FileStore) -> Grid {
        GridStore::with_default_size(Box::new(kv.clone())).load().unwrap()
    }

    #[test]
    fn test_app_starts_blank() {
        let f = fixture();
        assert_eq!(f.app.grid, Grid::blank());
        assert_eq!(f.app.selected_row, 0);
        assert_eq!(f.app.selected_col, 0);
        assert_eq!(f.app.mode, AppMode::Normal);
        assert!(f.app.status_message.is_none());
    }

    #[test]
    fn test_app_loads_existing_snapshot() {
        let mut kv = MemoryStore::new();
        let mut grid = Grid::blank();
        grid.set(2, 3, "saved").unwrap();
        kv.set_item(GRID_KEY, &serde_json::to_string(&grid).unwrap())
            .unwrap();

        let dir = TempDir::new().unwrap();
        let app = App::new(
            GridStore::with_default_size(Box::new(kv)),
            Exporter::new(dir.path(), Box::new(RecordingShare::default())),
        );
        assert_eq!(app.grid, grid);
    }

    #[test]
    fn test_set_cell_persists_and_touches_one_cell() {
        let mut f = fixture();
        f.app.set_cell(0, 0, "left").unwrap();
        let before = f.app.grid.clone();

        f.app.set_cell(4, 2, "X").unwrap();

        let mut expected = before;
        expected.set(4, 2, "X").unwrap();
        assert_eq!(f.app.grid, expected);
        assert_eq!(persisted(&f.kv), expected);
    }

    #[test]
    fn test_set_cell_out_of_bounds() {
        let mut f = fixture();
        let err = f.app.set_cell(10, 0, "x").unwrap_err();
        assert!(matches!(err, EditError::Grid(GridError::OutOfBounds { .. })));
        assert_eq!(persisted(&f.kv), Grid::blank());
    }

    #[test]
    fn test_every_keystroke_is_persisted() {
        let mut f = fixture();
        f.app.start_editing();
        assert_eq!(f.app.mode, AppMode::Editing);

        f.app.insert_char('h').unwrap();
        assert_eq!(persisted(&f.kv).get(0, 0), Some("h"));
        f.app.insert_char('i').unwrap();
        assert_eq!(persisted(&f.kv).get(0, 0), Some("hi"));
        f.app.delete_before_cursor().unwrap();
        assert_eq!(persisted(&f.kv).get(0, 0), Some("h"));
    }

    #[test]
    fn test_cursor_editing_with_multibyte_text() {
        let mut f = fixture();
        f.app.set_cell(0, 0, "año").unwrap();
        f.app.start_editing();
        assert_eq!(f.app.cursor_position, 3);

        f.app.move_cursor_left();
        f.app.move_cursor_left();
        f.app.delete_at_cursor().unwrap();
        assert_eq!(f.app.grid.get(0, 0), Some("ao"));

        f.app.move_cursor_home();
        f.app.insert_char('¡').unwrap();
        assert_eq!(f.app.grid.get(0, 0), Some("¡ao"));

        f.app.move_cursor_end();
        f.app.delete_at_cursor().unwrap();
        assert_eq!(f.app.grid.get(0, 0), Some("¡ao"));
    }

    #[test]
    fn test_finish_editing_moves_down() {
        let mut f = fixture();
        f.app.start_editing();
        f.app.insert_char('x').unwrap();
        f.app.finish_editing();

        assert_eq!(f.app.mode, AppMode::Normal);
        assert_eq!(f.app.selected_row, 1);
        assert!(f.app.input.is_empty());
        assert_eq!(persisted(&f.kv).get(0, 0), Some("x"));
    }

    #[test]
    fn test_finish_editing_on_last_row_stays() {
        let mut f = fixture();
        f.app.selected_row = 9;
        f.app.start_editing();
        f.app.finish_editing();
        assert_eq!(f.app.selected_row, 9);
    }

    #[test]
    fn test_cancel_editing_restores_value() {
        let mut f = fixture();
        f.app.set_cell(0, 0, "keep").unwrap();
        f.app.start_editing();
        f.app.delete_before_cursor().unwrap();
        f.app.insert_char('!').unwrap();
        assert_eq!(persisted(&f.kv).get(0, 0), Some("kee!"));

        f.app.cancel_editing().unwrap();
        assert_eq!(f.app.mode, AppMode::Normal);
        assert_eq!(f.app.selected_row, 0);
        assert_eq!(f.app.grid.get(0, 0), Some("keep"));
        assert_eq!(persisted(&f.kv).get(0, 0), Some("keep"));
    }

    #[test]
    fn test_clear_selected_cell() {
        let mut f = fixture();
        f.app.set_cell(0, 0, "bye").unwrap();
        f.app.clear_selected_cell().unwrap();
        assert_eq!(f.app.grid.get(0, 0), Some(""));
        assert_eq!(persisted(&f.kv).get(0, 0), Some(""));
    }

    #[test]
    fn test_clear_all() {
        let mut f = fixture();
        f.app.set_cell(1, 1, "a").unwrap();
        f.app.set_cell(2, 2, "b").unwrap();

        f.app.start_clear_all();
        assert_eq!(f.app.mode, AppMode::ConfirmClear);
        f.app.confirm_clear_all().unwrap();

        assert_eq!(f.app.mode, AppMode::Normal);
        assert_eq!(f.app.grid, Grid::blank());
        assert_eq!(f.kv.get_item(GRID_KEY).unwrap(), None);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut f = fixture();
        f.app.move_up();
        f.app.move_left();
        assert_eq!((f.app.selected_row, f.app.selected_col), (0, 0));

        for _ in 0..20 {
            f.app.move_down();
            f.app.move_right();
        }
        assert_eq!((f.app.selected_row, f.app.selected_col), (9, 4));
    }

    #[test]
    fn test_viewport_scrolling() {
        let mut f = fixture();
        f.app.update_viewport_size(3);
        for _ in 0..5 {
            f.app.move_down();
        }
        assert_eq!(f.app.selected_row, 5);
        assert_eq!(f.app.scroll_row, 3);

        for _ in 0..5 {
            f.app.move_up();
        }
        assert_eq!(f.app.scroll_row, 0);
    }

    #[test]
    fn test_export_uses_in_memory_grid_despite_corrupt_storage() {
        let dir = TempDir::new().unwrap();
        let mut kv = MemoryStore::new();
        kv.set_item(GRID_KEY, "{{corrupt").unwrap();
        let share = RecordingShare::default();
        let calls = share.calls.clone();
        let mut app = App::new(
            GridStore::with_default_size(Box::new(kv)),
            Exporter::new(dir.path(), Box::new(share)),
        );
        assert_eq!(app.grid, Grid::blank());

        app.grid.set(0, 0, "in memory").unwrap();
        let receipt = app.export().unwrap();

        assert!(receipt.path.exists());
        assert_eq!(calls.borrow().len(), 1);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_fresh_start_edit_save_export_scenario() {
        use calamine::{open_workbook, Data, Reader, Xlsx};

        let mut f = fixture();
        assert_eq!(f.app.grid, Grid::blank());

        f.app.start_editing();
        for c in "hello".chars() {
            f.app.insert_char(c).unwrap();
        }
        f.app.finish_editing();

        let saved = persisted(&f.kv);
        assert_eq!(saved.iter_rows().next().unwrap(), ["hello", "", "", "", ""]);

        let receipt = f.app.export().unwrap();
        let mut workbook: Xlsx<_> = open_workbook(&receipt.path).unwrap();
        let range = workbook.worksheet_range("Sheet1").unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("hello".to_string()))
        );
        assert_eq!(f.share.calls.borrow().len(), 1);
    }
}
