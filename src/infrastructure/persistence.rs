use thiserror::Error;

use super::storage::{KeyValueStore, StorageError};
use crate::domain::{Grid, COLUMNS, ROWS};

/// Storage key holding the JSON snapshot of the grid.
pub const GRID_KEY: &str = "gridData";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize grid: {0}")]
    Encode(serde_json::Error),
    #[error("invalid grid snapshot: {0}")]
    Decode(serde_json::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Write-through persistence of the grid under [`GRID_KEY`].
pub struct GridStore {
    store: Box<dyn KeyValueStore>,
    rows: usize,
    cols: usize,
}

impl GridStore {
    pub fn new(store: Box<dyn KeyValueStore>, rows: usize, cols: usize) -> Self {
        Self { store, rows, cols }
    }

    /// Store for the default 10 x 5 form.
    pub fn with_default_size(store: Box<dyn KeyValueStore>) -> Self {
        Self::new(store, ROWS, COLUMNS)
    }

    /// Fetches the persisted grid, or a blank one if nothing was saved yet.
    ///
    /// A snapshot of a different size, or with rows of differing length,
    /// is padded or truncated to fit.
    pub fn load(&self) -> PersistenceResult<Grid> {
        let data = match self.store.get_item(GRID_KEY)? {
            Some(data) if !data.trim().is_empty() => data,
            _ => return Ok(Grid::new(self.rows, self.cols)),
        };

        let cells: Vec<Vec<String>> =
            serde_json::from_str(&data).map_err(PersistenceError::Decode)?;
        let fits = cells.len() == self.rows && cells.iter().all(|row| row.len() == self.cols);
        if !fits {
            log::warn!(
                "Snapshot has {} rows of {:?} cells, conforming to {}x{}",
                cells.len(),
                cells.iter().map(Vec::len).collect::<Vec<_>>(),
                self.rows,
                self.cols
            );
        }
        Ok(Grid::conform_rows(cells, self.rows, self.cols))
    }

    /// Like [`GridStore::load`], but logs any failure and falls back to a
    /// blank grid.
    pub fn load_or_blank(&self) -> Grid {
        self.load().unwrap_or_else(|e| {
            log::error!("Failed to load grid: {e}");
            Grid::new(self.rows, self.cols)
        })
    }

    /// Overwrites the persisted snapshot with `grid`.
    pub fn save(&mut self, grid: &Grid) -> PersistenceResult<()> {
        let json = serde_json::to_string(grid).map_err(PersistenceError::Encode)?;
        self.store.set_item(GRID_KEY, &json)?;
        Ok(())
    }

    /// Drops the persisted snapshot entirely.
    pub fn clear(&mut self) -> PersistenceResult<()> {
        self.store.remove_item(GRID_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{FileStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn memory_store() -> GridStore {
        GridStore::with_default_size(Box::new(MemoryStore::new()))
    }

    fn store_with_snapshot(snapshot: &str) -> GridStore {
        let mut kv = MemoryStore::new();
        kv.set_item(GRID_KEY, snapshot).unwrap();
        GridStore::with_default_size(Box::new(kv))
    }

    #[test]
    fn test_load_without_snapshot_is_blank() {
        let grid = memory_store().load().unwrap();
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 5);
        assert!(grid.iter_rows().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = memory_store();
        let mut grid = Grid::blank();
        grid.set(0, 0, "hello").unwrap();
        grid.set(3, 2, "wörld").unwrap();
        grid.set(9, 4, "\"quoted\"").unwrap();

        store.save(&grid).unwrap();
        assert_eq!(store.load().unwrap(), grid);
    }

    #[test]
    fn test_snapshot_is_json_array_of_arrays() {
        let dir = TempDir::new().unwrap();
        let kv = FileStore::in_dir(dir.path()).unwrap();
        let mut store = GridStore::new(Box::new(kv.clone()), 2, 2);
        let grid = Grid::from_rows([["a", "b"], ["c", "d"]]).unwrap();

        store.save(&grid).unwrap();
        assert_eq!(
            kv.get_item(GRID_KEY).unwrap().as_deref(),
            Some(r#"[["a","b"],["c","d"]]"#)
        );
    }

    #[test]
    fn test_save_persists_across_store_instances() {
        let dir = TempDir::new().unwrap();
        let mut grid = Grid::blank();
        grid.set(1, 1, "kept").unwrap();

        {
            let kv = FileStore::in_dir(dir.path()).unwrap();
            let mut store = GridStore::with_default_size(Box::new(kv));
            store.save(&grid).unwrap();
        }

        let kv = FileStore::in_dir(dir.path()).unwrap();
        let store = GridStore::with_default_size(Box::new(kv));
        assert_eq!(store.load().unwrap(), grid);
    }

    #[test]
    fn test_corrupt_snapshot_fails_load() {
        let store = store_with_snapshot("{broken");
        assert!(matches!(store.load(), Err(PersistenceError::Decode(_))));
        assert_eq!(store.load_or_blank(), Grid::blank());
    }

    #[test]
    fn test_empty_snapshot_is_blank() {
        let store = store_with_snapshot("");
        assert_eq!(store.load().unwrap(), Grid::blank());
    }

    #[test]
    fn test_undersized_snapshot_is_conformed() {
        let store = store_with_snapshot(r#"[["a","b"],["c","d"]]"#);
        let grid = store.load().unwrap();

        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.get(0, 0), Some("a"));
        assert_eq!(grid.get(1, 1), Some("d"));
        assert_eq!(grid.get(1, 2), Some(""));
        assert_eq!(grid.get(9, 4), Some(""));
    }

    #[test]
    fn test_ragged_snapshot_is_conformed() {
        let store = store_with_snapshot(r#"[["keep","b","c","d","e"],["f"]]"#);
        let grid = store.load().unwrap();

        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.iter_rows().next().unwrap(), ["keep", "b", "c", "d", "e"]);
        assert_eq!(grid.iter_rows().nth(1).unwrap(), ["f", "", "", "", ""]);
        assert_eq!(store.load_or_blank().get(0, 0), Some("keep"));
    }

    #[test]
    fn test_oversized_rows_are_truncated() {
        let store = store_with_snapshot(r#"[["a","b","c","d","e","extra"]]"#);
        let grid = store.load().unwrap();

        assert_eq!(grid.iter_rows().next().unwrap(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let mut store = memory_store();
        let mut grid = Grid::blank();
        grid.set(0, 0, "gone").unwrap();
        store.save(&grid).unwrap();

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), Grid::blank());
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("storage.json"), "not json").unwrap();
        let kv = FileStore::in_dir(dir.path()).unwrap();
        let mut store = GridStore::with_default_size(Box::new(kv));

        assert!(matches!(store.load(), Err(PersistenceError::Storage(_))));
        assert!(matches!(
            store.save(&Grid::blank()),
            Err(PersistenceError::Storage(_))
        ));
    }
}
