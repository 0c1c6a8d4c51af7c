use serde::{Deserialize, Serialize};

use super::errors::{GridError, GridResult};

/// Number of rows in the form grid.
pub const ROWS: usize = 10;
/// Number of columns in the form grid.
pub const COLUMNS: usize = 5;

/// A fixed-size grid of free-form text cells.
///
/// Dimensions are set at construction and never change. Every row holds
/// exactly `cols` cells. On the wire the grid is a plain array of arrays of
/// strings, which is also the shape of the persisted snapshot.
///
/// # Examples
///
/// ```
/// use gridform::domain::Grid;
///
/// let mut grid = Grid::blank();
/// grid.set(0, 0, "hello").unwrap();
/// assert_eq!(grid.get(0, 0), Some("hello"));
/// assert_eq!(grid.get(0, 1), Some(""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Grid {
    cells: Vec<Vec<String>>,
    cols: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self::blank()
    }
}

impl Grid {
    /// Creates a grid of `rows` x `cols` empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![String::new(); cols]; rows],
            cols,
        }
    }

    /// Creates the default 10 x 5 form grid.
    pub fn blank() -> Self {
        Self::new(ROWS, COLUMNS)
    }

    /// Builds a grid from explicit rows, rejecting ragged input.
    pub fn from_rows<R, C, S>(rows: R) -> GridResult<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::try_from(cells)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the text at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Replaces the text at `(row, col)`. No other cell is touched.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> GridResult<()> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(GridError::OutOfBounds { row, col })?;
        *cell = value.into();
        Ok(())
    }

    /// Empties every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                cell.clear();
            }
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Number of cells holding non-empty text.
    pub fn filled_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Returns a copy reshaped to `rows` x `cols`.
    ///
    /// Missing rows and cells are filled with empty text, surplus ones are
    /// dropped.
    pub fn conformed(self, rows: usize, cols: usize) -> Self {
        Self::conform_rows(self.cells, rows, cols)
    }

    /// Builds a `rows` x `cols` grid from rows of any length.
    ///
    /// Used to fit a persisted snapshot to the current form size, even one
    /// whose rows disagree in length.
    pub fn conform_rows(mut cells: Vec<Vec<String>>, rows: usize, cols: usize) -> Self {
        cells.resize_with(rows, Vec::new);
        for row in &mut cells {
            row.resize_with(cols, String::new);
        }
        Self { cells, cols }
    }

    /// Spreadsheet column label for a zero-based index (0 = A, 26 = AA).
    pub fn column_label(col: usize) -> String {
        let mut result = String::new();
        let mut c = col;
        loop {
            result.insert(0, char::from(b'A' + (c % 26) as u8));
            if c < 26 {
                break;
            }
            c = c / 26 - 1;
        }
        result
    }
}

impl TryFrom<Vec<Vec<String>>> for Grid {
    type Error = GridError;

    fn try_from(cells: Vec<Vec<String>>) -> GridResult<Self> {
        let cols = cells.first().map_or(0, Vec::len);
        if let Some((row, found)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(GridError::Ragged {
                row,
                expected: cols,
                found,
            });
        }
        Ok(Self { cells, cols })
    }
}

impl From<Grid> for Vec<Vec<String>> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}
