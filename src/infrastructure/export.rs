//! Spreadsheet export of the form grid.
//!
//! The grid is encoded as a single-sheet xlsx workbook in memory, written
//! to a fixed file in the cache directory and handed to a [`ShareTarget`].
//! The file is left in place afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use super::share::{ShareError, ShareOutcome, ShareRequest, ShareTarget};
use crate::domain::Grid;

/// Name of the single worksheet in an export.
pub const SHEET_NAME: &str = "Sheet1";
/// File name of the export inside the cache directory.
pub const EXPORT_FILE_NAME: &str = "gridData.xlsx";

/// Largest row count a worksheet can hold.
pub const MAX_SHEET_ROWS: usize = 1_048_576;
/// Largest column count a worksheet can hold.
pub const MAX_SHEET_COLS: usize = 16_384;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode workbook: {0}")]
    Encode(#[from] XlsxError),
    #[error("a {rows}x{cols} grid does not fit in a worksheet")]
    TooLarge { rows: usize, cols: usize },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Share(#[from] ShareError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub outcome: ShareOutcome,
}

/// Encodes `grid` as xlsx bytes, one string cell per grid cell.
///
/// Grids larger than a worksheet are rejected rather than truncated.
pub fn encode_workbook(grid: &Grid) -> ExportResult<Vec<u8>> {
    let too_large = || ExportError::TooLarge {
        rows: grid.rows(),
        cols: grid.cols(),
    };
    if grid.rows() > MAX_SHEET_ROWS || grid.cols() > MAX_SHEET_COLS {
        return Err(too_large());
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row, cells) in grid.iter_rows().enumerate() {
        let row = u32::try_from(row).map_err(|_| too_large())?;
        for (col, value) in cells.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_large())?;
            worksheet.write_string(row, col, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub struct Exporter {
    path: PathBuf,
    share: Box<dyn ShareTarget>,
}

impl Exporter {
    pub fn new(cache_dir: &Path, share: Box<dyn ShareTarget>) -> Self {
        Self {
            path: cache_dir.join(EXPORT_FILE_NAME),
            share,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encodes `grid`, writes it to the export path and shares the file.
    ///
    /// The share step only runs once the file has been written.
    pub fn export(&self, grid: &Grid) -> ExportResult<ExportReceipt> {
        let bytes = encode_workbook(grid)?;
        self.write_file(&bytes).map_err(|source| ExportError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("Wrote {} bytes to {}", bytes.len(), self.path.display());

        let outcome = self.share.share(&self.path, &ShareRequest::xlsx())?;
        log::info!("Download link: {}", outcome.target);

        Ok(ExportReceipt {
            path: self.path.clone(),
            bytes_written: bytes.len(),
            outcome,
        })
    }

    fn write_file(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)
    }
}
