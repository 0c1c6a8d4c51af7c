use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// MIME type of an Office Open XML workbook.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Uniform type identifier of an xlsx file.
pub const XLSX_UTI: &str = "com.microsoft.excel.xlsx";

/// What to tell the platform about the file being shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub mime_type: String,
    pub dialog_title: String,
    pub uti: String,
}

impl ShareRequest {
    pub fn xlsx() -> Self {
        Self {
            mime_type: XLSX_MIME_TYPE.to_string(),
            dialog_title: "Download File".to_string(),
            uti: XLSX_UTI.to_string(),
        }
    }
}

/// Opaque result of a share action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    pub target: String,
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("could not hand {path} to the system: {source}")]
    Launch { path: PathBuf, source: io::Error },
}

pub trait ShareTarget {
    fn share(&self, path: &Path, request: &ShareRequest) -> Result<ShareOutcome, ShareError>;
}

/// Hands the file to the operating system's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShare;

impl ShareTarget for SystemShare {
    fn share(&self, path: &Path, request: &ShareRequest) -> Result<ShareOutcome, ShareError> {
        log::debug!(
            "Sharing {} as {} ({})",
            path.display(),
            request.mime_type,
            request.dialog_title
        );
        open::that(path).map_err(|source| ShareError::Launch {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ShareOutcome {
            target: format!("file://{}", path.display()),
        })
    }
}
