//! Infrastructure layer providing external service integrations.
//!
//! Key-value storage, grid persistence, spreadsheet export, the platform
//! share hand-off, directory configuration and logging setup.

pub mod config;
pub mod export;
pub mod logging;
pub mod persistence;
pub mod share;
pub mod storage;

pub use config::*;
pub use export::*;
pub use logging::*;
pub use persistence::*;
pub use share::*;
pub use storage::*;
