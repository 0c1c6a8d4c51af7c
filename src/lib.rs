//! gridform - Terminal Form Grid Library
//!
//! A fixed 10 x 5 grid of text cells, saved on every edit and exportable to
//! an xlsx workbook handed to the system's default handler.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
