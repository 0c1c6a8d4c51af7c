//! Presentation layer handling terminal UI and user input.
//!
//! Renders the form grid with ratatui and maps key presses onto
//! application state changes.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
