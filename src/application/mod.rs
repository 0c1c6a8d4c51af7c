//! Application layer managing state and editing workflows.
//!
//! This module coordinates between the domain layer, persistence and export,
//! and the presentation layer.

pub mod state;

pub use state::*;
