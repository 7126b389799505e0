//! Configuration module for listing
//!
//! This module handles the `listing` settings group, including
//! serialization/deserialization to/from JSON and lookup in workspace and
//! platform-specific config directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
