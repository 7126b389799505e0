//! Theme overrides for listing captures
//!
//! The host decides the colors of highlighted HTML through its active color
//! theme. This module lets a capture run under a configured theme and puts the
//! user's theme back afterwards.
//!
//! # Architecture
//!
//! - `coordinator.rs` - Request/confirm theme switching and the scoped override

pub mod coordinator;

pub use coordinator::run_with_theme;
