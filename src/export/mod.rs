//! Listing Export Module
//!
//! This module turns captured highlighted HTML into listing files and
//! clipboard contents.
//!
//! # Supported Export Formats
//!
//! - **HTML**: The captured markup, written as-is
//! - **LaTeX**: A fancyvrb `Verbatim` block with `\textcolor` runs
//!
//! # Architecture
//!
//! - `options.rs` - Export formats and compiled options
//! - `latex.rs` - HTML to LaTeX listing conversion
//! - `file.rs` - Listing file output
//! - `orchestrator.rs` - Save-triggered export and copy-to-clipboard
//! - `dispatch.rs` - Entry points reporting through host notifications

pub mod dispatch;
pub mod file;
pub mod latex;
pub mod options;
pub mod orchestrator;

pub use dispatch::{dispatch_copy, dispatch_save};
pub use latex::ListingConverter;
pub use options::{ExportFormat, ExportOptions};
pub use orchestrator::ListingJob;
