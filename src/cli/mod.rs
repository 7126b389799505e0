//! CLI definitions and command implementations for listing.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;

/// listing - highlighted source listings exported to HTML and LaTeX
#[derive(Parser)]
#[command(name = "listing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use the desktop clipboard instead of a process-local one
    #[arg(long, global = true)]
    pub system_clipboard: bool,

    /// Color theme the editor shows before any override
    #[arg(long, global = true, value_name = "THEME")]
    pub host_theme: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch workspace roots and export listings whenever a file is saved
    Watch {
        /// Workspace root (repeatable, defaults to the current directory)
        #[arg(short, long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,
    },

    /// Export the listings of one file, as if it had just been saved
    Export {
        /// File to export
        file: PathBuf,

        /// Workspace root (repeatable, defaults to the current directory)
        #[arg(short, long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,
    },

    /// Export every file of the source directory
    ExportAll {
        /// Workspace root (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Copy a file, or some of its lines, as a listing
    Copy {
        /// File to copy from
        file: PathBuf,

        /// Listing format
        #[arg(short, long, default_value = "latex", value_parser = parse_format)]
        format: ExportFormat,

        /// One-based, inclusive line range such as `3:10`
        #[arg(short, long, value_name = "START:END", value_parser = parse_line_range)]
        lines: Option<(usize, usize)>,

        /// Workspace root whose settings apply (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Write a workspace settings file seeded from the global configuration
    Init {
        /// Workspace root (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// List the color themes available for highlighting
    Themes,
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "html" => Ok(ExportFormat::Html),
        "latex" | "tex" => Ok(ExportFormat::Latex),
        other => Err(format!("unknown format '{}' (expected html or latex)", other)),
    }
}

fn parse_line_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start line '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end line '{}'", end))?;
    if start == 0 || end < start {
        return Err(format!("invalid line range {}:{}", start, end));
    }
    Ok((start, end))
}
