//! listing - Main Entry Point
//!
//! Exports highlighted source listings to HTML and LaTeX, on save or on demand.

mod capture;
mod cli;
mod config;
mod error;
mod export;
mod host;
mod paths;
mod theme;
mod workspaces;

use clap::Parser;
use cli::commands::{self, HostOptions};
use cli::{Cli, Commands};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let host_options = HostOptions {
        system_clipboard: cli.system_clipboard,
        theme: cli.host_theme,
    };

    let result = match cli.command {
        Commands::Watch { roots } => commands::watch(roots, &host_options),
        Commands::Export { file, roots } => commands::export(&file, roots, &host_options),
        Commands::ExportAll { root } => commands::export_all(root, &host_options),
        Commands::Copy {
            file,
            format,
            lines,
            root,
        } => commands::copy(&file, format, lines, root, &host_options),
        Commands::Init { root, force } => commands::init(root, force),
        Commands::Themes => {
            commands::themes();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
