//! wikimirror CLI.
//!
//! Provides commands for:
//! - `export`: Mirror a Confluence page tree into Markdown
//! - `convert`: Convert a Confluence HTML export directory into Markdown
//! - `serve`: Serve an exported tree over HTTP

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, ExportArgs, ServeArgs};
use error::CliError;
use output::Output;

/// wikimirror - Mirror a wiki page tree into Markdown files.
#[derive(Parser)]
#[command(name = "wikimirror", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a Confluence page and its descendants.
    Export(ExportArgs),
    /// Convert a Confluence HTML export directory.
    Convert(ConvertArgs),
    /// Serve an exported tree.
    Serve(ServeArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Export(args) => args.verbose,
            Self::Convert(args) => args.verbose,
            Self::Serve(args) => args.verbose,
        }
    }

    fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Export(args) => args.execute(),
            Self::Convert(args) => args.execute(),
            Self::Serve(args) => {
                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(args.execute())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG (default WARN)
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
