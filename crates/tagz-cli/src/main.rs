//! tagz CLI - HTML page and data URI generator.
//!
//! Provides commands for:
//! - `page`: Wrap a text file into an HTML5 page
//! - `data-uri`: Encode a file as a base64 data URI

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DataUriArgs, PageArgs};
use output::Output;

/// tagz - build HTML pages from the command line.
#[derive(Parser)]
#[command(name = "tagz", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap a text file into an HTML5 page.
    Page(PageArgs),
    /// Print a base64 data URI for a file.
    DataUri(DataUriArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Page(args) => args.execute(),
        Commands::DataUri(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
