//! TiddlyBook CLI.
//!
//! Provides commands for:
//! - `check`: Validate the book and print the report
//! - `docbook`: Write the DocBook XML document
//! - `single`: Write the book as one wiki markup file
//! - `multi`: Write one wiki markup file per tiddler
//! - `images`: Report picture description problems only

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BookArgs, CheckArgs, OutputArgs, WikiDirArgs};
use output::Output;

/// TiddlyBook - build a book out of tiddlers.
#[derive(Parser)]
#[command(name = "tb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the book without writing anything.
    Check(CheckArgs),
    /// Validate, then write the DocBook XML document.
    Docbook(OutputArgs),
    /// Validate, then write the whole book as one wiki markup file.
    Single(OutputArgs),
    /// Validate, then write one wiki markup file per tiddler.
    Multi(WikiDirArgs),
    /// Report missing picture titles, files and figures.
    Images(BookArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Check(args) => args.book.verbose,
            Self::Docbook(args) | Self::Single(args) => args.book.verbose,
            Self::Multi(args) => args.book.verbose,
            Self::Images(args) => args.verbose,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => args.execute(&output),
        Commands::Docbook(args) => args.execute_docbook(&output),
        Commands::Single(args) => args.execute_single(&output),
        Commands::Multi(args) => args.execute(&output),
        Commands::Images(args) => commands::images::execute(&args, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
