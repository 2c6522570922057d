//! rst2html - convert reStructuredText to an HTML fragment.
//!
//! Reads RST from a file or standard input and writes the rendered HTML
//! fragment (no `<html>`/`<body>` wrapper) to standard output or a file.

mod convert;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use convert::ConvertArgs;
use output::Output;

/// Convert reStructuredText to an HTML fragment.
#[derive(Parser)]
#[command(name = "rst2html", version, about)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.args.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.failure(&err);
            ExitCode::FAILURE
        }
    }
}
