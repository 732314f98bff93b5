//! devsite CLI - static-site development server.
//!
//! Provides commands for:
//! - `serve`: Serve the site directory, with live reload in development mode

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use output::Output;

/// devsite - static-site development server.
#[derive(Parser)]
#[command(name = "devsite", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site directory.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to INFO
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
    };

    if let Err(err) = result {
        let output = Output::new();
        output.error(&err);
        std::process::exit(1);
    }
}
