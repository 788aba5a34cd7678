//! # qrlink
//!
//! Operator and scanner client of the dynamic code service.
//!
//! Operator subcommands manage codes through the API server, while the `scan`
//! subcommand follows a decoded payload the same way a scanning device does,
//! recording the scan before opening the current target URL.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use clap::Parser;
use commands::{Cli, Commands};

/// Code management API client.
mod api;

/// CLI subcommands.
mod commands;

/// CLI-specific configuration (server path, web origin).
mod config;

/// CLI entrypoint.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Configure(args) => commands::configure(args)?,
        Commands::Mint => commands::mint()?,
        Commands::Create(args) => commands::create(args).await?,
        Commands::Show(args) => commands::show(args).await?,
        Commands::Edit(args) => commands::edit(args).await?,
        Commands::Style(args) => commands::style(args).await?,
        Commands::Delete(args) => commands::delete(args).await?,
        Commands::Payload(args) => commands::payload(args).await?,
        Commands::Scan(args) => commands::scan(args).await?,
    }

    Ok(())
}
