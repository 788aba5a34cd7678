use clap::Parser;
use sea_orm_cli::MigrateSubcommands;

/// Manage the code and scan database schema.
///
/// Applies all pending migrations if no subcommand is provided.
#[derive(Parser)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Option<MigrateSubcommands>,
}
