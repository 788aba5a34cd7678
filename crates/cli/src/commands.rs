/// `configure` subcommand.
mod configure;

/// `create` subcommand.
mod create;

/// `delete` subcommand.
mod delete;

/// `edit` subcommand.
mod edit;

/// `mint` subcommand.
mod mint;

/// `payload` subcommand.
mod payload;

/// `scan` subcommand.
mod scan;

/// `show` subcommand.
mod show;

/// `style` subcommand.
mod style;

pub(crate) use configure::configure;
pub(crate) use create::create;
pub(crate) use delete::delete;
pub(crate) use edit::edit;
pub(crate) use mint::mint;
pub(crate) use payload::payload;
pub(crate) use scan::scan;
pub(crate) use show::show;
pub(crate) use style::style;

use clap::{Args, Parser, Subcommand};

/// CLI configuration.
#[derive(Parser)]
#[command(name = "qrlink", about)]
pub(crate) struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Store the API server path and the web origin.
    Configure(Configure),

    /// Mint a new code identifier and print its payload.
    Mint,

    /// Create a new code.
    Create(Create),

    /// Show code details.
    Show(CodeId),

    /// Edit code fields without changing its payload.
    Edit(Edit),

    /// Replace a single style value.
    Style(Style),

    /// Delete a code with its scans.
    Delete(CodeId),

    /// Print the payload to embed into the printed code.
    Payload(CodeId),

    /// Follow a scanned payload the way a scanning device does.
    Scan(Scan),
}

/// `configure` subcommand configuration.
#[derive(Args)]
pub struct Configure {
    /// Custom server path.
    #[arg(short, long)]
    server_path: Option<String>,

    /// Custom web origin.
    #[arg(short, long)]
    web_origin: Option<String>,
}

/// Code selection shared by multiple subcommands.
#[derive(Args)]
pub struct CodeId {
    /// Code identifier.
    id: String,
}

/// `create` subcommand configuration.
#[derive(Args)]
pub struct Create {
    /// Code name.
    name: String,

    /// Redirect destination.
    target_url: String,

    /// Code identifier minted in advance with the `mint` subcommand.
    #[arg(short, long)]
    id: Option<String>,

    /// Code description.
    #[arg(short, long)]
    description: Option<String>,

    /// Public slug for untracked redirects.
    #[arg(short, long)]
    slug: Option<String>,

    /// Do not record scans.
    #[arg(long)]
    no_tracking: bool,

    /// Style snapshot as a JSON object.
    #[arg(long)]
    settings: Option<String>,

    /// Opaque creator identifier.
    #[arg(short, long)]
    creator_id: Option<String>,
}

/// `edit` subcommand configuration.
#[derive(Args)]
pub struct Edit {
    /// Code identifier.
    id: String,

    /// New code name.
    #[arg(short, long)]
    name: Option<String>,

    /// New code description.
    #[arg(short, long, conflicts_with = "clear_description")]
    description: Option<String>,

    /// Remove the code description.
    #[arg(long)]
    clear_description: bool,

    /// New redirect destination.
    #[arg(short, long)]
    target_url: Option<String>,

    /// New public slug.
    #[arg(short, long, conflicts_with = "clear_slug")]
    slug: Option<String>,

    /// Remove the public slug.
    #[arg(long)]
    clear_slug: bool,

    /// Enable or disable scan tracking.
    #[arg(long)]
    tracking: Option<bool>,
}

/// `style` subcommand configuration.
#[derive(Args)]
pub struct Style {
    /// Code identifier.
    id: String,

    /// Dotted style path, such as `dots_options.color`.
    path: String,

    /// New value, parsed as JSON when possible and used as a string otherwise.
    value: String,
}

/// `scan` subcommand configuration.
#[derive(Args)]
pub struct Scan {
    /// Payload decoded from the printed code.
    payload: String,

    /// Print the resolved link instead of opening it.
    #[arg(long)]
    no_open: bool,
}
