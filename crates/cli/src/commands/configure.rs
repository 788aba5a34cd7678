use derive_more::{Display, Error, From};
use indicatif::ProgressBar;

use crate::{
    commands::Configure,
    config::{default_server_path, default_web_origin, CliConfig, CliConfigError},
};

/// `configure` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ConfigureError {
    /// CLI configuration error.
    Config(CliConfigError),

    /// Web origin cannot be used to build payloads.
    #[display(fmt = "invalid web origin: {}", _0)]
    InvalidOrigin(common::origin::InvalidOrigin),
}

/// Configuration flow entrypoint.
pub(crate) fn configure(
    Configure {
        server_path,
        web_origin,
    }: Configure,
) -> Result<(), ConfigureError> {
    let server_path = server_path.unwrap_or(default_server_path());
    let web_origin = web_origin.unwrap_or(default_web_origin());

    common::origin::Base::parse(&web_origin)?;

    let path = CliConfig::write(server_path, web_origin)?;

    ProgressBar::new_spinner().finish_with_message(format!(
        "Configuration saved to {}.",
        path.display()
    ));

    Ok(())
}
