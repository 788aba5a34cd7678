use std::time::Duration;

use derive_more::{Display, Error, From};
use indicatif::ProgressBar;

use crate::{
    api::{ApiClient, ApiError, CreateRequest, CreatedCode},
    commands::Create,
    config::{CliConfig, CliConfigError},
};

/// `create` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum CreateError {
    /// CLI configuration error.
    Config(CliConfigError),

    /// Code management API error.
    Api(ApiError),

    /// Style snapshot is not valid JSON.
    #[display(fmt = "invalid settings: {}", _0)]
    Json(serde_json::Error),
}

/// Create flow entrypoint.
pub(crate) async fn create(
    Create {
        name,
        target_url,
        id,
        description,
        slug,
        no_tracking,
        settings,
        creator_id,
    }: Create,
) -> Result<(), CreateError> {
    let config = CliConfig::new()?;
    let client = ApiClient::new(&config);

    let id = id.unwrap_or_else(|| common::id::mint().to_string());

    let settings = settings
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()?;

    let pg = ProgressBar::new_spinner();
    pg.enable_steady_tick(Duration::from_millis(150));
    pg.set_message("Creating code...");

    let CreatedCode { id, payload } = client
        .create(&CreateRequest {
            id: &id,
            name: &name,
            description: description.as_deref(),
            target_url: &target_url,
            slug: slug.as_deref(),
            tracking_enabled: !no_tracking,
            settings,
            creator_id: creator_id.as_deref(),
        })
        .await?;

    pg.finish_with_message("Code created.");

    println!("Code identifier: {id}");
    println!("Payload: {payload}");

    Ok(())
}
