use derive_more::{Display, Error, From};

use crate::{
    api::{ApiClient, ApiError, CodeDetails},
    commands::CodeId,
    config::{CliConfig, CliConfigError},
};

/// Errors shared by subcommands that manage a single existing code.
#[derive(Debug, Display, From, Error)]
pub(crate) enum CodeCommandError {
    /// CLI configuration error.
    Config(CliConfigError),

    /// Code management API error.
    Api(ApiError),
}

/// Print code details in a human-readable form.
pub(super) fn print_details(details: &CodeDetails) {
    println!("Code identifier: {}", details.id);
    println!("Name: {}", details.name);

    if let Some(description) = &details.description {
        println!("Description: {description}");
    }

    println!("Target URL: {}", details.target_url);

    if let Some(slug) = &details.slug {
        println!("Slug: {slug}");
    }

    if let Some(creator_id) = &details.creator_id {
        println!("Creator: {creator_id}");
    }

    println!(
        "Tracking: {}",
        if details.tracking_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "Scans: {} total, {} unique",
        details.total_scans, details.unique_scans
    );
    println!("Edits: {}", details.total_edits);
    println!("Settings: {}", details.settings);
    println!("Payload: {}", details.payload);
}

/// Show flow entrypoint.
pub(crate) async fn show(CodeId { id }: CodeId) -> Result<(), CodeCommandError> {
    let config = CliConfig::new()?;
    let details = ApiClient::new(&config).details(&id).await?;

    print_details(&details);

    Ok(())
}
