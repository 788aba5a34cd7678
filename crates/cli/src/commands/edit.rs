use crate::{
    api::{ApiClient, EditRequest},
    commands::{
        show::{print_details, CodeCommandError},
        Edit,
    },
    config::CliConfig,
};

/// Convert a pair of "set" and "clear" arguments into a nullable field update.
fn nullable(value: Option<&str>, clear: bool) -> Option<Option<&str>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Edit flow entrypoint.
///
/// Edits never change the code's payload, so already printed codes follow the new target.
pub(crate) async fn edit(
    Edit {
        id,
        name,
        description,
        clear_description,
        target_url,
        slug,
        clear_slug,
        tracking,
    }: Edit,
) -> Result<(), CodeCommandError> {
    let config = CliConfig::new()?;

    let details = ApiClient::new(&config)
        .edit(
            &id,
            &EditRequest {
                name: name.as_deref(),
                description: nullable(description.as_deref(), clear_description),
                target_url: target_url.as_deref(),
                slug: nullable(slug.as_deref(), clear_slug),
                tracking_enabled: tracking,
            },
        )
        .await?;

    print_details(&details);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::nullable;

    #[test]
    fn nullable_fields() {
        assert_eq!(nullable(None, false), None);
        assert_eq!(nullable(Some("menu"), false), Some(Some("menu")));
        assert_eq!(nullable(None, true), Some(None));
    }
}
