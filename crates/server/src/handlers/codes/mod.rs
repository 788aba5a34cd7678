/// Code creation route.
mod create;

/// Code deletion route.
mod delete;

/// Code details route.
mod details;

/// Code edit route.
mod edit;

/// Code list route.
mod list;

/// Identifier minting route.
mod mint;

/// Code payload route.
mod payload;

/// Code style update route.
mod settings;

use std::{borrow::Cow, sync::Arc};

use aide::axum::{
    routing::{get_with, patch_with},
    ApiRouter,
};
use common::origin::Base;
use db::{code, DatabaseConnection};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::ValidationError;

/// Regular expression to match absolute `http` and `https` URLs.
///
/// The [`validator`] URL check accepts any scheme, thus this
/// regex is applied in addition to it.
pub(crate) static HTTP_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?i)https?://\S+$"#).expect("invalid regex string"));

/// Regular expression to match public code slugs.
static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[A-Za-z0-9_-]{1,64}$"#).expect("invalid regex string"));

/// Validate that the value was minted with [`common::id::mint`].
pub(crate) fn validate_minted_id(value: &str) -> Result<(), ValidationError> {
    match common::id::parse_minted(value) {
        Some(_) => Ok(()),
        None => Err(error("non_canonical_id", "identifier must be a lower-case UUID v4")),
    }
}

/// Validate that the value is a slug that can never be mistaken for an identifier.
pub(crate) fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if !SLUG_REGEX.is_match(value) {
        return Err(error(
            "invalid_slug",
            "slug must contain 1 to 64 letters, digits, dashes or underscores",
        ));
    }

    if common::id::looks_like_id(value) {
        return Err(error("slug_looks_like_id", "slug must not look like an identifier"));
    }

    Ok(())
}

/// Maximum number of characters in a code description.
const MAX_DESCRIPTION_LENGTH: usize = 2048;

/// Validate the code description length.
pub(crate) fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(error(
            "description_too_long",
            "description must not exceed 2048 characters",
        ));
    }

    Ok(())
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Distinguish between missing and `null` values of optional fields.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Code identifier path parameter.
#[derive(Deserialize, JsonSchema)]
pub(super) struct CodePath {
    /// Code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    id: String,
}

/// Complete information about a single code.
#[derive(Serialize, JsonSchema)]
pub struct CodeDetails {
    /// Code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    pub id: String,

    /// Public slug.
    #[schemars(example = "crate::schema::example_slug")]
    pub slug: Option<String>,

    /// Code name.
    #[schemars(example = "crate::schema::example_name")]
    pub name: String,

    /// Code description.
    #[schemars(example = "crate::schema::example_description")]
    pub description: Option<String>,

    /// Current redirect destination.
    #[schemars(example = "crate::schema::example_target_url")]
    pub target_url: String,

    /// Whether scans are recorded.
    pub tracking_enabled: bool,

    /// Style snapshot.
    #[schemars(example = "crate::schema::example_settings")]
    pub settings: Value,

    /// Count of recorded scans.
    #[schemars(example = "crate::schema::example_count")]
    pub total_scans: i64,

    /// Estimated count of distinct scanning devices.
    #[schemars(example = "crate::schema::example_count")]
    pub unique_scans: i64,

    /// Count of edits that changed the code.
    #[schemars(example = "crate::schema::example_count")]
    pub total_edits: i64,

    /// Opaque creator identifier.
    #[schemars(example = "crate::schema::example_creator_id")]
    pub creator_id: Option<String>,

    /// Payload to embed into the printed code.
    #[schemars(example = "crate::schema::example_payload")]
    pub payload: String,

    /// Code creation time.
    #[schemars(example = "crate::schema::example_timestamp")]
    pub created_at: i64,

    /// Last effective edit time.
    #[schemars(example = "crate::schema::example_timestamp")]
    pub updated_at: i64,
}

impl CodeDetails {
    /// Build code details with the payload resolved against the provided base.
    pub fn from_model(model: code::Model, base: &Base) -> Result<Self, serde_json::Error> {
        Ok(Self {
            payload: base.payload(&model.id),
            settings: serde_json::from_str(&model.settings)?,
            id: model.id,
            slug: model.slug,
            name: model.name,
            description: model.description,
            target_url: model.target_url,
            tracking_enabled: model.tracking_enabled,
            total_scans: model.total_scans,
            unique_scans: model.unique_scans,
            total_edits: model.total_edits,
            creator_id: model.creator_id,
            created_at: model.created_at.assume_utc().unix_timestamp(),
            updated_at: model.updated_at.assume_utc().unix_timestamp(),
        })
    }
}

/// Create an [`ApiRouter`] that provides an API server with code management routes.
pub(crate) fn routes() -> ApiRouter<Arc<DatabaseConnection>> {
    ApiRouter::new()
        .api_route(
            "/",
            get_with(list::list, list::docs).post_with(create::create, create::docs),
        )
        .api_route("/mint", get_with(mint::mint, mint::docs))
        .api_route(
            "/:id",
            get_with(details::details, details::docs)
                .patch_with(edit::edit, edit::docs)
                .delete_with(delete::delete, delete::docs),
        )
        .api_route("/:id/settings", patch_with(settings::settings, settings::docs))
        .api_route("/:id/payload", get_with(payload::payload, payload::docs))
        .with_path_items(|op| op.tag("Code management"))
}
