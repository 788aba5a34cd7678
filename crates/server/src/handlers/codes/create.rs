use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use common::style::StyleConfig;
use db::{
    code, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::{origin::RequestBase, schema::example_error, validation::ValidatedJson};

/// Errors that may occur during the code creation process.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum CodeCreateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Provided style settings do not match the style schema.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid style settings: {}", _0)]
    InvalidSettings(serde_json::Error),

    /// Code with the same identifier already exists.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "identifier is already taken")]
    IdTaken,

    /// Code with the same slug already exists.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "slug is already taken")]
    SlugTaken,
}

/// JSON request body.
#[derive(Deserialize, Validate, JsonSchema)]
pub(super) struct CodeCreateRequest {
    /// Pre-minted code identifier.
    #[validate(custom = "super::validate_minted_id")]
    #[schemars(example = "crate::schema::example_code_id")]
    id: String,

    /// Code name.
    #[validate(length(min = 1, max = 255))]
    #[schemars(example = "crate::schema::example_name")]
    name: String,

    /// Code description.
    #[validate(custom = "super::validate_description")]
    #[schemars(example = "crate::schema::example_description")]
    description: Option<String>,

    /// Redirect destination, an absolute `http` or `https` URL.
    #[validate(url, regex = "crate::handlers::codes::HTTP_URL_REGEX")]
    #[schemars(example = "crate::schema::example_target_url")]
    target_url: String,

    /// Public slug for untracked redirects.
    #[validate(custom = "super::validate_slug")]
    #[schemars(example = "crate::schema::example_slug")]
    slug: Option<String>,

    /// Whether scans are recorded, enabled by default.
    #[serde(default = "tracking_enabled_default")]
    tracking_enabled: bool,

    /// Style snapshot.
    #[schemars(example = "crate::schema::example_settings")]
    settings: Option<Value>,

    /// Opaque creator identifier.
    #[validate(length(max = 255))]
    #[schemars(example = "crate::schema::example_creator_id")]
    creator_id: Option<String>,
}

fn tracking_enabled_default() -> bool {
    true
}

/// JSON response body.
#[derive(Serialize, JsonSchema)]
pub(super) struct CodeCreateResponse {
    /// Code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    id: String,

    /// Payload to embed into the printed code.
    #[schemars(example = "crate::schema::example_payload")]
    payload: String,
}

/// Generate OAPI documentation for the [`create`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create a new code with a pre-minted identifier.")
        .response_with::<200, Json<CodeCreateResponse>, _>(|op| {
            op.description("Code was created successfully.")
        })
        .response_with::<409, Json<Value>, _>(|op| {
            op.description("Identifier or slug is already taken.")
                .example(example_error(CodeCreateError::SlugTaken))
        })
}

/// Code creation handler.
pub(super) async fn create(
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<CodeCreateRequest>,
) -> Result<Json<CodeCreateResponse>, CodeCreateError> {
    let settings = match request.settings {
        Some(settings) => serde_json::from_value::<StyleConfig>(settings)?,
        None => StyleConfig::default(),
    };

    let settings = serde_json::to_string(&settings)?;

    let id = db
        .transaction(|txn| {
            Box::pin(async move {
                let id_taken = code::Entity::find_by_id(request.id.clone())
                    .select_only()
                    .exists(txn)
                    .await?;

                if id_taken {
                    return Err(CodeCreateError::IdTaken);
                }

                if let Some(slug) = &request.slug {
                    let slug_taken = code::Entity::find()
                        .select_only()
                        .filter(code::Column::Slug.eq(slug.as_str()))
                        .exists(txn)
                        .await?;

                    if slug_taken {
                        return Err(CodeCreateError::SlugTaken);
                    }
                }

                code::Entity::insert(code::ActiveModel {
                    id: ActiveValue::Set(request.id.clone()),
                    slug: ActiveValue::Set(request.slug),
                    name: ActiveValue::Set(request.name),
                    description: ActiveValue::Set(request.description),
                    target_url: ActiveValue::Set(request.target_url),
                    tracking_enabled: ActiveValue::Set(request.tracking_enabled),
                    settings: ActiveValue::Set(settings),
                    creator_id: ActiveValue::Set(request.creator_id),
                    ..Default::default()
                })
                .exec_without_returning(txn)
                .await?;

                Ok(request.id)
            })
        })
        .await
        .into_raw_result()?;

    info!(%id, "code created");

    Ok(Json(CodeCreateResponse {
        payload: base.payload(&id),
        id,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database, RequestBodyExt, ResponseBodyExt};

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use db::{code, EntityTrait};
    use serde_json::json;
    use tower::ServiceExt;

    fn request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/codes")
            .header("Host", "localhost:3000")
            .header("Content-Type", "application/json")
            .body(Body::from_json(body))
            .unwrap()
    }

    #[tokio::test]
    async fn create() {
        let db = create_database().await;
        let id = common::id::mint().to_string();

        let response = app(db.clone())
            .oneshot(request(json!({
                "id": id,
                "name": "Spring menu",
                "target_url": "https://a.com",
                "slug": "spring-menu",
                "settings": {
                    "dots_options": { "color": "#112233" }
                }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let payload = format!("http://192.168.1.50:3000/scan/{id}");

        assert_json!(response.json().await, {
            "id": id.clone(),
            "payload": payload,
        });

        let model = code::Entity::find_by_id(id)
            .one(&db)
            .await
            .expect("unable to find code")
            .expect("code was not created");

        assert_eq!(model.target_url, "https://a.com");
        assert_eq!(model.slug.as_deref(), Some("spring-menu"));
        assert!(model.tracking_enabled);
        assert_eq!(model.total_edits, 0);
        assert_eq!(model.settings, r##"{"dots_options":{"color":"#112233"}}"##);
    }

    #[tokio::test]
    async fn invalid_values() {
        let db = create_database().await;
        let id = common::id::mint().to_string();

        for body in [
            json!({ "id": id, "name": "Menu", "target_url": "ftp://a.com" }),
            json!({ "id": id, "name": "Menu", "target_url": "not a url" }),
            json!({ "id": id.to_uppercase(), "name": "Menu", "target_url": "https://a.com" }),
            json!({ "id": "code-1", "name": "Menu", "target_url": "https://a.com" }),
            json!({ "id": id, "name": "", "target_url": "https://a.com" }),
            json!({ "id": id, "name": "Menu", "target_url": "https://a.com", "slug": id }),
            json!({ "id": id, "name": "Menu", "target_url": "https://a.com", "slug": "a b" }),
            json!({
                "id": id,
                "name": "Menu",
                "target_url": "https://a.com",
                "settings": { "qr_options": { "error_correction_level": "Z" } }
            }),
            json!({
                "id": id,
                "name": "Menu",
                "target_url": "https://a.com",
                "settings": { "dots_option": { "color": "#000000" } }
            }),
            json!({ "id": id, "target_url": "https://a.com" }),
            json!({
                "id": id,
                "name": "Menu",
                "target_url": "https://a.com",
                "description": "a".repeat(2049)
            }),
        ] {
            let response = app(db.clone()).oneshot(request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn conflicts() {
        let db = create_database().await;
        let existing = create_code(&db, Some("menu"), "https://a.com", true).await;

        let response = app(db.clone())
            .oneshot(request(json!({
                "id": existing.id,
                "name": "Menu",
                "target_url": "https://b.com",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app(db)
            .oneshot(request(json!({
                "id": common::id::mint().to_string(),
                "name": "Menu",
                "target_url": "https://b.com",
                "slug": "menu",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_json!(response.json().await, {
            "code": 409,
            "error": "slug is already taken",
        });
    }
}
