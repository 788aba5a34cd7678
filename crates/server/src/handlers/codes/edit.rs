use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    code, sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use validator::{Validate, ValidationError};

use super::{CodeDetails, CodePath};
use crate::{origin::RequestBase, schema::example_error, validation::ValidatedJson};

/// Errors that may occur during the code edit process.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum CodeEditError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Stored style settings are malformed.
    SettingsError(serde_json::Error),

    /// Provided slug is malformed.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid slug: {}", _0)]
    InvalidSlug(ValidationError),

    /// Provided description is too long.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid description: {}", _0)]
    #[from(ignore)]
    InvalidDescription(ValidationError),

    /// Request body identifier does not match the path identifier.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "code identifier cannot be changed")]
    IdMismatch,

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,

    /// Another code already uses the provided slug.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "slug is already taken")]
    SlugTaken,
}

/// JSON request body.
///
/// Missing fields are left untouched, `null` clears optional fields.
#[derive(Deserialize, Validate, JsonSchema)]
pub(super) struct CodeEditRequest {
    /// Code identifier, which must match the path identifier if provided.
    #[schemars(example = "crate::schema::example_code_id")]
    id: Option<String>,

    /// Code name.
    #[validate(length(min = 1, max = 255))]
    #[schemars(example = "crate::schema::example_name")]
    name: Option<String>,

    /// Code description.
    #[serde(default, deserialize_with = "super::deserialize_some")]
    #[schemars(example = "crate::schema::example_description")]
    description: Option<Option<String>>,

    /// Redirect destination, an absolute `http` or `https` URL.
    #[validate(url, regex = "crate::handlers::codes::HTTP_URL_REGEX")]
    #[schemars(example = "crate::schema::example_target_url")]
    target_url: Option<String>,

    /// Public slug for untracked redirects.
    #[serde(default, deserialize_with = "super::deserialize_some")]
    #[schemars(example = "crate::schema::example_slug")]
    slug: Option<Option<String>>,

    /// Whether scans are recorded.
    tracking_enabled: Option<bool>,
}

/// Generate OAPI documentation for the [`edit`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Edit a code.")
        .description(
            "Code identifier and payload never change. \
            Edits that do not change anything are not counted.",
        )
        .response_with::<200, Json<CodeDetails>, _>(|op| {
            op.description("Updated code details.")
        })
        .response_with::<404, Json<Value>, _>(|op| {
            op.description("Code not found.")
                .example(example_error(CodeEditError::CodeNotFound))
        })
        .response_with::<409, Json<Value>, _>(|op| {
            op.description("Slug is already taken.")
                .example(example_error(CodeEditError::SlugTaken))
        })
}

/// Code edit handler.
pub(super) async fn edit(
    Path(path): Path<CodePath>,
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<CodeEditRequest>,
) -> Result<Json<CodeDetails>, CodeEditError> {
    if matches!(&request.id, Some(id) if *id != path.id) {
        return Err(CodeEditError::IdMismatch);
    }

    if let Some(Some(slug)) = &request.slug {
        super::validate_slug(slug)?;
    }

    if let Some(Some(description)) = &request.description {
        super::validate_description(description).map_err(CodeEditError::InvalidDescription)?;
    }

    let (model, changed) = db
        .transaction(|txn| {
            Box::pin(async move {
                let model = code::Entity::find_by_id(path.id)
                    .one(txn)
                    .await?
                    .ok_or(CodeEditError::CodeNotFound)?;

                let mut update = code::Entity::update_many()
                    .filter(code::Column::Id.eq(model.id.as_str()));
                let mut changed = false;

                if let Some(name) = request.name.filter(|name| *name != model.name) {
                    update = update.col_expr(code::Column::Name, Expr::value(name));
                    changed = true;
                }

                if let Some(description) = request
                    .description
                    .filter(|description| *description != model.description)
                {
                    update = update.col_expr(code::Column::Description, Expr::value(description));
                    changed = true;
                }

                if let Some(target_url) = request
                    .target_url
                    .filter(|target_url| *target_url != model.target_url)
                {
                    update = update.col_expr(code::Column::TargetUrl, Expr::value(target_url));
                    changed = true;
                }

                if let Some(slug) = request.slug.filter(|slug| *slug != model.slug) {
                    if let Some(slug) = &slug {
                        let slug_taken = code::Entity::find()
                            .select_only()
                            .filter(code::Column::Slug.eq(slug.as_str()))
                            .exists(txn)
                            .await?;

                        if slug_taken {
                            return Err(CodeEditError::SlugTaken);
                        }
                    }

                    update = update.col_expr(code::Column::Slug, Expr::value(slug));
                    changed = true;
                }

                if let Some(tracking_enabled) = request
                    .tracking_enabled
                    .filter(|tracking_enabled| *tracking_enabled != model.tracking_enabled)
                {
                    update = update.col_expr(
                        code::Column::TrackingEnabled,
                        Expr::value(tracking_enabled),
                    );
                    changed = true;
                }

                if !changed {
                    return Ok((model, false));
                }

                update
                    .col_expr(
                        code::Column::TotalEdits,
                        db::increment(code::Column::TotalEdits, 1),
                    )
                    .col_expr(
                        code::Column::UpdatedAt,
                        Expr::value(db::current_timestamp()),
                    )
                    .exec(txn)
                    .await?;

                let model = code::Entity::find_by_id(model.id)
                    .one(txn)
                    .await?
                    .ok_or(CodeEditError::CodeNotFound)?;

                Ok((model, true))
            })
        })
        .await
        .into_raw_result()?;

    if changed {
        info!(id = %model.id, total_edits = model.total_edits, "code updated");
    }

    Ok(Json(CodeDetails::from_model(model, &base)?))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database, RequestBodyExt, ResponseBodyExt};

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn edit(app: Router, id: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/codes/{id}"))
                    .header("Host", "localhost:3000")
                    .header("Content-Type", "application/json")
                    .body(Body::from_json(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        (response.status(), response.json().await)
    }

    #[tokio::test]
    async fn target_change_keeps_payload() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;
        let payload = format!("http://192.168.1.50:3000/scan/{}", model.id);

        for (edits, target_url) in ["https://b.com", "https://c.com", "https://d.com"]
            .into_iter()
            .enumerate()
        {
            let (status, body) = edit(
                app(db.clone()),
                &model.id,
                json!({ "target_url": target_url }),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["target_url"], target_url);
            assert_eq!(body["payload"], payload);
            assert_eq!(body["total_edits"], edits as i64 + 1);
        }
    }

    #[tokio::test]
    async fn identical_edit_is_not_counted() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        let (status, body) = edit(
            app(db.clone()),
            &model.id,
            json!({
                "id": model.id,
                "name": model.name,
                "target_url": model.target_url,
                "slug": "menu",
                "tracking_enabled": true,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_edits"], 0);
        assert_eq!(
            body["updated_at"],
            model.updated_at.assume_utc().unix_timestamp()
        );
    }

    #[tokio::test]
    async fn clears_optional_fields() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        let (status, body) = edit(
            app(db.clone()),
            &model.id,
            json!({ "slug": null, "tracking_enabled": false }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json!(body, {
            "id": model.id.clone(),
            "slug": validators::null(),
            "name": "Test code",
            "description": validators::null(),
            "target_url": "https://a.com",
            "tracking_enabled": false,
            "settings": {},
            "total_scans": 0,
            "unique_scans": 0,
            "total_edits": 1,
            "creator_id": validators::null(),
            "payload": format!("http://192.168.1.50:3000/scan/{}", model.id),
            "created_at": model.created_at.assume_utc().unix_timestamp(),
            "updated_at": validators::i64(|_| Ok(())),
        });
    }

    #[tokio::test]
    async fn rejected_edits() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;
        create_code(&db, Some("taken"), "https://a.com", true).await;

        let other_id = common::id::mint().to_string();

        for (body, expected) in [
            (json!({ "id": other_id }), StatusCode::UNPROCESSABLE_ENTITY),
            (json!({ "target_url": "mailto:a@b.com" }), StatusCode::UNPROCESSABLE_ENTITY),
            (json!({ "slug": model.id }), StatusCode::UNPROCESSABLE_ENTITY),
            (json!({ "name": "" }), StatusCode::UNPROCESSABLE_ENTITY),
            (
                json!({ "description": "a".repeat(2049) }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (json!({ "slug": "taken" }), StatusCode::CONFLICT),
        ] {
            let (status, _) = edit(app(db.clone()), &model.id, body).await;

            assert_eq!(status, expected);
        }

        let (status, _) = edit(
            app(db),
            &other_id,
            json!({ "target_url": "https://b.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
