use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{code, DatabaseConnection, DbErr, EntityTrait};
use derive_more::{Display, Error, From};
use serde_json::Value;

use super::{CodeDetails, CodePath};
use crate::{origin::RequestBase, schema::example_error};

/// Errors that may occur during the code details request.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum CodeDetailsError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Stored style settings are malformed.
    SettingsError(serde_json::Error),

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,
}

/// Generate OAPI documentation for the [`details`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get code details.")
        .response_with::<200, Json<CodeDetails>, _>(|op| {
            op.description("Code details response.")
        })
        .response_with::<404, Json<Value>, _>(|op| {
            op.description("Code not found.")
                .example(example_error(CodeDetailsError::CodeNotFound))
        })
}

/// Code details request handler.
pub(super) async fn details(
    Path(path): Path<CodePath>,
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<CodeDetails>, CodeDetailsError> {
    let model = code::Entity::find_by_id(path.id)
        .one(&*db)
        .await?
        .ok_or(CodeDetailsError::CodeNotFound)?;

    Ok(Json(CodeDetails::from_model(model, &base)?))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database, ResponseBodyExt};

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn successful() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        let response = app(db)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/codes/{}", model.id))
                    .header("Host", "codes.example.com")
                    .header("X-Forwarded-Proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "id": model.id.clone(),
            "slug": "menu",
            "name": "Test code",
            "description": validators::null(),
            "target_url": "https://a.com",
            "tracking_enabled": true,
            "settings": {},
            "total_scans": 0,
            "unique_scans": 0,
            "total_edits": 0,
            "creator_id": validators::null(),
            "payload": format!("https://codes.example.com/scan/{}", model.id),
            "created_at": model.created_at.assume_utc().unix_timestamp(),
            "updated_at": model.updated_at.assume_utc().unix_timestamp(),
        });
    }

    #[tokio::test]
    async fn not_found() {
        let db = create_database().await;

        let response = app(db)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/codes/{}", common::id::mint()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
