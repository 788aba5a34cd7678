use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{code, DatabaseConnection, DbErr, EntityTrait, QuerySelect, SelectExt};
use derive_more::{Display, Error, From};
use schemars::JsonSchema;
use serde::Serialize;

use super::CodePath;
use crate::origin::RequestBase;

/// Errors that may occur during the payload request.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum PayloadError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,
}

/// JSON response body.
#[derive(Serialize, JsonSchema)]
pub(super) struct PayloadResponse {
    /// Payload to embed into the printed code.
    #[schemars(example = "crate::schema::example_payload")]
    payload: String,
}

/// Generate OAPI documentation for the [`payload`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get the payload to embed into a code.")
        .description("Payload is computed on each request from the request origin.")
        .response_with::<200, Json<PayloadResponse>, _>(|op| {
            op.description("Code payload response.")
        })
}

/// Code payload request handler.
pub(super) async fn payload(
    Path(path): Path<CodePath>,
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<PayloadResponse>, PayloadError> {
    let exists = code::Entity::find_by_id(path.id.clone())
        .select_only()
        .exists(&*db)
        .await?;

    if !exists {
        return Err(PayloadError::CodeNotFound);
    }

    Ok(Json(PayloadResponse {
        payload: base.payload(&path.id),
    }))
}
