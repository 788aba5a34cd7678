use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use common::style::{StyleConfig, StyleUpdateError};
use db::{
    code, sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::{CodeDetails, CodePath};
use crate::{origin::RequestBase, schema::example_error, validation::ValidatedJson};

/// Errors that may occur during the style update.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum SettingsUpdateError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Stored style settings are malformed.
    SettingsError(serde_json::Error),

    /// Provided path or value does not match the style schema.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    InvalidStyle(StyleUpdateError),

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,
}

/// JSON request body.
#[derive(Deserialize, Validate, JsonSchema)]
pub(super) struct SettingsUpdateRequest {
    /// Dotted path of the style field to replace.
    #[validate(length(min = 1, max = 255))]
    #[schemars(example = "crate::schema::example_style_path")]
    path: String,

    /// New field value.
    #[schemars(example = "crate::schema::example_style_value")]
    value: Value,
}

/// Generate OAPI documentation for the [`settings`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Replace a single style field.")
        .description("Fields other than the one at the provided path are left untouched.")
        .response_with::<200, Json<CodeDetails>, _>(|op| {
            op.description("Updated code details.")
        })
        .response_with::<404, Json<Value>, _>(|op| {
            op.description("Code not found.")
                .example(example_error(SettingsUpdateError::CodeNotFound))
        })
}

/// Code style update handler.
pub(super) async fn settings(
    Path(path): Path<CodePath>,
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<SettingsUpdateRequest>,
) -> Result<Json<CodeDetails>, SettingsUpdateError> {
    let model = db
        .transaction(|txn| {
            Box::pin(async move {
                let model = code::Entity::find_by_id(path.id)
                    .one(txn)
                    .await?
                    .ok_or(SettingsUpdateError::CodeNotFound)?;

                let current: StyleConfig = serde_json::from_str(&model.settings)?;
                let updated = current.with_value(&request.path, request.value)?;

                if updated == current {
                    return Ok(model);
                }

                code::Entity::update_many()
                    .col_expr(
                        code::Column::Settings,
                        Expr::value(serde_json::to_string(&updated)?),
                    )
                    .col_expr(
                        code::Column::TotalEdits,
                        db::increment(code::Column::TotalEdits, 1),
                    )
                    .col_expr(
                        code::Column::UpdatedAt,
                        Expr::value(db::current_timestamp()),
                    )
                    .filter(code::Column::Id.eq(model.id.as_str()))
                    .exec(txn)
                    .await?;

                code::Entity::find_by_id(model.id)
                    .one(txn)
                    .await?
                    .ok_or(SettingsUpdateError::CodeNotFound)
            })
        })
        .await
        .into_raw_result()?;

    Ok(Json(CodeDetails::from_model(model, &base)?))
}
