use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    code, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use derive_more::{Display, Error, From};
use futures_util::TryStreamExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{origin::RequestBase, pagination::Pagination};

/// Short information about a single code.
#[derive(Serialize, JsonSchema)]
pub struct CodeSummary {
    /// Code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    pub id: String,

    /// Public slug.
    #[schemars(example = "crate::schema::example_slug")]
    pub slug: Option<String>,

    /// Code name.
    #[schemars(example = "crate::schema::example_name")]
    pub name: String,

    /// Current redirect destination.
    #[schemars(example = "crate::schema::example_target_url")]
    pub target_url: String,

    /// Whether scans are recorded.
    pub tracking_enabled: bool,

    /// Count of recorded scans.
    #[schemars(example = "crate::schema::example_count")]
    pub total_scans: i64,

    /// Estimated count of distinct scanning devices.
    #[schemars(example = "crate::schema::example_count")]
    pub unique_scans: i64,

    /// Payload to embed into the printed code.
    #[schemars(example = "crate::schema::example_payload")]
    pub payload: String,

    /// Code creation time.
    #[schemars(example = "crate::schema::example_timestamp")]
    pub created_at: i64,
}

/// Code list filter query string.
#[derive(Deserialize, JsonSchema)]
pub(super) struct CodeListFilter {
    /// Return codes of the provided creator only.
    #[schemars(example = "crate::schema::example_creator_id")]
    creator_id: Option<String>,
}

/// Errors that may occur during the list request.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum CodeListError {
    /// Database-related error.
    DatabaseError(DbErr),
}

/// Generate OAPI documentation for the [`list`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get list of codes, newest first.")
        .response_with::<200, Json<Vec<CodeSummary>>, _>(|op| {
            op.description("Code list response.")
        })
}

/// List codes, optionally filtered by creator.
pub(super) async fn list(
    RequestBase(base): RequestBase,
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<CodeListFilter>,
) -> Result<Json<Vec<CodeSummary>>, CodeListError> {
    let mut query = code::Entity::find();

    if let Some(creator_id) = filter.creator_id {
        query = query.filter(code::Column::CreatorId.eq(creator_id));
    }

    query
        .limit(pagination.limit())
        .offset(pagination.offset())
        .order_by_desc(code::Column::CreatedAt)
        .order_by_desc(code::Column::Id)
        .stream(&*db)
        .await?
        .err_into()
        .map_ok(|model| CodeSummary {
            payload: base.payload(&model.id),
            id: model.id,
            slug: model.slug,
            name: model.name,
            target_url: model.target_url,
            tracking_enabled: model.tracking_enabled,
            total_scans: model.total_scans,
            unique_scans: model.unique_scans,
            created_at: model.created_at.assume_utc().unix_timestamp(),
        })
        .try_collect()
        .await
        .map(Json)
}
