use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    code, scan, visitor, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde_json::Value;
use tracing::info;

use super::CodePath;
use crate::schema::example_error;

/// Errors that may occur during the code deletion.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum CodeDeletionError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,
}

/// Generate OAPI documentation for the [`delete`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete a code with all of its recorded scans.")
        .description("Printed payloads of a deleted code resolve to a not found page.")
        .response_with::<200, (), _>(|op| op.description("Code was deleted."))
        .response_with::<404, Json<Value>, _>(|op| {
            op.description("Code not found.")
                .example(example_error(CodeDeletionError::CodeNotFound))
        })
}

/// Code deletion handler.
pub(super) async fn delete(
    Path(path): Path<CodePath>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<(), CodeDeletionError> {
    let id = path.id;

    db.transaction(|txn| {
        let id = id.clone();

        Box::pin(async move {
            scan::Entity::delete_many()
                .filter(scan::Column::CodeId.eq(id.as_str()))
                .exec(txn)
                .await?;

            visitor::Entity::delete_many()
                .filter(visitor::Column::CodeId.eq(id.as_str()))
                .exec(txn)
                .await?;

            let result = code::Entity::delete_by_id(id).exec(txn).await?;

            if result.rows_affected == 0 {
                return Err(CodeDeletionError::CodeNotFound);
            }

            Ok(())
        })
    })
    .await
    .into_raw_result()?;

    info!(%id, "code deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use db::{code, scan, visitor, ActiveValue, EntityTrait, PaginatorTrait};
    use tower::ServiceExt;

    fn request(id: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(format!("/codes/{id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn deletes_code_and_scans() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        scan::Entity::insert(scan::ActiveModel {
            code_id: ActiveValue::Set(model.id.clone()),
            fingerprint: ActiveValue::Set(String::from("abc")),
            device: ActiveValue::Set(scan::Device::Mobile),
            ..Default::default()
        })
        .exec_without_returning(&db)
        .await
        .expect("unable to insert scan");

        visitor::Entity::insert(visitor::ActiveModel {
            code_id: ActiveValue::Set(model.id.clone()),
            fingerprint: ActiveValue::Set(String::from("abc")),
            ..Default::default()
        })
        .exec_without_returning(&db)
        .await
        .expect("unable to insert visitor");

        let response = app(db.clone()).oneshot(request(&model.id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(code::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(scan::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(visitor::Entity::find().count(&db).await.unwrap(), 0);

        let response = app(db).oneshot(request(&model.id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
