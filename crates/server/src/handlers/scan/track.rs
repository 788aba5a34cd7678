use std::sync::Arc;

use aide::{transform::TransformOperation, OperationIo};
use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use db::{
    code, scan, sea_query::OnConflict, visitor, ActiveValue, ColumnTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QuerySelect, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::{scan_client::ScanClient, schema::example_error, validation::ValidatedJson};

/// Errors that may occur during the scan tracking.
#[derive(ErrorResponse, Display, From, Error, OperationIo)]
#[aide(output)]
pub(super) enum TrackScanError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Code with the provided identifier does not exist.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "code not found")]
    CodeNotFound,
}

/// JSON request body.
#[derive(Deserialize, Validate, JsonSchema)]
pub(super) struct TrackScanRequest {
    /// Scanned code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    qr_id: String,

    /// Opaque fingerprint of the scanning device.
    #[validate(length(min = 1, max = 256))]
    #[schemars(example = "crate::schema::example_fingerprint")]
    fingerprint: String,
}

/// JSON response body.
#[derive(Serialize, JsonSchema)]
pub(super) struct TrackScanResponse {
    /// Whether the scan was processed.
    success: bool,

    /// Target URL to navigate to.
    #[schemars(example = "crate::schema::example_target_url")]
    link: Option<String>,
}

/// Generate OAPI documentation for the [`track`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Record a code scan and get the code target URL.")
        .description(
            "Scans are recorded only if tracking is enabled for the code, \
            the target URL is returned regardless.",
        )
        .response_with::<200, Json<TrackScanResponse>, _>(|op| {
            op.description("Scan was processed.")
        })
        .response_with::<404, Json<Value>, _>(|op| {
            op.description("Code not found.")
                .example(example_error(TrackScanError::CodeNotFound))
        })
}

/// Scan tracking handler.
pub(super) async fn track(
    client: ScanClient,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<TrackScanRequest>,
) -> Result<Json<TrackScanResponse>, TrackScanError> {
    let link = db
        .transaction(|txn| {
            Box::pin(async move {
                let (tracking_enabled, target_url) =
                    code::Entity::find_by_id(request.qr_id.clone())
                        .select_only()
                        .columns([code::Column::TrackingEnabled, code::Column::TargetUrl])
                        .into_tuple::<(bool, String)>()
                        .one(txn)
                        .await?
                        .ok_or(TrackScanError::CodeNotFound)?;

                if !tracking_enabled {
                    return Ok::<_, TrackScanError>(target_url);
                }

                // Concurrent first scans race on the primary key, only one of them inserts.
                let first_visit = visitor::Entity::insert(visitor::ActiveModel {
                    code_id: ActiveValue::Set(request.qr_id.clone()),
                    fingerprint: ActiveValue::Set(request.fingerprint.clone()),
                    ..Default::default()
                })
                .on_conflict(
                    OnConflict::columns([visitor::Column::CodeId, visitor::Column::Fingerprint])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await?
                    == 1;

                scan::Entity::insert(scan::ActiveModel {
                    code_id: ActiveValue::Set(request.qr_id.clone()),
                    fingerprint: ActiveValue::Set(request.fingerprint),
                    device: ActiveValue::Set(client.device),
                    browser: ActiveValue::Set(client.browser),
                    os: ActiveValue::Set(client.os),
                    country: ActiveValue::Set(client.country),
                    ip_address: ActiveValue::Set(client.ip_address),
                    ..Default::default()
                })
                .exec_without_returning(txn)
                .await?;

                code::Entity::update_many()
                    .col_expr(
                        code::Column::TotalScans,
                        db::increment(code::Column::TotalScans, 1),
                    )
                    .col_expr(
                        code::Column::UniqueScans,
                        db::increment(code::Column::UniqueScans, i64::from(first_visit)),
                    )
                    .filter(code::Column::Id.eq(request.qr_id.as_str()))
                    .exec(txn)
                    .await?;

                debug!(code_id = %request.qr_id, unique = first_visit, "scan recorded");

                Ok(target_url)
            })
        })
        .await
        .into_raw_result()?;

    Ok(Json(TrackScanResponse {
        success: true,
        link: Some(link),
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database, RequestBodyExt, ResponseBodyExt};

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use db::{code, scan, visitor, ActiveValue, DatabaseConnection, EntityTrait, PaginatorTrait};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    async fn track(app: Router, id: &str, fingerprint: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/track-scan")
                    .header("Content-Type", "application/json")
                    .header("User-Agent", IPHONE)
                    .header("X-Forwarded-For", "203.0.113.7")
                    .header("CF-IPCountry", "NL")
                    .body(Body::from_json(json!({
                        "qr_id": id,
                        "fingerprint": fingerprint,
                    })))
                    .unwrap(),
            )
            .await
            .unwrap();

        (response.status(), response.json().await)
    }

    async fn counters(db: &DatabaseConnection, id: &str) -> (i64, i64) {
        let model = code::Entity::find_by_id(id.to_owned())
            .one(db)
            .await
            .expect("unable to find code")
            .expect("code not found");

        (model.total_scans, model.unique_scans)
    }

    #[tokio::test]
    async fn repeated_scans_are_not_unique() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;

        for fingerprint in ["device-a", "device-a", "device-b"] {
            let (status, body) = track(app(db.clone()), &model.id, fingerprint).await;

            assert_eq!(status, StatusCode::OK);
            assert_json!(body, {
                "success": true,
                "link": "https://a.com",
            });
        }

        assert_eq!(counters(&db, &model.id).await, (3, 2));

        let scans = scan::Entity::find().all(&db).await.unwrap();

        assert_eq!(scans.len(), 3);
        assert_eq!(scans[0].device, scan::Device::Mobile);
        assert_eq!(scans[0].os.as_deref(), Some("iOS"));
        assert_eq!(scans[0].country.as_deref(), Some("NL"));
        assert_eq!(scans[0].ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn visitors_decide_uniqueness() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;

        let visit = || visitor::ActiveModel {
            code_id: ActiveValue::Set(model.id.clone()),
            fingerprint: ActiveValue::Set(String::from("device-a")),
            ..Default::default()
        };

        // Visitor recorded by a concurrent scan that committed first.
        visitor::Entity::insert(visit())
            .exec_without_returning(&db)
            .await
            .expect("unable to insert visitor");

        assert!(visitor::Entity::insert(visit())
            .exec_without_returning(&db)
            .await
            .is_err());

        track(app(db.clone()), &model.id, "device-a").await;

        assert_eq!(counters(&db, &model.id).await, (1, 0));

        track(app(db.clone()), &model.id, "device-b").await;
        track(app(db.clone()), &model.id, "device-b").await;

        assert_eq!(counters(&db, &model.id).await, (3, 1));
        assert_eq!(visitor::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn disabled_tracking_returns_link_only() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", false).await;

        let (status, body) = track(app(db.clone()), &model.id, "device-a").await;

        assert_eq!(status, StatusCode::OK);
        assert_json!(body, {
            "success": true,
            "link": "https://a.com",
        });

        assert_eq!(counters(&db, &model.id).await, (0, 0));
        assert_eq!(scan::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(visitor::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn edited_target_is_used() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;

        code::Entity::update(code::ActiveModel {
            id: ActiveValue::Unchanged(model.id.clone()),
            target_url: ActiveValue::Set(String::from("https://b.com")),
            ..Default::default()
        })
        .exec(&db)
        .await
        .expect("unable to update code");

        let (_, body) = track(app(db), &model.id, "device-a").await;

        assert_eq!(body["link"], "https://b.com");
    }

    #[tokio::test]
    async fn invalid_requests() {
        let db = create_database().await;
        let model = create_code(&db, None, "https://a.com", true).await;

        let (status, _) = track(app(db.clone()), &common::id::mint().to_string(), "a").await;

        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = track(app(db.clone()), &model.id, "").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(counters(&db, &model.id).await, (0, 0));
    }
}
