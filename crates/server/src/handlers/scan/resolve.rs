use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{
        header::{CACHE_CONTROL, LOCATION},
        HeaderName, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use db::{
    code, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    SelectExt,
};
use derive_more::{Display, Error, From};
use tracing::{debug, error};

use super::page;

/// Errors that may occur during the scan key resolution.
///
/// Scanning devices are browsers, thus errors are rendered as HTML pages.
#[derive(Debug, Display, From, Error)]
pub(super) enum ResolveError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Stored target URL cannot be used as a header value.
    #[display(fmt = "invalid target URL")]
    InvalidTarget,

    /// No code matches the provided key.
    #[display(fmt = "code not found")]
    CodeNotFound,
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = match &self {
            ResolveError::CodeNotFound => return not_found(),
            ResolveError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ResolveError::InvalidTarget => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!(error = %self, "unable to resolve scan key");

        (status, no_store(), Html(page::UNAVAILABLE_PAGE)).into_response()
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, no_store(), Html(page::INVALID_PAGE)).into_response()
}

fn no_store() -> [(HeaderName, HeaderValue); 1] {
    [(CACHE_CONTROL, HeaderValue::from_static("no-store"))]
}

/// Scan key resolution handler.
///
/// Keys that look like identifiers are resolved to the attribution page,
/// which records the scan before navigating to the target URL.
/// All other keys are treated as slugs and redirected without any tracking.
pub(super) async fn resolve(
    Path(key): Path<String>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Response, ResolveError> {
    if common::id::looks_like_id(&key) {
        resolve_id(&key, &db).await
    } else {
        resolve_slug(&key, &db).await
    }
}

async fn resolve_id(key: &str, db: &DatabaseConnection) -> Result<Response, ResolveError> {
    let Some(id) = common::id::parse_minted(key) else {
        debug!(key, "non-canonical code identifier");
        return Err(ResolveError::CodeNotFound);
    };

    let exists = code::Entity::find_by_id(key.to_owned())
        .select_only()
        .exists(db)
        .await?;

    if !exists {
        return Err(ResolveError::CodeNotFound);
    }

    Ok((no_store(), Html(page::attribution(&id))).into_response())
}

async fn resolve_slug(slug: &str, db: &DatabaseConnection) -> Result<Response, ResolveError> {
    let target_url = code::Entity::find()
        .select_only()
        .column(code::Column::TargetUrl)
        .filter(code::Column::Slug.eq(slug))
        .into_tuple::<String>()
        .one(db)
        .await?
        .ok_or(ResolveError::CodeNotFound)?;

    let location =
        HeaderValue::from_str(&target_url).map_err(|_| ResolveError::InvalidTarget)?;

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_code, create_database, ResponseBodyExt};

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn request(key: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(format!("/scan/{key}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn slug_redirects_without_tracking() {
        let db = create_database().await;
        create_code(&db, Some("menu"), "https://a.com/menu", false).await;

        let response = app(db).oneshot(request("menu")).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://a.com/menu");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn id_serves_attribution_page() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        let response = app(db).oneshot(request(&model.id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let page = response.text().await;

        assert!(page.contains(&format!(r#"data-code-id="{}""#, model.id)));
        assert!(!page.contains("https://a.com"));
    }

    #[tokio::test]
    async fn unknown_keys() {
        let db = create_database().await;
        let model = create_code(&db, Some("menu"), "https://a.com", true).await;

        for key in [
            String::from("missing"),
            common::id::mint().to_string(),
            model.id.to_uppercase(),
            model.id.replace('-', ""),
        ] {
            let response = app(db.clone()).oneshot(request(&key)).await.unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{key}");
            assert!(response.headers().get(header::LOCATION).is_none());
            assert!(response.text().await.contains("Invalid code"));
        }
    }
}
