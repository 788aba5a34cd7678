/// HTML pages served to scanning devices.
mod page;

/// Scan key resolution route.
mod resolve;

/// Scan tracking route.
mod track;

use std::sync::Arc;

use aide::axum::{routing::post_with, ApiRouter};
use axum::routing::get;
use db::DatabaseConnection;

/// Path of the scan tracking route, which is called by the attribution page.
pub(crate) const TRACK_PATH: &str = "/track-scan";

/// Create an [`ApiRouter`] that provides routes used by scanning devices.
///
/// Scan key resolution returns HTML pages and redirects,
/// thus it is not included into the API documentation.
pub(crate) fn routes() -> ApiRouter<Arc<DatabaseConnection>> {
    ApiRouter::new()
        .route("/scan/:key", get(resolve::resolve))
        .api_route(TRACK_PATH, post_with(track::track, track::docs))
        .with_path_items(|op| op.tag("Scans"))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_database, RequestBodyExt, ResponseBodyExt};

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Host", "localhost:3000")
            .header("Content-Type", "application/json");

        let body = match body {
            Some(body) => Body::from_json(body),
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_owned());

        match location {
            Some(location) => (status, location),
            None => (status, response.text().await),
        }
    }

    #[tokio::test]
    async fn printed_code_follows_edits_until_deleted() {
        let db = create_database().await;
        let id = common::id::mint().to_string();

        let (status, body) = call(
            app(db.clone()),
            "POST",
            "/codes",
            Some(json!({
                "id": id,
                "name": "Menu",
                "target_url": "https://a.com",
                "slug": "menu",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);

        let printed: Value = serde_json::from_str(&body).unwrap();
        let printed = printed["payload"].as_str().unwrap().to_owned();

        assert_eq!(printed, format!("http://192.168.1.50:3000/scan/{id}"));

        let (status, _) = call(
            app(db.clone()),
            "PATCH",
            &format!("/codes/{id}"),
            Some(json!({ "target_url": "https://b.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(app(db.clone()), "GET", &format!("/codes/{id}/payload"), None).await;
        let payload: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(payload["payload"], printed);

        let (status, location) = call(app(db.clone()), "GET", "/scan/menu", None).await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location, "https://b.com");

        let (_, body) = call(
            app(db.clone()),
            "POST",
            "/track-scan",
            Some(json!({ "qr_id": id, "fingerprint": "device-a" })),
        )
        .await;
        let tracked: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(tracked["link"], "https://b.com");

        let (status, _) = call(app(db.clone()), "DELETE", &format!("/codes/{id}"), None).await;

        assert_eq!(status, StatusCode::OK);

        for uri in [String::from("/scan/menu"), format!("/scan/{id}")] {
            let (status, body) = call(app(db.clone()), "GET", &uri, None).await;

            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.contains("Invalid code"));
        }

        let (status, _) = call(
            app(db),
            "POST",
            "/track-scan",
            Some(json!({ "qr_id": id, "fingerprint": "device-a" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
