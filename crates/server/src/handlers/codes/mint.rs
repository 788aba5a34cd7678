use aide::transform::TransformOperation;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

use crate::origin::RequestBase;

/// JSON response body.
#[derive(Serialize, JsonSchema)]
pub(super) struct MintResponse {
    /// Freshly minted code identifier.
    #[schemars(example = "crate::schema::example_code_id")]
    id: String,

    /// Payload to embed into the printed code.
    #[schemars(example = "crate::schema::example_payload")]
    payload: String,
}

/// Generate OAPI documentation for the [`mint`] handler.
pub(super) fn docs(op: TransformOperation) -> TransformOperation {
    op.summary("Mint a new code identifier.")
        .description(
            "Nothing is persisted. The identifier can be used to create a code, \
            while the payload can be rendered before the code exists.",
        )
        .response_with::<200, Json<MintResponse>, _>(|op| {
            op.description("Minted identifier with its payload.")
        })
}

/// Identifier minting handler.
pub(super) async fn mint(RequestBase(base): RequestBase) -> Json<MintResponse> {
    let id = common::id::mint().to_string();

    Json(MintResponse {
        payload: base.payload(&id),
        id,
    })
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, create_database, ResponseBodyExt};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn loopback_host_is_replaced() {
        let db = create_database().await;

        let response = app(db)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/codes/mint")
                    .header("Host", "localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;
        let id = body["id"].as_str().expect("id is missing");

        assert!(common::id::parse_minted(id).is_some());
        assert_eq!(
            body["payload"],
            format!("http://192.168.1.50:3000/scan/{id}")
        );
    }

    #[tokio::test]
    async fn missing_host_uses_fallback() {
        let db = create_database().await;

        let response = app(db)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/codes/mint")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = response.json().await;
        let id = body["id"].as_str().expect("id is missing");

        assert_eq!(
            body["payload"],
            format!("http://localhost:3000/scan/{id}")
        );
    }
}
