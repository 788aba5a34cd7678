use std::sync::Arc;

use aide::operation::OperationInput;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HOST, request::Parts, HeaderMap},
};
use axum_derive_error::ErrorResponse;
use common::origin::{Base, OriginResolver};
use derive_more::{Display, Error};

/// Header containing the protocol a client used to reach a reverse proxy.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Header containing the host a client used to reach a reverse proxy.
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Externally reachable origin of the current request.
///
/// Payloads built from this origin stay reachable from scanning devices,
/// see [`OriginResolver`] for details.
pub(crate) struct RequestBase(pub Base);

/// Errors that may occur during the request origin resolution.
#[derive(ErrorResponse, Display, Error)]
pub(crate) enum RequestBaseRejection {
    /// Router was constructed without an [`OriginResolver`] extension.
    #[display(fmt = "origin resolver is not configured")]
    MissingResolver,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestBase {
    type Rejection = RequestBaseRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolver = parts
            .extensions
            .get::<Arc<OriginResolver>>()
            .ok_or(RequestBaseRejection::MissingResolver)?;

        let protocol = header_value(&parts.headers, FORWARDED_PROTO);
        let host = header_value(&parts.headers, FORWARDED_HOST)
            .or_else(|| header_value(&parts.headers, HOST.as_str()));

        Ok(Self(resolver.resolve_forwarded(protocol, host)))
    }
}

impl OperationInput for RequestBase {}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
