//! Response building for the mock provider.

use super::MISMATCH_HEADER;
use crate::diagnostics::MismatchRecord;
use crate::interaction::ConfiguredResponse;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::error;

/// Build an HTTP response with headers.
///
/// Falls back to a bare 500 if the builder rejects the status or a header.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder.body(Full::new(body.into())).unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// Copy a configured response onto an HTTP response. Headers are written
/// as registered; the body is encoded per the declared `Content-Type`.
pub fn configured_response(configured: &ConfiguredResponse) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(configured.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    build_response_with_headers(status, &configured.headers, configured.encoded_body())
}

/// 500 response describing a request that matched no interaction
pub fn mismatch_response(record: &MismatchRecord) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "message": format!("No interaction found for {}", record.summary()),
        "request": record,
    });
    build_response_with_headers(
        StatusCode::INTERNAL_SERVER_ERROR,
        [
            ("content-type", "application/json; charset=utf-8"),
            (MISMATCH_HEADER, "true"),
        ],
        body.to_string(),
    )
}
