//! Request handling for the mock provider.

use super::response::{configured_response, mismatch_response};
use crate::diagnostics::MismatchRecord;
use crate::interaction::IncomingRequest;
use crate::service::MockService;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::HeaderMap;
use hyper::{Request, Response};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle a request to the mock provider.
/// Never fails: an unmatched request gets the mismatch response.
pub async fn handle_request(
    req: Request<Incoming>,
    service: Arc<MockService>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    service.increment_request_count();

    let (parts, body) = req.into_parts();
    let headers = collect_headers(&parts.headers);

    let body = match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).to_string())
            }
        }
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            None
        }
    };

    let incoming = IncomingRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().unwrap_or("").to_string(),
        headers,
        body,
    };

    Ok(respond(&service, &incoming))
}

/// Header names are lowercase. Repeated headers are joined with `", "` and
/// non-UTF-8 values are kept lossily.
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}

/// Match an extracted request and produce the response for it
pub(crate) fn respond(service: &MockService, incoming: &IncomingRequest) -> Response<Full<Bytes>> {
    match service.registry.find_match(incoming) {
        Some((description, configured)) => {
            debug!(
                "{} matched interaction '{}'",
                incoming.summary(),
                description
            );
            let response = configured_response(&configured);
            service.registry.mark_fulfilled(&description);
            response
        }
        None => {
            warn!("No interaction found for {}", incoming.summary());
            let record = MismatchRecord::from_request(incoming);
            let response = mismatch_response(&record);
            service.diagnostics.record_mismatch(record);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{ConfiguredResponse, ExpectedRequest, Interaction, InteractionState};
    use crate::server::MISMATCH_HEADER;
    use hyper::header::HeaderValue;
    use serde_json::json;

    fn service_with(interaction: Interaction) -> MockService {
        let service = MockService::default();
        service.register(interaction).unwrap();
        service
    }

    #[test]
    fn test_respond_fulfills_matching_interaction() {
        let service = service_with(
            Interaction::new(
                "A valid GET request without data",
                Some("There is no data".to_string()),
                ExpectedRequest::get("/api/provider").with_query("validDateTime=05/01/2018"),
                ConfiguredResponse::new(404),
            )
            .unwrap(),
        );

        let request =
            IncomingRequest::new("GET", "/api/provider").with_query("validDateTime=05/01/2018");
        let response = respond(&service, &request);

        assert_eq!(response.status(), 404);
        let stored = service.registry.snapshot();
        assert_eq!(stored[0].state, InteractionState::Fulfilled);
        assert_eq!(stored[0].invocations, 1);
        assert_eq!(service.diagnostics.mismatch_count(), 0);
    }

    #[test]
    fn test_respond_records_mismatch() {
        let service = service_with(
            Interaction::new(
                "A invalid GET request for Date Validation with invalid date parameter",
                Some("There is data".to_string()),
                ExpectedRequest::get("/api/provider").with_query("validDateTime=lolz"),
                ConfiguredResponse::new(400).with_body(json!({"message": "nope"})),
            )
            .unwrap(),
        );

        let request = IncomingRequest::new("GET", "/api/provider").with_query("validDateTime=");
        let response = respond(&service, &request);

        assert_eq!(response.status(), 500);
        assert_eq!(response.headers()[MISMATCH_HEADER], "true");
        assert_eq!(service.diagnostics.mismatch_count(), 1);
        assert_eq!(
            service.registry.snapshot()[0].state,
            InteractionState::Registered
        );
    }

    #[test]
    fn test_collect_headers_keeps_repeated_and_non_utf8_values() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("x-raw", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let collected = collect_headers(&headers);

        assert_eq!(collected["accept"], "application/json, text/plain");
        assert_eq!(collected["x-raw"], "caf\u{fffd}");
        assert_eq!(collected.len(), 2);
    }
}
