//! Tests for the interaction module.
//!
//! This module covers:
//! - Registration validation (builder chain and serialized definitions)
//! - Duplicate description policies
//! - Registry state transitions and clearing

use super::*;
use crate::config::DuplicatePolicy;
use crate::error::RegistrationError;
use crate::service::MockService;
use serde_json::json;

fn provider_request(query: &str) -> ExpectedRequest {
    ExpectedRequest::get("/api/provider").with_query(query)
}

fn json_response(status: u16, body: serde_json::Value) -> ConfiguredResponse {
    ConfiguredResponse::new(status)
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_body(body)
}

#[test]
fn test_builder_registers_interaction() {
    let service = MockService::default();
    InteractionBuilder::new(&service)
        .given("There is data")
        .upon_receiving("A invalid GET request for Date Validation with invalid date parameter")
        .with_request(provider_request("validDateTime=lolz"))
        .unwrap()
        .will_respond_with(json_response(
            400,
            json!({"message": "validDateTime is not a date or time"}),
        ))
        .unwrap();

    let stored = service.registry.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].provider_state.as_deref(), Some("There is data"));
    assert_eq!(stored[0].request.query.as_deref(), Some("validDateTime=lolz"));
    assert_eq!(stored[0].state, InteractionState::Registered);
    assert_eq!(stored[0].invocations, 0);
}

#[test]
fn test_builder_normalizes_method() {
    let service = MockService::default();
    InteractionBuilder::new(&service)
        .upon_receiving("lower case method")
        .with_request(ExpectedRequest::new("get", "/api/provider"))
        .unwrap()
        .will_respond_with(ConfiguredResponse::new(200))
        .unwrap();
    assert_eq!(service.registry.snapshot()[0].request.method, "GET");
}

#[test]
fn test_empty_description_fails_at_with_request() {
    let service = MockService::default();
    let result = InteractionBuilder::new(&service)
        .given("There is data")
        .upon_receiving("   ")
        .with_request(provider_request("validDateTime=lolz"));

    assert!(matches!(result, Err(RegistrationError::EmptyDescription)));
    assert!(service.registry.is_empty());
    assert_eq!(service.diagnostics.entries().len(), 1);
}

#[test]
fn test_missing_description_fails() {
    let service = MockService::default();
    let result = InteractionBuilder::new(&service)
        .given("There is data")
        .with_request(provider_request("validDateTime="));
    assert!(matches!(result, Err(RegistrationError::EmptyDescription)));
}

#[test]
fn test_missing_request_fails_at_will_respond_with() {
    let service = MockService::default();
    let err = InteractionBuilder::new(&service)
        .upon_receiving("no request attached")
        .will_respond_with(ConfiguredResponse::new(200))
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::MissingRequest("no request attached".to_string())
    );
    assert!(service.registry.is_empty());
}

#[test]
fn test_malformed_request_fails_fast() {
    let service = MockService::default();

    let no_slash = InteractionBuilder::new(&service)
        .upon_receiving("relative path")
        .with_request(ExpectedRequest::get("api/provider"));
    assert!(matches!(
        no_slash,
        Err(RegistrationError::InvalidRequest { .. })
    ));

    let question_mark = InteractionBuilder::new(&service)
        .upon_receiving("query with question mark")
        .with_request(provider_request("?validDateTime=lolz"));
    assert!(matches!(
        question_mark,
        Err(RegistrationError::InvalidRequest { .. })
    ));

    let empty_method = InteractionBuilder::new(&service)
        .upon_receiving("empty method")
        .with_request(ExpectedRequest::new("", "/api/provider"));
    assert!(matches!(
        empty_method,
        Err(RegistrationError::InvalidRequest { .. })
    ));
}

#[test]
fn test_malformed_response_fails_fast() {
    let service = MockService::default();

    let bad_status = InteractionBuilder::new(&service)
        .upon_receiving("bad status")
        .with_request(provider_request("validDateTime=lolz"))
        .unwrap()
        .will_respond_with(ConfiguredResponse::new(42));
    assert!(matches!(
        bad_status,
        Err(RegistrationError::InvalidResponse { .. })
    ));

    let informational = InteractionBuilder::new(&service)
        .upon_receiving("informational status")
        .with_request(provider_request("validDateTime=lolz"))
        .unwrap()
        .will_respond_with(ConfiguredResponse::new(103));
    assert!(matches!(
        informational,
        Err(RegistrationError::InvalidResponse { .. })
    ));

    let bad_header = InteractionBuilder::new(&service)
        .upon_receiving("bad header")
        .with_request(provider_request("validDateTime=lolz"))
        .unwrap()
        .will_respond_with(ConfiguredResponse::new(200).with_header("Bad Header", "x"));
    assert!(matches!(
        bad_header,
        Err(RegistrationError::InvalidResponse { .. })
    ));

    assert!(service.registry.is_empty());
}

#[test]
fn test_duplicate_description_rejected() {
    let service = MockService::new(DuplicatePolicy::Reject);
    let register = |status: u16| {
        InteractionBuilder::new(&service)
            .given("There is data")
            .upon_receiving("A valid GET request returns a date")
            .with_request(provider_request("validDateTime=05/01/2018"))
            .unwrap()
            .will_respond_with(ConfiguredResponse::new(status))
    };

    register(200).unwrap();
    let err = register(404).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateDescription("A valid GET request returns a date".to_string())
    );

    let stored = service.registry.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].response.status, 200);
}

#[test]
fn test_duplicate_description_overwritten_in_place() {
    let service = MockService::new(DuplicatePolicy::Overwrite);
    let register = |description: &str, status: u16| {
        InteractionBuilder::new(&service)
            .upon_receiving(description)
            .with_request(provider_request("validDateTime=05/01/2018"))
            .unwrap()
            .will_respond_with(ConfiguredResponse::new(status))
    };

    register("dup", 200).unwrap();
    register("other", 201).unwrap();
    register("dup", 404).unwrap();

    let stored = service.registry.snapshot();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].description, "dup");
    assert_eq!(stored[0].response.status, 404);
    assert_eq!(stored[1].description, "other");
}

#[test]
fn test_first_registered_match_wins() {
    let registry = InteractionRegistry::default();
    for (description, status) in [("first", 200), ("second", 201)] {
        registry
            .register(
                Interaction::new(
                    description,
                    None,
                    provider_request("validDateTime=05/01/2018"),
                    ConfiguredResponse::new(status),
                )
                .unwrap(),
            )
            .unwrap();
    }

    let request =
        IncomingRequest::new("GET", "/api/provider").with_query("validDateTime=05/01/2018");
    let (description, response) = registry.find_match(&request).unwrap();
    assert_eq!(description, "first");
    assert_eq!(response.status, 200);
}

#[test]
fn test_match_then_fulfill_transitions() {
    let registry = InteractionRegistry::default();
    registry
        .register(
            Interaction::new(
                "date",
                None,
                provider_request("validDateTime=05/01/2018"),
                ConfiguredResponse::new(200),
            )
            .unwrap(),
        )
        .unwrap();

    let request =
        IncomingRequest::new("GET", "/api/provider").with_query("validDateTime=05/01/2018");
    let (description, _) = registry.find_match(&request).unwrap();
    assert_eq!(registry.snapshot()[0].state, InteractionState::Matched);

    registry.mark_fulfilled(&description);
    assert_eq!(registry.snapshot()[0].state, InteractionState::Fulfilled);
}

#[test]
fn test_drain_empties_registry_and_marks_unmatched() {
    let registry = InteractionRegistry::default();
    for description in ["called", "not called"] {
        registry
            .register(
                Interaction::new(
                    description,
                    None,
                    ExpectedRequest::get(format!("/{}", description.replace(' ', "-"))),
                    ConfiguredResponse::new(200),
                )
                .unwrap(),
            )
            .unwrap();
    }
    let (description, _) = registry
        .find_match(&IncomingRequest::new("GET", "/called"))
        .unwrap();
    registry.mark_fulfilled(&description);

    let drained = registry.drain();
    assert!(registry.is_empty());
    assert_eq!(drained[0].state, InteractionState::Fulfilled);
    assert_eq!(drained[1].state, InteractionState::Unmatched);

    assert!(registry
        .find_match(&IncomingRequest::new("GET", "/called"))
        .is_none());
}

#[test]
fn test_definition_requires_request_and_response() {
    let no_request: InteractionDefinition = serde_json::from_value(json!({
        "description": "orphan",
        "response": {"status": 200}
    }))
    .unwrap();
    assert_eq!(
        Interaction::try_from(no_request).unwrap_err(),
        RegistrationError::MissingRequest("orphan".to_string())
    );

    let no_response: InteractionDefinition = serde_json::from_value(json!({
        "description": "silent",
        "request": {"method": "GET", "path": "/api/provider"}
    }))
    .unwrap();
    assert_eq!(
        Interaction::try_from(no_response).unwrap_err(),
        RegistrationError::MissingResponse("silent".to_string())
    );

    let no_description: InteractionDefinition = serde_json::from_value(json!({
        "request": {"method": "GET", "path": "/api/provider"},
        "response": {"status": 200}
    }))
    .unwrap();
    assert_eq!(
        Interaction::try_from(no_description).unwrap_err(),
        RegistrationError::EmptyDescription
    );
}

#[test]
fn test_definition_round_trips_into_interaction() {
    let definition: InteractionDefinition = serde_json::from_value(json!({
        "description": "An invalid GET request for Date with no date parameter",
        "providerState": "There is data",
        "request": {"method": "get", "path": "/api/provider", "query": "validDateTime="},
        "response": {
            "status": 400,
            "headers": {"Content-Type": "application/json; charset=utf-8"},
            "body": {"message": "validDateTime is required"}
        }
    }))
    .unwrap();

    let interaction = Interaction::try_from(definition).unwrap();
    assert_eq!(interaction.request.method, "GET");
    assert_eq!(interaction.request.query.as_deref(), Some("validDateTime="));
    assert_eq!(
        interaction.response.encoded_body(),
        br#"{"message":"validDateTime is required"}"#.to_vec()
    );
}

#[test]
fn test_json_content_type_detection() {
    assert!(is_json_content_type("application/json"));
    assert!(is_json_content_type("application/json; charset=utf-8"));
    assert!(is_json_content_type("application/hal+json"));
    assert!(!is_json_content_type("text/plain"));
    assert!(!is_json_content_type(""));
}
