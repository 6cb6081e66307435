//! Literal request matching.
//!
//! Method compares case-insensitively, path and query compare byte for byte.
//! The query string is never parsed: parameter order and percent-encoding
//! must be exactly what was registered.

use super::types::ExpectedRequest;
use serde::Serialize;
use std::collections::BTreeMap;

/// The parts of an inbound request the registry matches on
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    pub method: String,
    pub path: String,
    /// Raw query string, empty when the URI has none
    pub query: String,
    /// Header names are lower case
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `METHOD /path?query`, used in logs and mismatch reports
    pub fn summary(&self) -> String {
        if self.query.is_empty() {
            format!("{} {}", self.method, self.path)
        } else {
            format!("{} {}?{}", self.method, self.path, self.query)
        }
    }
}

/// Check whether an inbound request satisfies an expected request
pub fn request_matches(expected: &ExpectedRequest, actual: &IncomingRequest) -> bool {
    if !expected.method.eq_ignore_ascii_case(&actual.method) {
        return false;
    }
    if expected.path != actual.path {
        return false;
    }
    if expected.query.as_deref().unwrap_or("") != actual.query {
        return false;
    }
    if !headers_match(&expected.headers, &actual.headers) {
        return false;
    }
    match expected.body {
        Some(ref body) => body_matches(body, actual.body.as_deref()),
        None => true,
    }
}

fn headers_match(expected: &BTreeMap<String, String>, actual: &BTreeMap<String, String>) -> bool {
    expected.iter().all(|(name, value)| {
        actual
            .get(&name.to_ascii_lowercase())
            .is_some_and(|actual_value| actual_value == value)
    })
}

fn body_matches(expected: &serde_json::Value, actual: Option<&str>) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(actual) {
        if &parsed == expected {
            return true;
        }
    }

    match expected {
        serde_json::Value::String(text) => text == actual,
        _ => false,
    }
}
