//! Type definitions for registered interactions.

use crate::error::RegistrationError;
use hyper::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Request / Response
// ============================================================================

/// Criteria an inbound request must satisfy to select an interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`, compared byte for byte
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Headers that must be present; names compare case-insensitively
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ExpectedRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(crate) fn validate(&self, description: &str) -> Result<(), RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidRequest {
            description: description.to_string(),
            reason,
        };

        if self.method.trim().is_empty() {
            return Err(invalid("method must not be empty".to_string()));
        }
        if hyper::Method::from_bytes(self.method.as_bytes()).is_err() {
            return Err(invalid(format!("'{}' is not a valid HTTP method", self.method)));
        }
        if !self.path.starts_with('/') {
            return Err(invalid(format!("path '{}' must start with '/'", self.path)));
        }
        if let Some(ref query) = self.query {
            if query.starts_with('?') {
                return Err(invalid(format!(
                    "query '{query}' must not include the leading '?'"
                )));
            }
        }
        for name in self.headers.keys() {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(invalid(format!("'{name}' is not a valid header name")));
            }
        }
        Ok(())
    }
}

/// Response returned when an interaction matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Structured JSON, or a string written raw unless the content type is JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ConfiguredResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encode the body the way the declared `Content-Type` asks for
    pub fn encoded_body(&self) -> Vec<u8> {
        match self.body {
            None => Vec::new(),
            Some(serde_json::Value::String(ref text))
                if !self.header("content-type").is_some_and(is_json_content_type) =>
            {
                text.clone().into_bytes()
            }
            Some(ref value) => value.to_string().into_bytes(),
        }
    }

    pub(crate) fn validate(&self, description: &str) -> Result<(), RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidResponse {
            description: description.to_string(),
            reason,
        };

        // hyper cannot send an informational status as a final response
        if !(200..=599).contains(&self.status) {
            return Err(invalid(format!("status {} is out of range", self.status)));
        }
        for (name, value) in &self.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(invalid(format!("'{name}' is not a valid header name")));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(invalid(format!("header '{name}' has an invalid value")));
            }
        }
        Ok(())
    }
}

/// `application/json`, `application/*+json`, with or without parameters
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

// ============================================================================
// Interaction
// ============================================================================

/// Lifecycle of a registered interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionState {
    Registered,
    /// A request selected it and the response is being written
    Matched,
    Fulfilled,
    /// Cleared or torn down without ever being invoked
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub description: String,
    pub provider_state: Option<String>,
    pub request: ExpectedRequest,
    pub response: ConfiguredResponse,
    pub state: InteractionState,
    /// Number of requests this interaction answered
    pub invocations: u32,
}

impl Interaction {
    /// Validate and build a registered interaction.
    /// The request method is normalized to upper case.
    pub fn new(
        description: impl Into<String>,
        provider_state: Option<String>,
        mut request: ExpectedRequest,
        response: ConfiguredResponse,
    ) -> Result<Self, RegistrationError> {
        let description = description.into();
        validate_description(&description)?;
        request.validate(&description)?;
        response.validate(&description)?;
        request.method = request.method.to_ascii_uppercase();

        Ok(Self {
            description,
            provider_state,
            request,
            response,
            state: InteractionState::Registered,
            invocations: 0,
        })
    }

    pub fn is_fulfilled(&self) -> bool {
        self.state == InteractionState::Fulfilled
    }
}

pub(crate) fn validate_description(description: &str) -> Result<(), RegistrationError> {
    if description.trim().is_empty() {
        Err(RegistrationError::EmptyDescription)
    } else {
        Ok(())
    }
}

/// Serialized interaction definition, as loaded from an interactions file.
/// Every field is optional on the wire so incomplete definitions are
/// reported as registration errors rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ExpectedRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ConfiguredResponse>,
}

impl TryFrom<InteractionDefinition> for Interaction {
    type Error = RegistrationError;

    fn try_from(definition: InteractionDefinition) -> Result<Self, Self::Error> {
        let description = definition.description.unwrap_or_default();
        validate_description(&description)?;
        let request = definition
            .request
            .ok_or_else(|| RegistrationError::MissingRequest(description.clone()))?;
        let response = definition
            .response
            .ok_or_else(|| RegistrationError::MissingResponse(description.clone()))?;
        Interaction::new(description, definition.provider_state, request, response)
    }
}
