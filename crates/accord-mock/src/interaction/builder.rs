//! Fluent registration chain: `given` → `upon_receiving` → `with_request` →
//! `will_respond_with`.
//!
//! Validation happens as soon as the data is attached, never at match time.

use super::types::{validate_description, ConfiguredResponse, ExpectedRequest, Interaction};
use crate::error::RegistrationError;
use crate::service::MockService;

#[must_use = "an interaction is only registered by `will_respond_with`"]
pub struct InteractionBuilder<'a> {
    service: &'a MockService,
    provider_state: Option<String>,
    description: Option<String>,
    request: Option<ExpectedRequest>,
}

impl<'a> InteractionBuilder<'a> {
    pub(crate) fn new(service: &'a MockService) -> Self {
        Self {
            service,
            provider_state: None,
            description: None,
            request: None,
        }
    }

    /// Provider state this interaction assumes
    pub fn given(mut self, provider_state: impl Into<String>) -> Self {
        self.provider_state = Some(provider_state.into());
        self
    }

    /// Human-readable name, unique within the test case
    pub fn upon_receiving(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the request criteria. Fails on an empty description or a
    /// malformed request.
    pub fn with_request(mut self, request: ExpectedRequest) -> Result<Self, RegistrationError> {
        let description = self.description.as_deref().unwrap_or("");
        if let Err(e) =
            validate_description(description).and_then(|_| request.validate(description))
        {
            return Err(self.service.reject(e));
        }
        self.request = Some(request);
        Ok(self)
    }

    /// Attach the response and store the interaction
    pub fn will_respond_with(self, response: ConfiguredResponse) -> Result<(), RegistrationError> {
        let description = self.description.unwrap_or_default();
        let interaction = match self.request {
            Some(request) => Interaction::new(description, self.provider_state, request, response),
            None if description.trim().is_empty() => Err(RegistrationError::EmptyDescription),
            None => Err(RegistrationError::MissingRequest(description)),
        };

        match interaction {
            Ok(interaction) => self.service.register(interaction),
            Err(e) => Err(self.service.reject(e)),
        }
    }
}
