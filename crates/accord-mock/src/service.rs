//! State shared between the session that registers interactions and the
//! listener that serves them.

use crate::config::DuplicatePolicy;
use crate::diagnostics::Diagnostics;
use crate::error::RegistrationError;
use crate::interaction::{Interaction, InteractionRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

pub struct MockService {
    pub registry: InteractionRegistry,
    pub diagnostics: Diagnostics,
    /// Requests received over the life of the service
    request_count: AtomicU64,
}

impl MockService {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            registry: InteractionRegistry::new(policy),
            diagnostics: Diagnostics::new(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Register an interaction, recording any rejection in diagnostics
    pub fn register(&self, interaction: Interaction) -> Result<(), RegistrationError> {
        self.registry
            .register(interaction)
            .map_err(|e| self.reject(e))
    }

    /// Log and record a registration failure, handing it back to the caller
    pub fn reject(&self, error: RegistrationError) -> RegistrationError {
        warn!("Registration rejected: {}", error);
        self.diagnostics.record_registration_error(&error);
        error
    }

    pub fn increment_request_count(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}
