//! InteractionRegistry - ordered store of expected interactions.
//!
//! All access goes through one `RwLock`, so registration, matching and
//! clearing are each a single critical section.

use super::matching::{request_matches, IncomingRequest};
use super::types::{ConfiguredResponse, Interaction, InteractionState};
use crate::config::DuplicatePolicy;
use crate::error::RegistrationError;
use parking_lot::RwLock;
use tracing::{debug, info};

pub struct InteractionRegistry {
    /// Interactions in insertion order
    interactions: RwLock<Vec<Interaction>>,
    policy: DuplicatePolicy,
}

impl InteractionRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            interactions: RwLock::new(Vec::new()),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Store a validated interaction, applying the duplicate policy
    pub fn register(&self, interaction: Interaction) -> Result<(), RegistrationError> {
        let mut interactions = self.interactions.write();

        let existing = interactions
            .iter()
            .position(|i| i.description == interaction.description);

        match (existing, self.policy) {
            (Some(_), DuplicatePolicy::Reject) => Err(RegistrationError::DuplicateDescription(
                interaction.description,
            )),
            (Some(index), DuplicatePolicy::Overwrite) => {
                info!(
                    "Replacing interaction '{}' at position {}",
                    interaction.description, index
                );
                interactions[index] = interaction;
                Ok(())
            }
            (None, _) => {
                debug!(
                    "Registered interaction '{}' for {} {}",
                    interaction.description, interaction.request.method, interaction.request.path
                );
                interactions.push(interaction);
                Ok(())
            }
        }
    }

    /// Find the first interaction matching the request, in insertion order.
    /// The selected interaction moves to `Matched` and its invocation count
    /// is incremented. Returns its description and a copy of its response.
    pub fn find_match(&self, request: &IncomingRequest) -> Option<(String, ConfiguredResponse)> {
        let mut interactions = self.interactions.write();
        let interaction = interactions
            .iter_mut()
            .find(|i| request_matches(&i.request, request))?;

        interaction.state = InteractionState::Matched;
        interaction.invocations += 1;
        Some((interaction.description.clone(), interaction.response.clone()))
    }

    /// Complete the `Matched` → `Fulfilled` transition once the response is built
    pub fn mark_fulfilled(&self, description: &str) {
        let mut interactions = self.interactions.write();
        match interactions.iter_mut().find(|i| i.description == description) {
            Some(interaction) => interaction.state = InteractionState::Fulfilled,
            None => debug!(
                "Interaction '{}' was cleared before its response completed",
                description
            ),
        }
    }

    /// Remove every interaction, returning them. Interactions that were
    /// never invoked come back as `Unmatched`.
    pub fn drain(&self) -> Vec<Interaction> {
        let mut drained = std::mem::take(&mut *self.interactions.write());
        for interaction in &mut drained {
            if interaction.state == InteractionState::Registered {
                interaction.state = InteractionState::Unmatched;
            }
        }
        drained
    }

    /// Copy of the current interactions
    pub fn snapshot(&self) -> Vec<Interaction> {
        self.interactions.read().clone()
    }

    pub fn len(&self) -> usize {
        self.interactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.read().is_empty()
    }
}

impl Default for InteractionRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}
