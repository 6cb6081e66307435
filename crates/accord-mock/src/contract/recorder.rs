//! ContractRecorder - accumulates fulfilled interactions across test cases.

use super::types::{ContractDocument, ContractInteraction};
use crate::config::PactConfig;
use crate::interaction::{Interaction, InteractionState};
use parking_lot::RwLock;
use tracing::{debug, warn};

#[derive(Default)]
pub struct ContractRecorder {
    /// Fulfilled interactions in first-seen order, unique by description
    fulfilled: RwLock<Vec<Interaction>>,
    /// Descriptions registered in some test case but never fulfilled in any
    unfulfilled: RwLock<Vec<String>>,
}

impl ContractRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take in interactions drained from the registry. Fulfilled ones are
    /// kept (a later one with the same description replaces the earlier in
    /// place); never-invoked ones are only remembered by description until
    /// some later test case fulfils the same description.
    pub fn record(&self, interactions: Vec<Interaction>) {
        let mut fulfilled = self.fulfilled.write();
        let mut unfulfilled = self.unfulfilled.write();

        for interaction in interactions {
            if interaction.state != InteractionState::Fulfilled
                && fulfilled
                    .iter()
                    .any(|i| i.description == interaction.description)
            {
                debug!(
                    "Interaction '{}' not invoked this time, keeping the fulfilled one",
                    interaction.description
                );
                continue;
            }

            match interaction.state {
                InteractionState::Fulfilled => {
                    debug!("Recording interaction '{}'", interaction.description);
                    unfulfilled.retain(|d| *d != interaction.description);
                    match fulfilled
                        .iter_mut()
                        .find(|i| i.description == interaction.description)
                    {
                        Some(existing) => *existing = interaction,
                        None => fulfilled.push(interaction),
                    }
                }
                InteractionState::Unmatched | InteractionState::Registered => {
                    warn!(
                        "Interaction '{}' was never invoked and is left out of the contract",
                        interaction.description
                    );
                    if !unfulfilled.contains(&interaction.description) {
                        unfulfilled.push(interaction.description);
                    }
                }
                InteractionState::Matched => {
                    warn!(
                        "Interaction '{}' was drained while its response was in flight",
                        interaction.description
                    );
                    if !unfulfilled.contains(&interaction.description) {
                        unfulfilled.push(interaction.description);
                    }
                }
            }
        }
    }

    pub fn fulfilled(&self) -> Vec<Interaction> {
        self.fulfilled.read().clone()
    }

    pub fn unfulfilled(&self) -> Vec<String> {
        self.unfulfilled.read().clone()
    }

    /// Render the recorded interactions as a contract document
    pub fn build_document(&self, config: &PactConfig) -> ContractDocument {
        let interactions = self
            .fulfilled
            .read()
            .iter()
            .map(ContractInteraction::from)
            .collect();
        ContractDocument::new(
            config.consumer.clone(),
            config.provider.clone(),
            config.specification_version.clone(),
            interactions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{ConfiguredResponse, ExpectedRequest};

    fn interaction(description: &str, status: u16, state: InteractionState) -> Interaction {
        let mut interaction = Interaction::new(
            description,
            Some("There is data".to_string()),
            ExpectedRequest::get("/api/provider").with_query("validDateTime=05/01/2018"),
            ConfiguredResponse::new(status),
        )
        .unwrap();
        interaction.state = state;
        interaction
    }

    #[test]
    fn test_only_fulfilled_interactions_reach_document() {
        let recorder = ContractRecorder::new();
        recorder.record(vec![
            interaction("called", 200, InteractionState::Fulfilled),
            interaction("never called", 404, InteractionState::Unmatched),
        ]);

        let document = recorder.build_document(&PactConfig::new("Consumer", "Provider"));
        assert_eq!(document.interactions.len(), 1);
        assert_eq!(document.interactions[0].description, "called");
        assert_eq!(document.interactions[0].request.method, "get");
        assert_eq!(document.specification_version(), "2.0.0");
        assert_eq!(recorder.unfulfilled(), vec!["never called".to_string()]);
    }

    #[test]
    fn test_refulfilled_description_replaces_in_place() {
        let recorder = ContractRecorder::new();
        recorder.record(vec![
            interaction("first", 200, InteractionState::Fulfilled),
            interaction("second", 200, InteractionState::Fulfilled),
        ]);
        recorder.record(vec![interaction("first", 404, InteractionState::Fulfilled)]);

        let fulfilled = recorder.fulfilled();
        assert_eq!(fulfilled.len(), 2);
        assert_eq!(fulfilled[0].description, "first");
        assert_eq!(fulfilled[0].response.status, 404);
        assert_eq!(fulfilled[1].description, "second");
    }

    #[test]
    fn test_later_fulfilment_clears_unfulfilled_description() {
        let recorder = ContractRecorder::new();
        recorder.record(vec![interaction("retried", 200, InteractionState::Unmatched)]);
        assert_eq!(recorder.unfulfilled(), vec!["retried".to_string()]);

        recorder.record(vec![interaction("retried", 200, InteractionState::Fulfilled)]);
        recorder.record(vec![interaction("retried", 200, InteractionState::Unmatched)]);

        assert!(recorder.unfulfilled().is_empty());
        assert_eq!(recorder.fulfilled().len(), 1);
    }
}
