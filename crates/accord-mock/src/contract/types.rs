//! Pact v2 contract document layout.

use crate::interaction::Interaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

/// Field ordering matches pact files: consumer, provider, interactions, metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDocument {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    pub interactions: Vec<ContractInteraction>,
    pub metadata: ContractMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMetadata {
    pub pact_specification: PactSpecification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PactSpecification {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInteraction {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    pub request: ContractRequest,
    pub response: ContractResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRequest {
    /// Lower case, as pact v2 writes it
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl From<&Interaction> for ContractInteraction {
    fn from(interaction: &Interaction) -> Self {
        let request = &interaction.request;
        let response = &interaction.response;
        Self {
            description: interaction.description.clone(),
            provider_state: interaction.provider_state.clone(),
            request: ContractRequest {
                method: request.method.to_ascii_lowercase(),
                path: request.path.clone(),
                query: request.query.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            },
            response: ContractResponse {
                status: response.status,
                headers: response.headers.clone(),
                body: response.body.clone(),
            },
        }
    }
}

impl ContractDocument {
    pub fn new(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        specification_version: impl Into<String>,
        interactions: Vec<ContractInteraction>,
    ) -> Self {
        Self {
            consumer: Pacticipant {
                name: consumer.into(),
            },
            provider: Pacticipant {
                name: provider.into(),
            },
            interactions,
            metadata: ContractMetadata {
                pact_specification: PactSpecification {
                    version: specification_version.into(),
                },
            },
        }
    }

    pub fn specification_version(&self) -> &str {
        &self.metadata.pact_specification.version
    }

    pub fn interaction(&self, description: &str) -> Option<&ContractInteraction> {
        self.interactions
            .iter()
            .find(|i| i.description == description)
    }
}
