//! Error taxonomy for the mock provider.
//!
//! Registration and persistence failures are returned to the caller.
//! Unmatched requests are not errors on the request path: they become a
//! mismatch response plus a [`crate::MismatchRecord`].

use std::path::PathBuf;
use thiserror::Error;

/// An interaction definition was rejected at registration time
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Interaction description must not be empty")]
    EmptyDescription,
    #[error("Interaction '{0}' has no expected request")]
    MissingRequest(String),
    #[error("Interaction '{0}' has no configured response")]
    MissingResponse(String),
    #[error("Interaction '{description}' has an invalid request: {reason}")]
    InvalidRequest { description: String, reason: String },
    #[error("Interaction '{description}' has an invalid response: {reason}")]
    InvalidResponse { description: String, reason: String },
    #[error("An interaction described as '{0}' is already registered")]
    DuplicateDescription(String),
}

/// The contract document or diagnostics log could not be written
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode contract document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Interactions of the current test case were not exercised as registered
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Interaction verification failed: missing [{}], unexpected [{}]",
    .missing.join(", "),
    .unexpected.join(", ")
)]
pub struct VerificationError {
    /// Descriptions of interactions that no request invoked
    pub missing: Vec<String>,
    /// `METHOD path?query` of requests that matched nothing
    pub unexpected: Vec<String>,
}

/// Session lifecycle failures
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to bind {0}: {1}")]
    Bind(String, String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Interactions registered but never invoked: {}", .0.join(", "))]
    Unfulfilled(Vec<String>),
}
