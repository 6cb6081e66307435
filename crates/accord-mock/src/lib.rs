//! Accord: a mock provider for consumer-driven contract tests.
//!
//! A [`MockProviderSession`] binds one HTTP listener for the life of a test
//! session. Each test case clears the registry, registers the interactions it
//! expects, drives the consumer client against [`MockProviderSession::base_uri`]
//! and asserts on what came back. When the session is released every
//! interaction that was actually exercised is written to a pact contract
//! document for the provider team to verify.
//!
//! ```no_run
//! use accord_mock::{ConfiguredResponse, ExpectedRequest, MockProviderSession, PactConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = MockProviderSession::start(PactConfig::new("Consumer", "Provider")).await?;
//! let case = session.test_case().await;
//! case.given("There is data")
//!     .upon_receiving("A valid GET request returns a date")
//!     .with_request(ExpectedRequest::get("/api/provider").with_query("validDateTime=05/01/2018"))?
//!     .will_respond_with(ConfiguredResponse::new(200))?;
//! drop(case);
//! session.finish().await?;
//! # Ok(())
//! # }
//! ```

// ===== Core engine =====
pub mod config;
pub mod contract;
pub mod diagnostics;
pub mod error;
pub mod interaction;
pub mod server;
pub mod service;
pub mod session;

pub use config::{DuplicatePolicy, PactConfig, DEFAULT_PORT, SPECIFICATION_VERSION};
pub use contract::{ContractDocument, ContractRecorder};
pub use diagnostics::{DiagnosticEntry, Diagnostics, MismatchRecord};
pub use error::{PersistenceError, RegistrationError, SessionError, VerificationError};
pub use interaction::{
    ConfiguredResponse, ExpectedRequest, Interaction, InteractionBuilder, InteractionDefinition,
    InteractionRegistry, InteractionState,
};
pub use service::MockService;
pub use session::{MockProviderSession, TestCase};
