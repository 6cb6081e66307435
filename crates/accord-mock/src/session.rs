//! MockProviderSession - the owned resource a test suite shares.
//!
//! A session binds one listener, hands out serialized test cases, and on
//! release writes the contract document and diagnostics log exactly once.
//! Release is either an explicit [`MockProviderSession::finish`] or `Drop`,
//! so the contract is written even when a test case panics.

use crate::config::PactConfig;
use crate::contract::{write_contract, ContractRecorder};
use crate::diagnostics::MismatchRecord;
use crate::error::{RegistrationError, SessionError, VerificationError};
use crate::interaction::{Interaction, InteractionBuilder, InteractionDefinition};
use crate::server::MockProviderServer;
use crate::service::MockService;
use std::net::SocketAddr;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

pub struct MockProviderSession {
    config: PactConfig,
    service: Arc<MockService>,
    server: MockProviderServer,
    recorder: ContractRecorder,
    /// Held by the running test case
    test_lock: Mutex<()>,
    /// Mismatch count when the current test case started
    mismatch_mark: AtomicUsize,
    finished: bool,
}

impl MockProviderSession {
    /// Validate the configuration and bind the mock provider
    pub async fn start(config: PactConfig) -> Result<Self, SessionError> {
        config
            .validate()
            .map_err(|e| SessionError::InvalidConfig(format!("{e:#}")))?;

        let service = Arc::new(MockService::new(config.duplicate_policy));
        let server =
            MockProviderServer::start(&config.host, config.port, Arc::clone(&service)).await?;

        info!(
            "Mock provider for {} -> {} listening on {}",
            config.consumer,
            config.provider,
            server.local_addr()
        );

        Ok(Self {
            config,
            service,
            server,
            recorder: ContractRecorder::new(),
            test_lock: Mutex::new(()),
            mismatch_mark: AtomicUsize::new(0),
            finished: false,
        })
    }

    pub fn config(&self) -> &PactConfig {
        &self.config
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn port(&self) -> u16 {
        self.server.local_addr().port()
    }

    /// Base URI for the consumer client, e.g. `http://127.0.0.1:9222`
    pub fn base_uri(&self) -> String {
        let addr = self.server.local_addr();
        if addr.ip().is_unspecified() {
            format!("http://localhost:{}", addr.port())
        } else {
            format!("http://{addr}")
        }
    }

    /// Start a test case: waits for any running test case to finish, then
    /// clears the registry. The returned guard derefs to the session.
    pub async fn test_case(&self) -> TestCase<'_> {
        let guard = self.test_lock.lock().await;
        self.clear_interactions();
        TestCase {
            session: self,
            _guard: guard,
        }
    }

    /// Remove every registered interaction. Fulfilled ones are handed to the
    /// contract recorder first.
    pub fn clear_interactions(&self) {
        let drained = self.service.registry.drain();
        if !drained.is_empty() {
            info!("Clearing {} interactions", drained.len());
        }
        self.recorder.record(drained);
        self.mismatch_mark
            .store(self.service.diagnostics.mismatch_count(), Ordering::SeqCst);
    }

    /// Begin an interaction scoped to a provider state
    pub fn given(&self, provider_state: impl Into<String>) -> InteractionBuilder<'_> {
        InteractionBuilder::new(&self.service).given(provider_state)
    }

    /// Begin an interaction with no provider state
    pub fn upon_receiving(&self, description: impl Into<String>) -> InteractionBuilder<'_> {
        InteractionBuilder::new(&self.service).upon_receiving(description)
    }

    /// Register a serialized interaction definition
    pub fn register(&self, definition: InteractionDefinition) -> Result<(), RegistrationError> {
        match Interaction::try_from(definition) {
            Ok(interaction) => self.service.register(interaction),
            Err(e) => Err(self.service.reject(e)),
        }
    }

    /// Check the current test case: every registered interaction was
    /// invoked and no request went unmatched since the last clear.
    pub fn verify_interactions(&self) -> Result<(), VerificationError> {
        let missing: Vec<String> = self
            .service
            .registry
            .snapshot()
            .into_iter()
            .filter(|i| i.invocations == 0)
            .map(|i| i.description)
            .collect();

        let mark = self.mismatch_mark.load(Ordering::SeqCst);
        let unexpected: Vec<String> = self
            .service
            .diagnostics
            .mismatches()
            .iter()
            .skip(mark)
            .map(MismatchRecord::summary)
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(VerificationError {
                missing,
                unexpected,
            })
        }
    }

    /// Interactions registered in the current test case
    pub fn interactions(&self) -> Vec<Interaction> {
        self.service.registry.snapshot()
    }

    /// Every unmatched request of the session, oldest first
    pub fn mismatches(&self) -> Vec<MismatchRecord> {
        self.service.diagnostics.mismatches()
    }

    pub fn request_count(&self) -> u64 {
        self.service.request_count()
    }

    /// Release the session: stop the listener, write the contract and the
    /// diagnostics log. Returns the contract path. The port is free again
    /// once this returns.
    pub async fn finish(mut self) -> Result<PathBuf, SessionError> {
        self.finished = true;
        self.server.stop().await;
        self.persist()
    }

    fn persist(&self) -> Result<PathBuf, SessionError> {
        self.recorder.record(self.service.registry.drain());

        let document = self.recorder.build_document(&self.config);
        let pact_file = self.config.pact_file();
        write_contract(&pact_file, &document)?;
        self.service
            .diagnostics
            .write_log(&self.config.log_file())?;

        let unfulfilled = self.recorder.unfulfilled();
        if !unfulfilled.is_empty() {
            if self.config.strict {
                return Err(SessionError::Unfulfilled(unfulfilled));
            }
            warn!(
                "{} interactions were never invoked and were left out of the contract",
                unfulfilled.len()
            );
        }
        Ok(pact_file)
    }
}

/// Teardown without `finish`: the contract is still written, but the
/// listener is only signalled to stop and may hold the port a little longer.
impl Drop for MockProviderSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.server.shutdown();
        if let Err(e) = self.persist() {
            error!("Mock provider session teardown failed: {}", e);
        }
    }
}

/// Exclusive access to the session for one test case
pub struct TestCase<'a> {
    session: &'a MockProviderSession,
    _guard: MutexGuard<'a, ()>,
}

impl Deref for TestCase<'_> {
    type Target = MockProviderSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}
