//! Configuration for a mock provider session.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The only contract schema version written by this crate
pub const SPECIFICATION_VERSION: &str = "2.0.0";

/// Port the mock provider listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 9222;

/// What happens when a description is registered twice in one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Fail the second registration with `DuplicateDescription`
    #[default]
    Reject,
    /// Replace the earlier interaction, keeping its position
    Overwrite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PactConfig {
    pub consumer: String,
    pub provider: String,
    #[serde(default = "default_specification_version")]
    pub specification_version: String,
    /// Directory the contract document is written to
    #[serde(default = "default_pact_dir")]
    pub pact_dir: PathBuf,
    /// Directory for the per-run mock server log
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    /// 0 lets the OS pick a free port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Fail teardown when a registered interaction was never invoked
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_specification_version() -> String {
    SPECIFICATION_VERSION.to_string()
}

fn default_pact_dir() -> PathBuf {
    PathBuf::from("pacts")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("pact_logs")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl PactConfig {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            specification_version: default_specification_version(),
            pact_dir: default_pact_dir(),
            log_dir: default_log_dir(),
            host: default_host(),
            port: default_port(),
            strict: false,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PactConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.consumer.trim().is_empty() {
            anyhow::bail!("Consumer name must not be empty");
        }
        if self.provider.trim().is_empty() {
            anyhow::bail!("Provider name must not be empty");
        }
        if self.specification_version != SPECIFICATION_VERSION {
            anyhow::bail!(
                "Unsupported specification version: '{}'. Currently supported: {}",
                self.specification_version,
                SPECIFICATION_VERSION
            );
        }
        if self.host.is_empty() {
            anyhow::bail!("Listener host must not be empty");
        }
        Ok(())
    }

    pub fn with_pact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pact_dir = dir.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// `<consumer>-<provider>` lowercased, whitespace replaced by `_`
    pub fn pair_name(&self) -> String {
        format!("{}-{}", file_safe(&self.consumer), file_safe(&self.provider))
    }

    /// Path of the contract document for this consumer–provider pair
    pub fn pact_file(&self) -> PathBuf {
        self.pact_dir.join(format!("{}.json", self.pair_name()))
    }

    /// Path of the per-run mock server log
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(format!("{}-mock-server.log", self.pair_name()))
    }
}

fn file_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}
