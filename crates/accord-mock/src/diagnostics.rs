//! Per-run mock server diagnostics: unmatched requests and rejected
//! registrations, written as one JSON object per line at teardown.

use crate::error::{PersistenceError, RegistrationError};
use crate::interaction::IncomingRequest;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// An inbound request that matched no registered interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchRecord {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub timestamp: String,
}

impl MismatchRecord {
    pub fn from_request(request: &IncomingRequest) -> Self {
        Self {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// `METHOD /path?query`
    pub fn summary(&self) -> String {
        if self.query.is_empty() {
            format!("{} {}", self.method, self.path)
        } else {
            format!("{} {}?{}", self.method, self.path, self.query)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticEntry {
    Mismatch(MismatchRecord),
    RegistrationError { message: String, timestamp: String },
}

#[derive(Default)]
pub struct Diagnostics {
    entries: RwLock<Vec<DiagnosticEntry>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mismatch(&self, record: MismatchRecord) {
        self.entries.write().push(DiagnosticEntry::Mismatch(record));
    }

    pub fn record_registration_error(&self, error: &RegistrationError) {
        self.entries.write().push(DiagnosticEntry::RegistrationError {
            message: error.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.read().clone()
    }

    /// All mismatches of the run, oldest first
    pub fn mismatches(&self) -> Vec<MismatchRecord> {
        self.entries
            .read()
            .iter()
            .filter_map(|entry| match entry {
                DiagnosticEntry::Mismatch(record) => Some(record.clone()),
                DiagnosticEntry::RegistrationError { .. } => None,
            })
            .collect()
    }

    pub fn mismatch_count(&self) -> usize {
        self.entries
            .read()
            .iter()
            .filter(|entry| matches!(entry, DiagnosticEntry::Mismatch(_)))
            .count()
    }

    /// Write the log, replacing any log from a previous run
    pub fn write_log(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| PersistenceError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let entries = self.entries.read();
        let mut contents = String::new();
        for entry in entries.iter() {
            contents.push_str(&serde_json::to_string(entry)?);
            contents.push('\n');
        }

        fs::write(path, contents).map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved {} diagnostic entries to {:?}", entries.len(), path);
        Ok(())
    }
}
