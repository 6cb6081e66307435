//! Contract document persistence.

use super::types::ContractDocument;
use crate::error::PersistenceError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write the document to `path`, replacing any previous contract.
/// The file is written to a sibling temporary path first and renamed into
/// place, so readers never see a partial document.
pub fn write_contract(path: &Path, document: &ContractDocument) -> Result<(), PersistenceError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(document)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, json).map_err(|source| PersistenceError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Saved contract with {} interactions to {:?}",
        document.interactions.len(),
        path
    );
    Ok(())
}

/// Load a previously written contract document
pub fn read_contract(path: &Path) -> Result<ContractDocument, PersistenceError> {
    let json = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
