//! Contract recording and persistence.
//!
//! The recorder keeps every interaction that was fulfilled during the
//! session. At teardown it is rendered as a pact v2 document and written to
//! `<pact_dir>/<consumer>-<provider>.json`, replacing the previous run's file.
//!
//! # Module Structure
//!
//! - `types` - Contract document layout
//! - `recorder` - Fulfilled interaction accumulation
//! - `writer` - Atomic file persistence

mod recorder;
mod types;
mod writer;

pub use recorder::ContractRecorder;
pub use types::{
    ContractDocument, ContractInteraction, ContractMetadata, ContractRequest, ContractResponse,
    PactSpecification, Pacticipant,
};
pub use writer::{read_contract, write_contract};
