//! Mock provider HTTP listener.
//!
//! - `listener`: binds the port and runs the accept loop until shutdown
//! - `handler`: matches each inbound request against the registry
//! - `response`: builds configured and mismatch responses

mod handler;
mod listener;
mod response;

pub use handler::handle_request;
pub use listener::MockProviderServer;
pub use response::{build_response_with_headers, configured_response, mismatch_response};

/// Header set on every response produced for an unmatched request
pub const MISMATCH_HEADER: &str = "x-accord-mismatch";
