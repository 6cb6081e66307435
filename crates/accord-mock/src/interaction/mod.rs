//! Interaction registry for the mock provider.
//!
//! This module provides:
//! - `Interaction`: one expected request, the response to return and its fulfillment state
//! - `InteractionRegistry`: the ordered, lock-guarded store the listener matches against
//! - `InteractionBuilder`: the `given` / `upon_receiving` / `with_request` /
//!   `will_respond_with` chain used by tests
//!
//! ## Module Structure
//!
//! - `types`: interaction, request and response definitions plus validation
//! - `matching`: literal request matching
//! - `registry`: the registry and its state transitions
//! - `builder`: the fluent registration chain

mod builder;
mod matching;
mod registry;
mod types;

#[cfg(test)]
mod tests;

pub use builder::InteractionBuilder;
pub use matching::{request_matches, IncomingRequest};
pub use registry::InteractionRegistry;
pub use types::{
    is_json_content_type, ConfiguredResponse, ExpectedRequest, Interaction, InteractionDefinition,
    InteractionState,
};
