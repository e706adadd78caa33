//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Session store implementations
//! - `http` - REST API exposure

pub mod http;
pub mod storage;

pub use http::{coach_router, CoachAppState};
pub use storage::InMemorySessionStore;
