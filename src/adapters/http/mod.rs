//! HTTP adapters - REST API implementations.

pub mod coach;

// Re-export key types for convenience
pub use coach::{coach_router, CoachAppState};
