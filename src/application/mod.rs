//! Application layer - services wiring ports to the domain.

mod tracker;

pub use tracker::ContextTracker;
