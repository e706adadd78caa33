//! Coach HTTP adapter: DTOs, handlers, and routes.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, SendMessageRequest, SessionView, TurnView};
pub use handlers::{CoachApiError, CoachAppState};
pub use routes::{coach_router, coach_routes};
