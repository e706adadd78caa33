//! Foundation module: shared value objects and domain primitives.

mod errors;
mod ids;
mod score;
mod state_machine;
mod temperature;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::SessionId;
pub use score::Score;
pub use state_machine::StateMachine;
pub use temperature::Temperature;
pub use timestamp::Timestamp;
