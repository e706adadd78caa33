//! Conversation-engine core.
//!
//! Everything needed to run one training conversation: the phase state
//! machine, session state, fuzzy signal detection, answer scoring, gate
//! logic, question routing, and the per-turn orchestrator.

pub mod configs;
mod extractor;
mod gate;
mod generator;
mod matcher;
mod message;
mod phase;
mod router;
mod session;
mod validator;

pub use configs::{FlowConfig, FlowConfigError};
pub use extractor::{CaptureStrategy, ExtractedCapture, KeywordAnchoredExtractor};
pub use gate::{PhaseManager, PhaseRequirements};
pub use generator::{ResponseGenerator, TurnOutcome};
pub use matcher::{FuzzyMatcher, IntentMatch, ObjectionCategory, ObjectionSignal};
pub use message::{ConversationMessage, MessageRole};
pub use phase::{PhaseSequence, SalesPhase};
pub use router::{render_template, QuestionRouter};
pub use session::{PhaseAdvance, Session};
pub use validator::{AnswerValidator, Validation};
