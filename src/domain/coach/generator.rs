//! Turn orchestration.
//!
//! `ResponseGenerator` is the single entry point for one conversational
//! turn: it records the trainee's message, runs signal detection and
//! scoring, applies captures, evaluates the phase gate, picks the next
//! question, and assembles the outward-facing response. Well-formed
//! string input never produces an error; empty input is a zero-score
//! turn.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{Score, Temperature};

use super::configs::FlowConfig;
use super::extractor::CaptureStrategy;
use super::gate::PhaseManager;
use super::matcher::{FuzzyMatcher, ObjectionSignal};
use super::message::MessageRole;
use super::phase::SalesPhase;
use super::router::QuestionRouter;
use super::session::{PhaseAdvance, Session};
use super::validator::AnswerValidator;

/// Temperature shift when the trainee signals readiness.
const READY_WARMTH: f64 = 0.1;
/// Temperature shift per detected objection.
const OBJECTION_CHILL: f64 = -0.08;
/// Temperature shift for a sufficient answer.
const SUFFICIENT_WARMTH: f64 = 0.05;

/// The structured result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// The coach's response text.
    pub message: String,
    /// Phase the session is in after this turn.
    pub phase: SalesPhase,
    /// Snapshot of the capture map after this turn.
    pub captures: HashMap<String, String>,
    /// Composite score for this turn's answer.
    pub score: Score,
    /// True when this turn's gate passed (the phase advanced, or the
    /// terminal phase's requirements are met).
    pub phase_complete: bool,
    /// Intent category detected in the input, if any.
    pub intent: Option<String>,
    /// Objection signals detected in the input.
    #[serde(skip)]
    pub objections: Vec<ObjectionSignal>,
    /// True when the input signalled readiness to move forward.
    pub transition_ready: bool,
    /// Commitment temperature after this turn.
    pub temperature: Temperature,
}

/// Orchestrates one conversational turn against a session.
pub struct ResponseGenerator {
    config: Arc<FlowConfig>,
    matcher: FuzzyMatcher,
    validator: AnswerValidator,
    phase_manager: PhaseManager,
    router: QuestionRouter,
}

impl ResponseGenerator {
    /// Creates a generator with the default extraction strategy.
    pub fn new(config: Arc<FlowConfig>) -> Self {
        let matcher = FuzzyMatcher::new(config.fuzzy_threshold);
        let validator =
            AnswerValidator::with_default_strategy(config.scoring.clone(), matcher.clone());
        Self {
            matcher,
            validator,
            phase_manager: PhaseManager::new(Arc::clone(&config)),
            router: QuestionRouter::new(Arc::clone(&config)),
            config,
        }
    }

    /// Creates a generator with an explicit extraction strategy.
    pub fn with_strategy(config: Arc<FlowConfig>, strategy: Box<dyn CaptureStrategy>) -> Self {
        let matcher = FuzzyMatcher::new(config.fuzzy_threshold);
        let validator =
            AnswerValidator::new(config.scoring.clone(), matcher.clone(), strategy);
        Self {
            matcher,
            validator,
            phase_manager: PhaseManager::new(Arc::clone(&config)),
            router: QuestionRouter::new(Arc::clone(&config)),
            config,
        }
    }

    /// Runs one turn: mutates the session and returns the response.
    pub fn generate(&self, session: &mut Session, raw_message: &str) -> TurnOutcome {
        let span = tracing::debug_span!(
            "turn",
            session_id = %session.id,
            phase = session.phase.label()
        );
        let _guard = span.enter();

        session.add_message(MessageRole::User, raw_message);

        let keywords = &self.config.keywords;
        let intent = self.matcher.match_intent(raw_message, &keywords.intents);
        let objections = self.matcher.detect_objections(raw_message, &keywords.objections);
        let transition_ready = self
            .matcher
            .detect_transition_readiness(raw_message, &keywords.transition_ready);

        if let Some(matched) = &intent {
            tracing::debug!(intent = %matched.intent, confidence = matched.confidence, "intent detected");
        }
        for signal in &objections {
            tracing::debug!(category = ?signal.category, confidence = signal.confidence, "objection detected");
        }

        let phase_config = self.config.phase(session.phase);
        let validation = self
            .validator
            .validate(raw_message, phase_config, &session.captures);

        for capture in &validation.extracted {
            session.set_capture(capture.key.clone(), capture.value.clone());
        }
        session.record_score(validation.score);
        self.apply_temperature(session, &objections, transition_ready, validation.sufficient);

        let phase_complete =
            self.phase_manager
                .can_advance(session.phase, &session.captures, validation.score);

        let question = if phase_complete {
            match session.advance_phase() {
                PhaseAdvance::Advanced(next) => {
                    tracing::info!(to = next.label(), "phase advanced");
                    session.mark_phase_opened();
                    self.router.opening_question(next, &session.captures)
                }
                PhaseAdvance::AlreadyTerminal => {
                    tracing::info!("flow complete");
                    self.router.completion_message(&session.captures)
                }
            }
        } else if session.needs_opening() {
            session.mark_phase_opened();
            self.router.opening_question(session.phase, &session.captures)
        } else {
            self.router.probe_question(session.phase, &session.captures)
        };

        let message = self.compose(&objections, transition_ready, question, session.phase);
        session.add_message(MessageRole::Coach, &message);

        TurnOutcome {
            message,
            phase: session.phase,
            captures: session.captures.clone(),
            score: validation.score,
            phase_complete,
            intent: intent.map(|m| m.intent),
            objections,
            transition_ready,
            temperature: session.temperature,
        }
    }

    fn apply_temperature(
        &self,
        session: &mut Session,
        objections: &[ObjectionSignal],
        transition_ready: bool,
        sufficient: bool,
    ) {
        if transition_ready {
            session.adjust_temperature(READY_WARMTH);
        }
        for _ in objections {
            session.adjust_temperature(OBJECTION_CHILL);
        }
        if sufficient {
            session.adjust_temperature(SUFFICIENT_WARMTH);
        }
    }

    /// Prepends a transition phrase when a signal fired.
    ///
    /// An absent or empty phrase is skipped entirely; it must never be
    /// stringified into the final message.
    fn compose(
        &self,
        objections: &[ObjectionSignal],
        transition_ready: bool,
        question: String,
        phase: SalesPhase,
    ) -> String {
        let phrases = &self.config.keywords.phrases;
        let prefix = if transition_ready {
            phrases.on_ready.trim()
        } else {
            objections
                .iter()
                .max_by(|a, b| {
                    a.confidence
                        .partial_cmp(&b.confidence)
                        .unwrap_or(Ordering::Equal)
                })
                .map(|signal| phrases.for_objection(signal.category).trim())
                .unwrap_or("")
        };

        let message = if prefix.is_empty() {
            question
        } else {
            format!("{} {}", prefix, question)
        };

        let message = message.trim().to_string();
        if message.is_empty() {
            // Templates are validated non-empty, but an all-placeholder
            // template can render to nothing; fall back to the phase
            // directive rather than returning a blank message.
            phase.directive().to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    fn generator() -> ResponseGenerator {
        ResponseGenerator::new(Arc::new(FlowConfig::default()))
    }

    fn session() -> Session {
        Session::new(SessionId::parse("turn-tests").unwrap())
    }

    mod first_turn {
        use super::*;

        #[test]
        fn fresh_session_starts_at_intent_with_empty_captures() {
            let g = generator();
            let mut s = session();
            let outcome = g.generate(&mut s, "hello");

            assert_eq!(outcome.phase, SalesPhase::Intent);
            assert!(outcome.captures.is_empty());
            assert!(!outcome.phase_complete);
        }

        #[test]
        fn first_response_is_the_opening_question() {
            let g = generator();
            let mut s = session();
            let outcome = g.generate(&mut s, "hello");
            assert!(outcome.message.contains("tangible outcome"));
        }

        #[test]
        fn both_sides_of_the_turn_are_recorded() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            assert_eq!(s.history.len(), 2);
            assert_eq!(s.history[0].role, MessageRole::User);
            assert_eq!(s.history[1].role, MessageRole::Coach);
        }
    }

    mod gating {
        use super::*;

        #[test]
        fn partial_capture_does_not_advance() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            let outcome = g.generate(&mut s, "I want to double our revenue this year");

            assert_eq!(outcome.phase, SalesPhase::Intent);
            assert!(!outcome.phase_complete);
            assert!(outcome.captures.contains_key("tangible_outcome"));
        }

        #[test]
        fn completing_captures_advances_exactly_then() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            g.generate(&mut s, "I want to double our revenue this year");
            let outcome = g.generate(
                &mut s,
                "We've been struggling every month watching deals slip away",
            );

            assert!(outcome.phase_complete);
            assert_eq!(outcome.phase, SalesPhase::LogicalCertainty);
        }

        #[test]
        fn advancement_response_is_next_phase_opening() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            g.generate(&mut s, "I want to double our revenue this year");
            let outcome = g.generate(
                &mut s,
                "We've been struggling every month watching deals slip away",
            );

            // Opening of LogicalCertainty references the captured goal.
            assert!(outcome.message.contains("current approach"));
        }

        #[test]
        fn unrelated_turn_after_advancement_does_not_advance_again() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            g.generate(&mut s, "I want to double our revenue this year");
            g.generate(
                &mut s,
                "We've been struggling every month watching deals slip away",
            );
            let outcome = g.generate(&mut s, "The weather is nice today");

            assert_eq!(outcome.phase, SalesPhase::LogicalCertainty);
            assert!(!outcome.phase_complete);
        }
    }

    mod signals {
        use super::*;
        use crate::domain::coach::matcher::ObjectionCategory;

        #[test]
        fn objection_gets_acknowledged_in_the_message() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            let outcome = g.generate(&mut s, "That's too expensive for us");

            assert!(outcome
                .objections
                .iter()
                .any(|o| o.category == ObjectionCategory::PriceSensitivity));
            assert!(outcome.message.starts_with("Fair concern on price"));
        }

        #[test]
        fn objection_cools_the_temperature() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            let before = s.temperature;
            g.generate(&mut s, "That's too expensive for us");
            assert!(s.temperature < before);
        }

        #[test]
        fn readiness_warms_the_temperature() {
            let g = generator();
            let mut s = session();
            g.generate(&mut s, "hello");
            let before = s.temperature;
            let outcome = g.generate(&mut s, "Okay, sounds good, makes sense");
            assert!(outcome.transition_ready);
            assert!(s.temperature > before);
        }

        #[test]
        fn intent_is_reported_to_the_caller() {
            let g = generator();
            let mut s = session();
            let outcome = g.generate(&mut s, "What does this cost, what's the pricing?");
            assert_eq!(outcome.intent.as_deref(), Some("budget_inquiry"));
        }
    }

    mod degenerate_input {
        use super::*;

        #[test]
        fn empty_message_is_a_zero_score_turn() {
            let g = generator();
            let mut s = session();
            let outcome = g.generate(&mut s, "");

            assert_eq!(outcome.score, Score::ZERO);
            assert!(!outcome.phase_complete);
            assert!(outcome.captures.is_empty());
            assert!(!outcome.message.is_empty());
        }

        #[test]
        fn whitespace_message_is_a_zero_score_turn() {
            let g = generator();
            let mut s = session();
            let outcome = g.generate(&mut s, "   \t ");
            assert_eq!(outcome.score, Score::ZERO);
        }
    }

    mod message_hygiene {
        use super::*;

        #[test]
        fn responses_never_contain_placeholders_or_none() {
            let g = generator();
            let mut s = session();
            let inputs = [
                "hello",
                "I want to double our revenue this year",
                "We've been struggling every month",
                "",
                "That's too expensive",
                "sounds good, let's do it",
                "We use spreadsheets right now but it isn't enough",
            ];
            for input in inputs {
                let outcome = g.generate(&mut s, input);
                assert!(!outcome.message.contains('{'), "braces in: {}", outcome.message);
                assert!(!outcome.message.contains('}'), "braces in: {}", outcome.message);
                assert!(!outcome.message.contains("None"), "'None' in: {}", outcome.message);
                assert!(!outcome.message.is_empty());
            }
        }
    }

    mod full_flow {
        use super::*;

        #[test]
        fn a_cooperative_trainee_reaches_the_pitch() {
            let g = generator();
            let mut s = session();

            // Scripted answers that satisfy each phase's captures.
            let answers = [
                "I want to double our monthly revenue and improve our close rate",
                "We keep struggling with deals slipping away and it's painful to watch",
                "Right now we use spreadsheets and sticky notes, that's our process",
                "Honestly it doesn't work, the follow-ups fall through and it isn't enough",
                "I feel the pressure every week, and the stress weighs on the whole team",
                "Imagine we could finally focus on selling instead of chasing paperwork, that would be a different company",
                "If nothing changes it keeps costing us two or three deals a month, it would get worse",
            ];

            for answer in answers {
                g.generate(&mut s, answer);
            }

            assert_eq!(s.phase, SalesPhase::Pitch);
        }

        #[test]
        fn terminal_phase_advancement_is_a_noop_with_completion_message() {
            let g = generator();
            let mut s = session();
            // Drive the session to Pitch directly.
            while s.phase != SalesPhase::Pitch {
                s.advance_phase();
            }
            s.mark_phase_opened();

            let outcome = g.generate(&mut s, "Alright, I'm ready, let's start, sign me up today");
            assert_eq!(outcome.phase, SalesPhase::Pitch);
            assert!(outcome.phase_complete);
            assert!(outcome.message.contains("full pitch"));

            // A further turn still cannot leave the terminal phase.
            let again = g.generate(&mut s, "Still ready, let's go");
            assert_eq!(again.phase, SalesPhase::Pitch);
        }
    }
}
