//! Sales phases and their fixed ordering.
//!
//! The training methodology walks every conversation through six phases
//! in a strict forward-only order. Phases never loop or backtrack; a
//! session that reaches the final phase stays there.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// One stage of the six-step sales methodology.
///
/// Phases are traversed strictly in order:
/// `Intent` → `LogicalCertainty` → `EmotionalCertainty` → `FuturePace` →
/// `Consequences` → `Pitch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalesPhase {
    /// Surface what the prospect actually wants to achieve.
    #[default]
    Intent,

    /// Build logical certainty: current approach and where it falls short.
    LogicalCertainty,

    /// Build emotional certainty: what the gap costs them personally.
    EmotionalCertainty,

    /// Future pace: have them describe life after the problem is solved.
    FuturePace,

    /// Consequences: the cost of staying on the current path.
    Consequences,

    /// Present the offer and ask for commitment.
    Pitch,
}

impl SalesPhase {
    /// Returns a short label for the phase, suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Intent => "Intent",
            Self::LogicalCertainty => "Logical Certainty",
            Self::EmotionalCertainty => "Emotional Certainty",
            Self::FuturePace => "Future Pace",
            Self::Consequences => "Consequences",
            Self::Pitch => "Pitch",
        }
    }

    /// Returns the coach's primary directive in this phase.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Intent => "Uncover the concrete outcome the prospect wants and the pain behind it.",
            Self::LogicalCertainty => "Establish what they do today and why it is not getting them there.",
            Self::EmotionalCertainty => "Connect the gap to its personal impact. Let them feel the problem.",
            Self::FuturePace => "Have them describe, in their own words, what solved looks like.",
            Self::Consequences => "Make the cost of changing nothing explicit.",
            Self::Pitch => "Present the offer plainly and ask for a decision.",
        }
    }
}

impl StateMachine for SalesPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        PhaseSequence::next(*self) == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        PhaseSequence::next(*self).into_iter().collect()
    }
}

/// Central location for phase ordering logic.
///
/// All ordering-related queries go through this type so the canonical
/// sequence is defined exactly once.
pub struct PhaseSequence;

impl PhaseSequence {
    /// The canonical order of sales phases.
    pub const ORDER: [SalesPhase; 6] = [
        SalesPhase::Intent,
        SalesPhase::LogicalCertainty,
        SalesPhase::EmotionalCertainty,
        SalesPhase::FuturePace,
        SalesPhase::Consequences,
        SalesPhase::Pitch,
    ];

    /// Returns all phases in order.
    pub fn all() -> &'static [SalesPhase; 6] {
        &Self::ORDER
    }

    /// Returns the 0-based index of a phase in the sequence.
    #[inline]
    pub fn order_index(phase: SalesPhase) -> usize {
        Self::ORDER
            .iter()
            .position(|&p| p == phase)
            .expect("All SalesPhase variants must be in ORDER")
    }

    /// Returns the next phase in the sequence, or None if at the end.
    pub fn next(phase: SalesPhase) -> Option<SalesPhase> {
        let idx = Self::order_index(phase);
        Self::ORDER.get(idx + 1).copied()
    }

    /// Returns the previous phase in the sequence, or None if at the start.
    pub fn previous(phase: SalesPhase) -> Option<SalesPhase> {
        let idx = Self::order_index(phase);
        if idx > 0 {
            Self::ORDER.get(idx - 1).copied()
        } else {
            None
        }
    }

    /// Returns true if phase `a` comes before phase `b` in the sequence.
    pub fn is_before(a: SalesPhase, b: SalesPhase) -> bool {
        Self::order_index(a) < Self::order_index(b)
    }

    /// Returns the first phase in the sequence.
    pub fn first() -> SalesPhase {
        Self::ORDER[0]
    }

    /// Returns the last phase in the sequence.
    pub fn last() -> SalesPhase {
        Self::ORDER[Self::ORDER.len() - 1]
    }

    /// Returns true if this is the terminal phase.
    pub fn is_last(phase: SalesPhase) -> bool {
        phase == Self::last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod phase_basics {
        use super::*;

        #[test]
        fn default_phase_is_intent() {
            assert_eq!(SalesPhase::default(), SalesPhase::Intent);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&SalesPhase::LogicalCertainty).unwrap();
            assert_eq!(json, "\"logical_certainty\"");
        }

        #[test]
        fn deserializes_from_snake_case() {
            let phase: SalesPhase = serde_json::from_str("\"future_pace\"").unwrap();
            assert_eq!(phase, SalesPhase::FuturePace);
        }

        #[test]
        fn all_phases_have_labels_and_directives() {
            for phase in PhaseSequence::all() {
                assert!(!phase.label().is_empty());
                assert!(!phase.directive().is_empty());
            }
        }
    }

    mod sequence {
        use super::*;

        #[test]
        fn order_contains_all_six_phases() {
            assert_eq!(PhaseSequence::ORDER.len(), 6);
        }

        #[test]
        fn order_index_returns_correct_position() {
            assert_eq!(PhaseSequence::order_index(SalesPhase::Intent), 0);
            assert_eq!(PhaseSequence::order_index(SalesPhase::LogicalCertainty), 1);
            assert_eq!(PhaseSequence::order_index(SalesPhase::EmotionalCertainty), 2);
            assert_eq!(PhaseSequence::order_index(SalesPhase::FuturePace), 3);
            assert_eq!(PhaseSequence::order_index(SalesPhase::Consequences), 4);
            assert_eq!(PhaseSequence::order_index(SalesPhase::Pitch), 5);
        }

        #[test]
        fn next_returns_subsequent_phase() {
            assert_eq!(
                PhaseSequence::next(SalesPhase::Intent),
                Some(SalesPhase::LogicalCertainty)
            );
            assert_eq!(
                PhaseSequence::next(SalesPhase::Consequences),
                Some(SalesPhase::Pitch)
            );
        }

        #[test]
        fn next_returns_none_for_terminal_phase() {
            assert_eq!(PhaseSequence::next(SalesPhase::Pitch), None);
        }

        #[test]
        fn previous_returns_none_for_first_phase() {
            assert_eq!(PhaseSequence::previous(SalesPhase::Intent), None);
        }

        #[test]
        fn previous_returns_preceding_phase() {
            assert_eq!(
                PhaseSequence::previous(SalesPhase::Pitch),
                Some(SalesPhase::Consequences)
            );
        }

        #[test]
        fn is_before_correctly_compares() {
            assert!(PhaseSequence::is_before(
                SalesPhase::Intent,
                SalesPhase::Pitch
            ));
            assert!(!PhaseSequence::is_before(
                SalesPhase::Pitch,
                SalesPhase::Intent
            ));
            assert!(!PhaseSequence::is_before(
                SalesPhase::FuturePace,
                SalesPhase::FuturePace
            ));
        }

        #[test]
        fn first_and_last_bracket_the_sequence() {
            assert_eq!(PhaseSequence::first(), SalesPhase::Intent);
            assert_eq!(PhaseSequence::last(), SalesPhase::Pitch);
            assert!(PhaseSequence::is_last(SalesPhase::Pitch));
            assert!(!PhaseSequence::is_last(SalesPhase::Consequences));
        }

        #[test]
        fn state_machine_only_allows_single_step_forward() {
            assert!(SalesPhase::Intent.can_transition_to(&SalesPhase::LogicalCertainty));
            assert!(!SalesPhase::Intent.can_transition_to(&SalesPhase::EmotionalCertainty));
            assert!(!SalesPhase::LogicalCertainty.can_transition_to(&SalesPhase::Intent));
            assert!(!SalesPhase::Pitch.can_transition_to(&SalesPhase::Intent));
        }

        #[test]
        fn pitch_is_the_only_terminal_state() {
            for phase in PhaseSequence::all() {
                assert_eq!(phase.is_terminal(), *phase == SalesPhase::Pitch);
            }
        }

        #[test]
        fn transition_to_rejects_skipping() {
            let result = SalesPhase::Intent.transition_to(SalesPhase::FuturePace);
            assert!(result.is_err());
            let ok = SalesPhase::Intent.transition_to(SalesPhase::LogicalCertainty);
            assert_eq!(ok.unwrap(), SalesPhase::LogicalCertainty);
        }

        #[test]
        fn walking_next_visits_every_phase_once() {
            let mut current = PhaseSequence::first();
            let mut visited = vec![current];
            while let Some(next) = PhaseSequence::next(current) {
                visited.push(next);
                current = next;
            }
            assert_eq!(visited, PhaseSequence::ORDER.to_vec());
        }
    }
}
