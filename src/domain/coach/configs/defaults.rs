//! Built-in flow tables.
//!
//! These defaults describe the standard six-phase certainty flow and are
//! used whenever no flow file overrides them. Operators can export this
//! table with `serde_yaml`, edit it, and point the server at the result.

use std::collections::BTreeMap;

use crate::domain::coach::matcher::FuzzyMatcher;
use crate::domain::coach::phase::SalesPhase;

use super::{
    FlowConfig, IntentDefinition, KeywordSets, ObjectionKeywords, PhaseConfig, ProbeTemplate,
    ProbeType, ScoringRules, TransitionPhrases,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn anchors(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, words)| (key.to_string(), strings(words)))
        .collect()
}

fn probe(probe: ProbeType, targets: Option<&str>, template: &str) -> ProbeTemplate {
    ProbeTemplate {
        probe,
        targets: targets.map(|t| t.to_string()),
        template: template.to_string(),
    }
}

/// Builds the built-in flow configuration.
pub fn default_flow_config() -> FlowConfig {
    FlowConfig {
        fuzzy_threshold: FuzzyMatcher::DEFAULT_THRESHOLD,
        phases: vec![
            intent_phase(),
            logical_certainty_phase(),
            emotional_certainty_phase(),
            future_pace_phase(),
            consequences_phase(),
            pitch_phase(),
        ],
        scoring: ScoringRules {
            relevance_weight: 0.25,
            specificity_weight: 0.25,
            capture_weight: 0.5,
            sufficient_threshold: 0.5,
            specificity_pivot_words: 12,
        },
        keywords: default_keywords(),
        completion_message:
            "That's the full pitch, built from their own words. Take it into your next live call."
                .to_string(),
    }
}

fn intent_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::Intent,
        min_score: 0.4,
        required_captures: strings(&["tangible_outcome", "pain_experience"]),
        focus_keywords: strings(&[
            "goal", "outcome", "achieve", "revenue", "growth", "result", "want",
        ]),
        capture_anchors: anchors(&[
            (
                "tangible_outcome",
                &[
                    "want to", "goal is", "achieve", "looking to", "aiming to", "trying to",
                    "grow", "increase", "improve",
                ],
            ),
            (
                "pain_experience",
                &[
                    "struggling", "struggle", "painful", "pain", "frustrat", "losing", "stuck",
                    "tired of", "worried",
                ],
            ),
        ]),
        opening_question:
            "Welcome in. Before anything else: what's the single tangible outcome you want from \
             this, and what's driving you to chase it now?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Specificity,
                Some("tangible_outcome"),
                "What would hitting that goal look like in concrete numbers?",
            ),
            probe(
                ProbeType::Emotion,
                Some("pain_experience"),
                "You mentioned {tangible_outcome} — what's been the hardest part about not \
                 having it yet?",
            ),
            probe(
                ProbeType::Specificity,
                None,
                "Tell me more — what does that look like day to day?",
            ),
        ],
    }
}

fn logical_certainty_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::LogicalCertainty,
        min_score: 0.4,
        required_captures: strings(&["current_approach", "approach_gap"]),
        focus_keywords: strings(&[
            "approach", "process", "current", "system", "method", "tool", "working",
        ]),
        capture_anchors: anchors(&[
            (
                "current_approach",
                &[
                    "currently", "right now", "at the moment", "we use", "we do", "our process",
                    "we've been",
                ],
            ),
            (
                "approach_gap",
                &[
                    "doesn't work", "not working", "falls short", "missing", "fails", "can't",
                    "isn't enough", "too slow",
                ],
            ),
        ]),
        opening_question:
            "Let's get logical for a minute. Walk me through how you go after \
             {tangible_outcome} today — what's the current approach?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Specificity,
                Some("current_approach"),
                "What exactly are you doing today to get {tangible_outcome}?",
            ),
            probe(
                ProbeType::Impact,
                Some("approach_gap"),
                "And where does that approach fall short for you?",
            ),
            probe(
                ProbeType::Specificity,
                None,
                "If you could change one part of that process tomorrow, which part?",
            ),
        ],
    }
}

fn emotional_certainty_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::EmotionalCertainty,
        min_score: 0.35,
        required_captures: strings(&["personal_impact"]),
        focus_keywords: strings(&[
            "feel", "impact", "stress", "pressure", "team", "confidence", "morale",
        ]),
        capture_anchors: anchors(&[(
            "personal_impact",
            &[
                "feel", "feeling", "felt", "stress", "pressure", "exhaust", "weighs", "sleep",
                "personally", "morale",
            ],
        )]),
        opening_question:
            "Numbers aside — when {approach_gap} shows up, how does that actually affect you \
             and the people around you?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Emotion,
                Some("personal_impact"),
                "How does it feel when that happens?",
            ),
            probe(
                ProbeType::Emotion,
                None,
                "And what does that do to your confidence in the current plan?",
            ),
        ],
    }
}

fn future_pace_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::FuturePace,
        min_score: 0.35,
        required_captures: strings(&["future_vision"]),
        focus_keywords: strings(&[
            "future", "imagine", "picture", "months", "year", "solved", "different",
        ]),
        capture_anchors: anchors(&[(
            "future_vision",
            &[
                "imagine", "picture", "would be", "will be", "could finally", "free to",
                "instead", "would mean",
            ],
        )]),
        opening_question:
            "Fast-forward six months: {tangible_outcome} is handled. Paint me the picture — \
             what's different about your week?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Timeline,
                Some("future_vision"),
                "Walk me through a normal week once this is solved.",
            ),
            probe(
                ProbeType::Timeline,
                None,
                "What would you do with the time that frees up?",
            ),
        ],
    }
}

fn consequences_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::Consequences,
        min_score: 0.35,
        required_captures: strings(&["inaction_cost"]),
        focus_keywords: strings(&[
            "cost", "risk", "lose", "nothing changes", "stay", "keep", "worse",
        ]),
        capture_anchors: anchors(&[(
            "inaction_cost",
            &[
                "if nothing", "keep losing", "cost us", "costs us", "we'd miss", "stays the same",
                "keeps happening", "get worse", "costing",
            ],
        )]),
        opening_question:
            "Flip it around. If nothing changes and {approach_gap} stays exactly as it is, \
             what does the next year cost you?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Impact,
                Some("inaction_cost"),
                "What does staying on the current path cost you, concretely?",
            ),
            probe(
                ProbeType::Timeline,
                None,
                "How long can you afford to let that run?",
            ),
        ],
    }
}

fn pitch_phase() -> PhaseConfig {
    PhaseConfig {
        phase: SalesPhase::Pitch,
        min_score: 0.3,
        required_captures: strings(&["decision_readiness"]),
        focus_keywords: strings(&[
            "ready", "start", "decision", "move", "commit", "next step",
        ]),
        capture_anchors: anchors(&[(
            "decision_readiness",
            &[
                "ready", "let's", "sign", "start", "move forward", "commit", "on board",
                "i'm in",
            ],
        )]),
        opening_question:
            "Based on everything you've told me — you want {tangible_outcome}, the current \
             approach leaves {approach_gap}, and doing nothing costs you {inaction_cost}. \
             Here's how we close that gap. Shall we get you started?"
                .to_string(),
        probes: vec![
            probe(
                ProbeType::Specificity,
                Some("decision_readiness"),
                "What would you need to see to say yes today?",
            ),
            probe(
                ProbeType::Specificity,
                None,
                "On a scale of one to ten, how ready are you to move on this?",
            ),
        ],
    }
}

fn default_keywords() -> KeywordSets {
    KeywordSets {
        intents: vec![
            IntentDefinition {
                name: "budget_inquiry".to_string(),
                keywords: strings(&["budget", "price", "pricing", "cost", "how much"]),
            },
            IntentDefinition {
                name: "timeline_inquiry".to_string(),
                keywords: strings(&["how long", "timeline", "when can", "how soon"]),
            },
            IntentDefinition {
                name: "process_inquiry".to_string(),
                keywords: strings(&["how does this work", "what happens next", "walk me through"]),
            },
            IntentDefinition {
                name: "ready_to_buy".to_string(),
                keywords: strings(&["sign me up", "ready to start", "let's go", "where do i sign"]),
            },
        ],
        objections: ObjectionKeywords {
            price: strings(&[
                "expensive",
                "too much",
                "can't afford",
                "cheaper",
                "overpriced",
                "pricey",
                "costly",
            ]),
            time: strings(&[
                "no time",
                "too busy",
                "not now",
                "maybe later",
                "next quarter",
                "bad timing",
            ]),
            authority: strings(&[
                "my boss",
                "ask my",
                "my partner",
                "the board",
                "not my call",
                "decision maker",
            ]),
            competitor: strings(&[
                "already use",
                "another vendor",
                "competitor",
                "current provider",
                "we have a",
            ]),
            skepticism: strings(&[
                "skeptical",
                "doubt",
                "prove it",
                "really work",
                "too good to be true",
                "not convinced",
            ]),
        },
        transition_ready: strings(&[
            "sounds good",
            "let's do it",
            "makes sense",
            "i'm ready",
            "let's move forward",
            "ready to go",
            "i'm in",
        ]),
        phrases: TransitionPhrases {
            price: "Fair concern on price — let's make sure the value is obvious first."
                .to_string(),
            time: "I hear you on timing, so let's keep this tight.".to_string(),
            authority: "Makes sense to involve them — let's arm you with the full picture."
                .to_string(),
            competitor: "Good — you already see the value in solving this. Let's compare honestly."
                .to_string(),
            skepticism: "Healthy skepticism. Let's stick to what we can verify.".to_string(),
            on_ready: "Love the momentum.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_six_phases() {
        let config = default_flow_config();
        assert_eq!(config.phases.len(), 6);
    }

    #[test]
    fn no_template_contains_the_literal_none() {
        let config = default_flow_config();
        for phase_config in &config.phases {
            assert!(!phase_config.opening_question.contains("None"));
            for probe in &phase_config.probes {
                assert!(!probe.template.contains("None"));
            }
        }
        assert!(!config.completion_message.contains("None"));
    }

    #[test]
    fn every_phase_has_a_generic_probe() {
        let config = default_flow_config();
        for phase_config in &config.phases {
            assert!(
                phase_config.probes.iter().any(|p| p.targets.is_none()),
                "{:?} has no generic deepening probe",
                phase_config.phase
            );
        }
    }

    #[test]
    fn every_targeted_probe_points_at_a_required_capture() {
        let config = default_flow_config();
        for phase_config in &config.phases {
            for probe in &phase_config.probes {
                if let Some(target) = &probe.targets {
                    assert!(
                        phase_config.required_captures.contains(target),
                        "{:?} probe targets '{}' which is not required",
                        phase_config.phase,
                        target
                    );
                }
            }
        }
    }

    #[test]
    fn scoring_weights_sum_to_one() {
        let scoring = default_flow_config().scoring;
        let sum = scoring.relevance_weight + scoring.specificity_weight + scoring.capture_weight;
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
