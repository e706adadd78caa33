//! Declarative flow configuration.
//!
//! Three tables drive the engine: phase definitions (required captures,
//! thresholds, question templates), scoring rules (weights), and keyword
//! sets (intents, objections, transition signals). The tables are loaded
//! once at startup, validated, and passed into components by reference;
//! nothing reads them from ambient global state.

mod defaults;

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::coach::matcher::ObjectionCategory;
use crate::domain::coach::phase::{PhaseSequence, SalesPhase};

pub use defaults::default_flow_config;

/// Errors raised while loading or validating flow configuration.
///
/// All of these are fatal at startup; they are never surfaced per-request.
#[derive(Debug, Error)]
pub enum FlowConfigError {
    #[error("Failed to read flow file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse flow file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Phase table must define each phase exactly once in methodology order, got {got:?}")]
    BadPhaseTable { got: Vec<SalesPhase> },

    #[error("Phase {phase:?}: {reason}")]
    BadPhase { phase: SalesPhase, reason: String },

    #[error("Scoring rules invalid: {0}")]
    BadScoring(String),

    #[error("Keyword sets invalid: {0}")]
    BadKeywords(String),
}

/// A probe question variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeType {
    /// Digs into how the situation feels.
    Emotion,
    /// Asks for concrete detail.
    Specificity,
    /// Asks about timing and horizon.
    Timeline,
    /// Asks about consequences and stakes.
    Impact,
}

/// A probe question template for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeTemplate {
    /// The flavor of probe.
    pub probe: ProbeType,
    /// The capture key this probe tries to elicit, if any. Probes with
    /// no target are generic deepening questions.
    #[serde(default)]
    pub targets: Option<String>,
    /// Question text with `{key}` placeholders resolved from captures.
    pub template: String,
}

/// Static definition of one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Which phase this row defines.
    pub phase: SalesPhase,
    /// Minimum composite score the latest answer must reach before the
    /// phase gate can open.
    pub min_score: f64,
    /// Capture keys that must all be present before advancing.
    pub required_captures: Vec<String>,
    /// Topic keywords used for relevance scoring.
    pub focus_keywords: Vec<String>,
    /// Anchor keywords per capture key, used by the extraction heuristic.
    pub capture_anchors: BTreeMap<String, Vec<String>>,
    /// Question asked when the phase begins.
    pub opening_question: String,
    /// Probe variants for follow-up turns.
    pub probes: Vec<ProbeTemplate>,
}

/// Weights and thresholds for answer scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Weight of topical relevance in the composite score.
    pub relevance_weight: f64,
    /// Weight of the length/detail heuristic.
    pub specificity_weight: f64,
    /// Weight of capture extraction.
    pub capture_weight: f64,
    /// Composite score at or above which an answer counts as sufficient.
    pub sufficient_threshold: f64,
    /// Word count at which specificity reaches half its maximum.
    pub specificity_pivot_words: usize,
}

/// One named intent category and its keywords.
///
/// Categories are matched in declaration order; the first to reach the
/// fuzzy threshold wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    /// Category name reported to the hosting layer.
    pub name: String,
    /// Keywords scored against the input.
    pub keywords: Vec<String>,
}

/// Keyword lists for the five objection categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectionKeywords {
    pub price: Vec<String>,
    pub time: Vec<String>,
    pub authority: Vec<String>,
    pub competitor: Vec<String>,
    pub skepticism: Vec<String>,
}

impl ObjectionKeywords {
    /// Returns the keyword list for a category.
    pub fn keywords_for(&self, category: ObjectionCategory) -> &[String] {
        match category {
            ObjectionCategory::PriceSensitivity => &self.price,
            ObjectionCategory::TimeConstraint => &self.time,
            ObjectionCategory::AuthorityDeferral => &self.authority,
            ObjectionCategory::CompetitorPreference => &self.competitor,
            ObjectionCategory::Skepticism => &self.skepticism,
        }
    }
}

/// Acknowledgment phrases prepended when signals fire.
///
/// An empty phrase means "say nothing"; the generator skips it rather
/// than concatenating a blank prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionPhrases {
    /// Per-objection-category acknowledgments.
    pub price: String,
    pub time: String,
    pub authority: String,
    pub competitor: String,
    pub skepticism: String,
    /// Phrase used when the trainee signals readiness to move forward.
    pub on_ready: String,
}

impl TransitionPhrases {
    /// Returns the acknowledgment for an objection category.
    pub fn for_objection(&self, category: ObjectionCategory) -> &str {
        match category {
            ObjectionCategory::PriceSensitivity => &self.price,
            ObjectionCategory::TimeConstraint => &self.time,
            ObjectionCategory::AuthorityDeferral => &self.authority,
            ObjectionCategory::CompetitorPreference => &self.competitor,
            ObjectionCategory::Skepticism => &self.skepticism,
        }
    }
}

/// All keyword-driven signal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSets {
    /// Intent categories in match priority order.
    pub intents: Vec<IntentDefinition>,
    /// Objection keywords per category.
    pub objections: ObjectionKeywords,
    /// Keywords signalling readiness to move forward.
    pub transition_ready: Vec<String>,
    /// Phrases prepended to responses when signals fire.
    pub phrases: TransitionPhrases,
}

/// Root flow configuration: the three declarative tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Minimum fuzzy match ratio (0-100) for keyword detection.
    pub fuzzy_threshold: u8,
    /// Phase definitions, one per phase, in methodology order.
    pub phases: Vec<PhaseConfig>,
    /// Scoring weights and thresholds.
    pub scoring: ScoringRules,
    /// Intent/objection/transition keyword sets.
    pub keywords: KeywordSets,
    /// Message delivered when the terminal phase's requirements are met.
    pub completion_message: String,
}

static BUILT_IN: Lazy<FlowConfig> = Lazy::new(default_flow_config);

impl FlowConfig {
    /// Returns the built-in flow tables, constructed once.
    pub fn built_in() -> &'static FlowConfig {
        &BUILT_IN
    }

    /// Parses flow configuration from a YAML string and validates it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FlowConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads flow configuration from a YAML file and validates it.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, FlowConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Returns the definition for a phase.
    ///
    /// Validation guarantees every phase has exactly one definition, so
    /// this never fails on a validated config.
    pub fn phase(&self, phase: SalesPhase) -> &PhaseConfig {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .expect("validated FlowConfig defines every phase")
    }

    /// Validates the whole configuration.
    ///
    /// Any failure here is fatal: the process should refuse to start
    /// rather than serve requests against broken tables.
    pub fn validate(&self) -> Result<(), FlowConfigError> {
        if self.fuzzy_threshold == 0 || self.fuzzy_threshold > 100 {
            return Err(FlowConfigError::BadKeywords(format!(
                "fuzzy_threshold must be in 1..=100, got {}",
                self.fuzzy_threshold
            )));
        }

        let listed: Vec<SalesPhase> = self.phases.iter().map(|p| p.phase).collect();
        if listed != PhaseSequence::ORDER.to_vec() {
            return Err(FlowConfigError::BadPhaseTable { got: listed });
        }

        for phase_config in &self.phases {
            Self::validate_phase(phase_config)?;
        }

        self.validate_scoring()?;
        self.validate_keywords()?;

        if self.completion_message.trim().is_empty() {
            return Err(FlowConfigError::BadKeywords(
                "completion_message cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_phase(config: &PhaseConfig) -> Result<(), FlowConfigError> {
        let fail = |reason: String| FlowConfigError::BadPhase {
            phase: config.phase,
            reason,
        };

        if !(0.0..=1.0).contains(&config.min_score) {
            return Err(fail(format!(
                "min_score must be in [0, 1], got {}",
                config.min_score
            )));
        }
        if config.opening_question.trim().is_empty() {
            return Err(fail("opening_question cannot be empty".to_string()));
        }
        if config.focus_keywords.is_empty() {
            return Err(fail("focus_keywords cannot be empty".to_string()));
        }
        if config.probes.is_empty() {
            return Err(fail("at least one probe is required".to_string()));
        }

        for key in &config.required_captures {
            if key.trim().is_empty() {
                return Err(fail("required capture key cannot be empty".to_string()));
            }
            let anchors = config.capture_anchors.get(key);
            if anchors.map(|a| a.is_empty()).unwrap_or(true) {
                return Err(fail(format!(
                    "required capture '{}' has no extraction anchors",
                    key
                )));
            }
        }

        for probe in &config.probes {
            if probe.template.trim().is_empty() {
                return Err(fail("probe template cannot be empty".to_string()));
            }
            if let Some(target) = &probe.targets {
                if !config.required_captures.contains(target) {
                    return Err(fail(format!(
                        "probe targets unknown capture '{}'",
                        target
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_scoring(&self) -> Result<(), FlowConfigError> {
        let s = &self.scoring;
        for (name, weight) in [
            ("relevance_weight", s.relevance_weight),
            ("specificity_weight", s.specificity_weight),
            ("capture_weight", s.capture_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(FlowConfigError::BadScoring(format!(
                    "{} must be in [0, 1], got {}",
                    name, weight
                )));
            }
        }
        let sum = s.relevance_weight + s.specificity_weight + s.capture_weight;
        if !(0.99..=1.01).contains(&sum) {
            return Err(FlowConfigError::BadScoring(format!(
                "weights must sum to 1.0, got {:.3}",
                sum
            )));
        }
        if !(0.0..=1.0).contains(&s.sufficient_threshold) {
            return Err(FlowConfigError::BadScoring(format!(
                "sufficient_threshold must be in [0, 1], got {}",
                s.sufficient_threshold
            )));
        }
        if s.specificity_pivot_words == 0 {
            return Err(FlowConfigError::BadScoring(
                "specificity_pivot_words must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_keywords(&self) -> Result<(), FlowConfigError> {
        if self.keywords.intents.is_empty() {
            return Err(FlowConfigError::BadKeywords(
                "at least one intent category is required".to_string(),
            ));
        }
        for intent in &self.keywords.intents {
            if intent.name.trim().is_empty() {
                return Err(FlowConfigError::BadKeywords(
                    "intent name cannot be empty".to_string(),
                ));
            }
            if intent.keywords.is_empty() {
                return Err(FlowConfigError::BadKeywords(format!(
                    "intent '{}' has no keywords",
                    intent.name
                )));
            }
        }
        for category in ObjectionCategory::ALL {
            if self.keywords.objections.keywords_for(category).is_empty() {
                return Err(FlowConfigError::BadKeywords(format!(
                    "objection category {:?} has no keywords",
                    category
                )));
            }
        }
        if self.keywords.transition_ready.is_empty() {
            return Err(FlowConfigError::BadKeywords(
                "transition_ready keywords cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        default_flow_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = FlowConfig::default();
        config.validate().expect("default config must be valid");
    }

    #[test]
    fn default_config_defines_all_phases_in_order() {
        let config = FlowConfig::default();
        let listed: Vec<SalesPhase> = config.phases.iter().map(|p| p.phase).collect();
        assert_eq!(listed, PhaseSequence::ORDER.to_vec());
    }

    #[test]
    fn every_required_capture_has_anchors() {
        let config = FlowConfig::default();
        for phase_config in &config.phases {
            for key in &phase_config.required_captures {
                let anchors = phase_config.capture_anchors.get(key);
                assert!(
                    anchors.map(|a| !a.is_empty()).unwrap_or(false),
                    "{:?} capture '{}' missing anchors",
                    phase_config.phase,
                    key
                );
            }
        }
    }

    #[test]
    fn phase_lookup_returns_matching_definition() {
        let config = FlowConfig::default();
        let def = config.phase(SalesPhase::Consequences);
        assert_eq!(def.phase, SalesPhase::Consequences);
    }

    #[test]
    fn validation_rejects_missing_phase() {
        let mut config = FlowConfig::default();
        config.phases.pop();
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadPhaseTable { .. })
        ));
    }

    #[test]
    fn validation_rejects_out_of_order_phases() {
        let mut config = FlowConfig::default();
        config.phases.swap(0, 1);
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadPhaseTable { .. })
        ));
    }

    #[test]
    fn validation_rejects_capture_without_anchors() {
        let mut config = FlowConfig::default();
        config.phases[0]
            .required_captures
            .push("unanchored_key".to_string());
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadPhase { .. })
        ));
    }

    #[test]
    fn validation_rejects_probe_with_unknown_target() {
        let mut config = FlowConfig::default();
        config.phases[0].probes.push(ProbeTemplate {
            probe: ProbeType::Emotion,
            targets: Some("no_such_capture".to_string()),
            template: "How does {no_such_capture} feel?".to_string(),
        });
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadPhase { .. })
        ));
    }

    #[test]
    fn validation_rejects_bad_weight_sum() {
        let mut config = FlowConfig::default();
        config.scoring.capture_weight = 0.9;
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadScoring(_))
        ));
    }

    #[test]
    fn validation_rejects_zero_threshold() {
        let mut config = FlowConfig::default();
        config.fuzzy_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_empty_objection_category() {
        let mut config = FlowConfig::default();
        config.keywords.objections.skepticism.clear();
        assert!(matches!(
            config.validate(),
            Err(FlowConfigError::BadKeywords(_))
        ));
    }

    #[test]
    fn yaml_round_trip_preserves_tables() {
        let config = FlowConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back = FlowConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back.phases.len(), config.phases.len());
        assert_eq!(back.fuzzy_threshold, config.fuzzy_threshold);
        assert_eq!(
            back.keywords.intents.len(),
            config.keywords.intents.len()
        );
    }

    #[test]
    fn from_yaml_str_rejects_invalid_tables() {
        let mut config = FlowConfig::default();
        config.phases.clear();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(FlowConfig::from_yaml_str(&yaml).is_err());
    }
}
