//! Answer scoring against phase-specific criteria.
//!
//! Each turn the validator scores the trainee's utterance on topical
//! relevance, specificity, and capture extraction, and combines the
//! sub-scores with configuration-driven weights into a composite score
//! plus a sufficiency verdict.

use std::collections::HashMap;

use crate::domain::foundation::Score;

use super::configs::{PhaseConfig, ScoringRules};
use super::extractor::{CaptureStrategy, ExtractedCapture, KeywordAnchoredExtractor};
use super::matcher::FuzzyMatcher;

/// Number of matched focus keywords at which relevance saturates.
const RELEVANCE_SATURATION: f64 = 2.0;

/// Result of validating one utterance.
#[derive(Debug, Clone)]
pub struct Validation {
    /// Composite weighted score.
    pub score: Score,
    /// True when the composite meets the configured sufficiency bar.
    pub sufficient: bool,
    /// Topical-overlap sub-score in [0, 1].
    pub relevance: f64,
    /// Length/detail sub-score in [0, 1].
    pub specificity: f64,
    /// Capture-extraction sub-score in [0, 1].
    pub capture_score: f64,
    /// Captures newly pulled from this utterance.
    pub extracted: Vec<ExtractedCapture>,
}

impl Validation {
    fn zero() -> Self {
        Self {
            score: Score::ZERO,
            sufficient: false,
            relevance: 0.0,
            specificity: 0.0,
            capture_score: 0.0,
            extracted: Vec::new(),
        }
    }
}

/// Scores utterances against the current phase's criteria.
pub struct AnswerValidator {
    scoring: ScoringRules,
    matcher: FuzzyMatcher,
    strategy: Box<dyn CaptureStrategy>,
}

impl AnswerValidator {
    /// Creates a validator with an explicit extraction strategy.
    pub fn new(
        scoring: ScoringRules,
        matcher: FuzzyMatcher,
        strategy: Box<dyn CaptureStrategy>,
    ) -> Self {
        Self {
            scoring,
            matcher,
            strategy,
        }
    }

    /// Creates a validator with the keyword-anchored default strategy.
    pub fn with_default_strategy(scoring: ScoringRules, matcher: FuzzyMatcher) -> Self {
        Self::new(
            scoring,
            matcher,
            Box::new(KeywordAnchoredExtractor::default()),
        )
    }

    /// Scores one utterance against a phase's criteria.
    ///
    /// `existing_captures` is the session's capture map before this turn;
    /// the capture sub-score rewards only keys that were missing and are
    /// newly populated by this utterance. Empty or whitespace-only input
    /// is a zero-score, no-capture turn, never an error.
    pub fn validate(
        &self,
        input: &str,
        phase: &PhaseConfig,
        existing_captures: &HashMap<String, String>,
    ) -> Validation {
        let input = input.trim();
        if input.is_empty() {
            return Validation::zero();
        }

        let relevance = self.relevance(input, phase);
        let specificity = self.specificity(input);
        let extracted = self.strategy.extract(input, &phase.capture_anchors);
        let capture_score = self.capture_score(phase, existing_captures, &extracted);

        let composite = self.scoring.relevance_weight * relevance
            + self.scoring.specificity_weight * specificity
            + self.scoring.capture_weight * capture_score;
        let score = Score::new(composite);

        Validation {
            score,
            sufficient: score.meets(self.scoring.sufficient_threshold),
            relevance,
            specificity,
            capture_score,
            extracted,
        }
    }

    /// Fraction of focus-keyword coverage, saturating at two matches.
    fn relevance(&self, input: &str, phase: &PhaseConfig) -> f64 {
        let matched = phase
            .focus_keywords
            .iter()
            .filter(|keyword| self.matcher.keyword_matches(input, keyword))
            .count();
        (matched as f64 / RELEVANCE_SATURATION).min(1.0)
    }

    /// Length heuristic with diminishing returns.
    ///
    /// Reaches 0.5 at the configured pivot word count and approaches 1.0
    /// asymptotically, so a rambling answer cannot dominate the score.
    fn specificity(&self, input: &str) -> f64 {
        let words = input.split_whitespace().count() as f64;
        let pivot = self.scoring.specificity_pivot_words as f64;
        words / (words + pivot)
    }

    /// Share of still-missing required captures this utterance fills.
    ///
    /// When nothing is missing there is nothing left to extract, so the
    /// sub-score is full rather than penalizing a complete phase.
    fn capture_score(
        &self,
        phase: &PhaseConfig,
        existing: &HashMap<String, String>,
        extracted: &[ExtractedCapture],
    ) -> f64 {
        let missing: Vec<&String> = phase
            .required_captures
            .iter()
            .filter(|key| {
                existing
                    .get(*key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect();

        if missing.is_empty() {
            return 1.0;
        }

        let newly = extracted
            .iter()
            .filter(|c| missing.iter().any(|m| **m == c.key))
            .count();
        newly as f64 / missing.len() as f64
    }
}
