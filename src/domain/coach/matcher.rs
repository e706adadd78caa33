//! Fuzzy keyword matching for intents, objections, and buying signals.
//!
//! All detection is approximate string similarity: case-insensitive,
//! tolerant of small typos, scored as a partial-match ratio on a 0-100
//! scale. A keyword matches when the best-scoring window of the input
//! reaches the configured threshold. Pure functions of (text, keyword
//! configuration); no state is held beyond the threshold.

use serde::{Deserialize, Serialize};

use super::configs::{IntentDefinition, ObjectionKeywords};

/// Categories of objection the matcher scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionCategory {
    /// "Too expensive", budget pushback.
    PriceSensitivity,
    /// "Not now", "too busy", timing pushback.
    TimeConstraint,
    /// "I have to ask my boss/partner."
    AuthorityDeferral,
    /// "We already use X."
    CompetitorPreference,
    /// "Does this actually work?"
    Skepticism,
}

impl ObjectionCategory {
    /// All categories in scan order.
    pub const ALL: [ObjectionCategory; 5] = [
        ObjectionCategory::PriceSensitivity,
        ObjectionCategory::TimeConstraint,
        ObjectionCategory::AuthorityDeferral,
        ObjectionCategory::CompetitorPreference,
        ObjectionCategory::Skepticism,
    ];
}

/// A detected intent with the score that crossed the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
    /// Name of the matched intent category.
    pub intent: String,
    /// Best keyword ratio for that category, normalized to [0, 1].
    pub confidence: f64,
}

/// A detected objection with its confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectionSignal {
    /// The objection category.
    pub category: ObjectionCategory,
    /// Match ratio normalized to [0, 1].
    pub confidence: f64,
}

/// Approximate keyword matcher.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    /// Minimum partial-match ratio (0-100) for a keyword to count.
    threshold: u8,
}

impl FuzzyMatcher {
    /// Default match threshold on the 0-100 ratio scale.
    pub const DEFAULT_THRESHOLD: u8 = 70;

    /// Creates a matcher with the given ratio threshold.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Finds the first intent category whose best keyword score reaches
    /// the threshold.
    ///
    /// Categories are tried in declaration order; the first to qualify
    /// wins, regardless of whether a later category would score higher.
    pub fn match_intent(&self, text: &str, intents: &[IntentDefinition]) -> Option<IntentMatch> {
        let text = normalize(text);
        if text.is_empty() {
            return None;
        }
        for intent in intents {
            let best = self.best_keyword_ratio(&text, &intent.keywords);
            if best >= self.threshold {
                return Some(IntentMatch {
                    intent: intent.name.clone(),
                    confidence: f64::from(best) / 100.0,
                });
            }
        }
        None
    }

    /// Scans all objection categories and returns every one whose best
    /// keyword score reaches the threshold, tagged with its confidence.
    pub fn detect_objections(
        &self,
        text: &str,
        objections: &ObjectionKeywords,
    ) -> Vec<ObjectionSignal> {
        let text = normalize(text);
        if text.is_empty() {
            return Vec::new();
        }
        ObjectionCategory::ALL
            .iter()
            .filter_map(|&category| {
                let best = self.best_keyword_ratio(&text, objections.keywords_for(category));
                if best >= self.threshold {
                    Some(ObjectionSignal {
                        category,
                        confidence: f64::from(best) / 100.0,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Returns true if the text signals readiness to move forward.
    pub fn detect_transition_readiness(&self, text: &str, keywords: &[String]) -> bool {
        let text = normalize(text);
        !text.is_empty() && self.best_keyword_ratio(&text, keywords) >= self.threshold
    }

    /// Best partial-match ratio (0-100) of one keyword against the text.
    pub fn keyword_ratio(&self, text: &str, keyword: &str) -> u8 {
        partial_ratio(&normalize(keyword), &normalize(text))
    }

    /// Returns true if the keyword's best ratio reaches the threshold.
    pub fn keyword_matches(&self, text: &str, keyword: &str) -> bool {
        self.keyword_ratio(text, keyword) >= self.threshold
    }

    fn best_keyword_ratio(&self, normalized_text: &str, keywords: &[String]) -> u8 {
        keywords
            .iter()
            .map(|k| partial_ratio(&normalize(k), normalized_text))
            .max()
            .unwrap_or(0)
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Best similarity (0-100) of `keyword` against any same-length window
/// of `text`.
///
/// Both inputs are expected to be normalized already. An exact substring
/// scores 100 without touching the edit-distance matrix.
fn partial_ratio(keyword: &str, text: &str) -> u8 {
    if keyword.is_empty() || text.is_empty() {
        return 0;
    }
    if text.contains(keyword) {
        return 100;
    }

    let keyword_chars: Vec<char> = keyword.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    if keyword_chars.len() >= text_chars.len() {
        return similarity_ratio(&keyword_chars, &text_chars);
    }

    let window = keyword_chars.len();
    let mut best = 0u8;
    for start in 0..=(text_chars.len() - window) {
        let ratio = similarity_ratio(&keyword_chars, &text_chars[start..start + window]);
        if ratio > best {
            best = ratio;
            if best == 100 {
                break;
            }
        }
    }
    best
}

fn similarity_ratio(a: &[char], b: &[char]) -> u8 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100;
    }
    let distance = levenshtein_distance(a, b);
    let similarity = 1.0 - (distance as f64 / max_len as f64);
    (similarity.max(0.0) * 100.0).round() as u8
}

/// Simple Levenshtein distance implementation.
fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}
