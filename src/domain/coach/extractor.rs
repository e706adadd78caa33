//! Heuristic capture extraction from free text.
//!
//! Extraction is keyword-anchored slicing, not a parse: when an anchor
//! keyword appears in the utterance, everything after it becomes the
//! captured value; if the anchor ends the utterance, the whole trimmed
//! utterance is stored instead. The documented failure mode is storing
//! an overly broad value on ambiguous input. The strategy trait exists
//! so a better extractor can be swapped in without touching
//! orchestration.

use std::collections::BTreeMap;

/// A fact pulled out of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCapture {
    /// Semantic key the fact is stored under.
    pub key: String,
    /// The captured value, normalized to lowercase.
    pub value: String,
}

/// Strategy for extracting capture values from free text.
pub trait CaptureStrategy: Send + Sync {
    /// Extracts values for the given anchor table from one utterance.
    ///
    /// `anchors` maps capture keys to the keywords that anchor them.
    /// Keys without a matching anchor in the text produce no capture.
    fn extract(
        &self,
        text: &str,
        anchors: &BTreeMap<String, Vec<String>>,
    ) -> Vec<ExtractedCapture>;
}

/// Keyword-anchored slicing extractor.
///
/// Matching is a case-insensitive substring search over the utterance;
/// values are taken from the lowercased text, so captured values are
/// lowercase by construction.
#[derive(Debug, Clone)]
pub struct KeywordAnchoredExtractor {
    /// Maximum stored value length in characters.
    max_value_chars: usize,
}

impl KeywordAnchoredExtractor {
    /// Default cap on captured value length.
    pub const DEFAULT_MAX_VALUE_CHARS: usize = 160;

    /// Creates an extractor with the given value-length cap.
    pub fn new(max_value_chars: usize) -> Self {
        Self {
            max_value_chars: max_value_chars.max(1),
        }
    }

    fn slice_after_anchor(&self, text: &str, anchor: &str) -> Option<String> {
        let position = text.find(anchor)?;
        let after = text[position + anchor.len()..]
            .trim_start_matches([',', ':', ';', '-', ' '])
            .trim();
        let value = if after.is_empty() { text.trim() } else { after };
        Some(value.chars().take(self.max_value_chars).collect())
    }
}

impl Default for KeywordAnchoredExtractor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_VALUE_CHARS)
    }
}

impl CaptureStrategy for KeywordAnchoredExtractor {
    fn extract(
        &self,
        text: &str,
        anchors: &BTreeMap<String, Vec<String>>,
    ) -> Vec<ExtractedCapture> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }

        let mut captures = Vec::new();
        for (key, keywords) in anchors {
            // Earliest anchor occurrence wins for each key.
            let best = keywords
                .iter()
                .filter_map(|keyword| {
                    let anchor = keyword.to_lowercase();
                    lowered.find(&anchor).map(|pos| (pos, anchor))
                })
                .min_by_key(|(pos, _)| *pos);

            if let Some((_, anchor)) = best {
                if let Some(value) = self.slice_after_anchor(&lowered, &anchor) {
                    if !value.is_empty() {
                        captures.push(ExtractedCapture {
                            key: key.clone(),
                            value,
                        });
                    }
                }
            }
        }
        captures
    }
}
