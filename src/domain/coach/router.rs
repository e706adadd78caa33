//! Question selection and template rendering.
//!
//! The router owns two decisions: which question text comes next
//! (opening vs. probe, and which probe), and how `{key}` placeholders in
//! the templates are resolved from the session's captures.
//!
//! Placeholder policy: placeholders resolve to the captured value, or to
//! the empty string when no capture exists; the rendered text is then
//! whitespace-normalized and trimmed. Brace characters never survive
//! rendering, so output can never contain an unresolved placeholder
//! token.

use std::collections::HashMap;
use std::sync::Arc;

use super::configs::{FlowConfig, ProbeTemplate};
use super::phase::SalesPhase;

/// Selects question text for the current turn.
#[derive(Clone)]
pub struct QuestionRouter {
    config: Arc<FlowConfig>,
}

impl QuestionRouter {
    /// Creates a router over validated flow configuration.
    pub fn new(config: Arc<FlowConfig>) -> Self {
        Self { config }
    }

    /// Returns the rendered opening question for a phase.
    pub fn opening_question(
        &self,
        phase: SalesPhase,
        captures: &HashMap<String, String>,
    ) -> String {
        render_template(&self.config.phase(phase).opening_question, captures)
    }

    /// Returns the rendered probe question for a phase.
    ///
    /// Selection policy: the first still-missing required capture (in
    /// declaration order) that has a probe targeting it wins; when every
    /// required capture is present but the last answer fell short, a
    /// generic deepening probe is used instead.
    pub fn probe_question(
        &self,
        phase: SalesPhase,
        captures: &HashMap<String, String>,
    ) -> String {
        let phase_config = self.config.phase(phase);

        let targeted = phase_config
            .required_captures
            .iter()
            .filter(|key| {
                captures
                    .get(*key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .find_map(|missing| {
                phase_config
                    .probes
                    .iter()
                    .find(|probe| probe.targets.as_deref() == Some(missing.as_str()))
            });

        let probe = targeted
            .or_else(|| self.generic_probe(&phase_config.probes))
            .or_else(|| phase_config.probes.first());

        match probe {
            Some(p) => render_template(&p.template, captures),
            // Validation guarantees at least one probe per phase; an
            // empty table still degrades to the opening question.
            None => self.opening_question(phase, captures),
        }
    }

    /// Returns the rendered completion message for the end of the flow.
    pub fn completion_message(&self, captures: &HashMap<String, String>) -> String {
        render_template(&self.config.completion_message, captures)
    }

    fn generic_probe<'a>(&self, probes: &'a [ProbeTemplate]) -> Option<&'a ProbeTemplate> {
        probes.iter().find(|probe| probe.targets.is_none())
    }
}

/// Renders `{key}` placeholders from the capture map.
///
/// Missing keys resolve to the empty string; output is collapsed to
/// single spaces and trimmed. Stray brace characters are dropped.
pub fn render_template(template: &str, captures: &HashMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    key.push(inner);
                }
                if closed {
                    if let Some(value) = captures.get(key.trim()) {
                        rendered.push_str(value);
                    }
                }
                // An unterminated or unknown placeholder renders as
                // nothing at all.
            }
            '}' => {}
            _ => rendered.push(c),
        }
    }

    tidy(&rendered)
}

/// Collapses runs of whitespace and fixes space-before-punctuation left
/// behind by empty substitutions.
fn tidy(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace(" ,", ",")
        .replace(" .", ".")
        .replace(" ;", ";")
        .replace(" ?", "?")
        .replace(" !", "!")
        .trim()
        .to_string()
}
