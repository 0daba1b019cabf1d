//! Self-critique verdicts produced by reflection tools.

use serde::{Deserialize, Serialize};

const MISSING_NOTE: &str = "Verdict failed without a corrective note";
const UNPARSED_NOTE: &str = "Reflection output could not be parsed";

/// Alignment of one cue with the identified trait.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CueAlignment {
    /// Cue under review
    pub cue_id: String,
    /// Whether the cue supports the trait
    pub aligned: bool,
    /// Explanation
    pub reason: String,
}

/// Result of a reflection step.
///
/// Verdicts are advisory: they are recorded, never used to gate a handoff.
/// A failing verdict always carries a non-empty `correct` note; see
/// [`ReflectionVerdict::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionVerdict {
    /// Trait the reviewer identified, with its justification
    #[serde(rename = "trait")]
    pub identified_trait: String,
    /// Agreement with the trait identified at cue reflection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_with_cues: Option<bool>,
    /// Per-cue alignment
    pub alignment_check: Vec<CueAlignment>,
    /// Whether every cue the trait needs was covered
    pub coverage_reflection: String,
    /// How the prompt expresses the trait (video prompt reflection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_expression: Option<String>,
    /// Whether content was added beyond the cues (video prompt reflection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storyboard_standard: Option<String>,
    /// Overall verdict
    pub pass: bool,
    /// Corrective note
    #[serde(alias = "correction")]
    pub correct: String,
    /// Raw model output when it was not valid JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict_raw: Option<String>,
    /// The reviewed input, kept when the output could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<String>,
}

impl ReflectionVerdict {
    /// Ensure a failing verdict has a corrective note.
    ///
    /// # Examples
    ///
    /// ```
    /// use sjt_core::ReflectionVerdict;
    ///
    /// let verdict = ReflectionVerdict {
    ///     pass: false,
    ///     coverage_reflection: "the crowd reaction is missing".to_string(),
    ///     ..Default::default()
    /// }
    /// .normalized();
    /// assert_eq!(verdict.correct, "the crowd reaction is missing");
    /// ```
    pub fn normalized(mut self) -> Self {
        if !self.pass && self.correct.trim().is_empty() {
            self.correct = [
                self.storyboard_standard.as_deref(),
                Some(self.coverage_reflection.as_str()),
            ]
            .into_iter()
            .flatten()
            .find(|note| !note.trim().is_empty())
            .unwrap_or(MISSING_NOTE)
            .to_string();
        }
        self
    }

    /// A failing verdict for output that could not be parsed.
    pub fn unparsed(raw: impl Into<String>, reviewed: impl Into<String>) -> Self {
        Self {
            pass: false,
            correct: UNPARSED_NOTE.to_string(),
            verdict_raw: Some(raw.into()),
            reviewed: Some(reviewed.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_model_verdict() {
        let verdict: ReflectionVerdict = serde_json::from_value(json!({
            "trait": "神经质：对他人评价敏感",
            "consistency_with_cues": true,
            "alignment_check": [{"cue_id": "cue1", "aligned": true, "reason": "ok"}],
            "coverage_reflection": "complete",
            "pass": true,
            "correct": "accurate"
        }))
        .unwrap();
        assert!(verdict.pass);
        assert_eq!(verdict.alignment_check.len(), 1);
        assert_eq!(verdict.consistency_with_cues, Some(true));
    }

    #[test]
    fn test_failing_verdict_gets_default_note() {
        let verdict = ReflectionVerdict::default().normalized();
        assert!(!verdict.pass);
        assert_eq!(verdict.correct, MISSING_NOTE);
    }

    #[test]
    fn test_passing_verdict_note_untouched() {
        let verdict = ReflectionVerdict {
            pass: true,
            ..Default::default()
        }
        .normalized();
        assert!(verdict.correct.is_empty());
    }

    #[test]
    fn test_unparsed_verdict_fails_with_note() {
        let verdict = ReflectionVerdict::unparsed("???", "{\"cues\": []}");
        assert!(!verdict.pass);
        assert!(!verdict.correct.is_empty());
        assert_eq!(verdict.reviewed.as_deref(), Some("{\"cues\": []}"));
    }
}
