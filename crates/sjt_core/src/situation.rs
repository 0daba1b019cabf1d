//! Situation records as loaded from SJT datasets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sjt_error::{SjtResult, ValidationError};

/// Option id → option text, kept exactly as supplied.
pub type OptionMap = Map<String, Value>;

/// Keys that carry the situation text, in order of preference.
const TEXT_KEYS: [&str; 3] = ["stem", "situation", "context"];

/// Keys never treated as situation text.
const NON_TEXT_KEYS: [&str; 2] = ["options", "scoring"];

/// One SJT stimulus.
///
/// Datasets disagree on field names, so the record is kept open: `options`
/// is lifted out and everything else stays in `fields`.
///
/// # Examples
///
/// ```
/// use sjt_core::Situation;
/// use serde_json::json;
///
/// let situ: Situation = serde_json::from_value(json!({
///     "stem": "A colleague takes credit for your work.",
///     "options": {"A": "Confront them", "B": "Say nothing"}
/// })).unwrap();
///
/// assert_eq!(situ.narrative_text().unwrap(), "A colleague takes credit for your work.");
/// assert_eq!(situ.options.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Situation {
    /// Response options
    #[serde(default)]
    pub options: OptionMap,
    /// Every other field of the record
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Situation {
    /// Build a situation from a stem and options.
    pub fn from_stem(stem: impl Into<String>, options: OptionMap) -> Self {
        let mut fields = Map::new();
        fields.insert("stem".to_string(), Value::String(stem.into()));
        Self { options, fields }
    }

    /// The text that drives generation.
    ///
    /// Uses the first present of `stem`, `situation`, `context`; otherwise the
    /// first string field that is not `options` or `scoring`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when no non-empty text is found.
    pub fn narrative_text(&self) -> SjtResult<String> {
        let candidate = match TEXT_KEYS.iter().find_map(|key| self.fields.get(*key)) {
            Some(value) => value.as_str().map(str::to_string),
            None => self
                .fields
                .iter()
                .filter(|(key, _)| !NON_TEXT_KEYS.contains(&key.as_str()))
                .find_map(|(_, value)| value.as_str().map(str::to_string)),
        };

        match candidate {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(
                ValidationError::new("No usable situation text (stem/situation/context)").into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn situation(value: Value) -> Situation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_stem_preferred_over_other_keys() {
        let situ = situation(json!({"context": "ctx", "stem": "stem text"}));
        assert_eq!(situ.narrative_text().unwrap(), "stem text");
    }

    #[test]
    fn test_situation_key_used_without_stem() {
        let situ = situation(json!({"situation": "at the library"}));
        assert_eq!(situ.narrative_text().unwrap(), "at the library");
    }

    #[test]
    fn test_falls_back_to_first_string_field() {
        let situ = situation(json!({
            "scoring": "A=1",
            "id": 7,
            "description": "group chat screenshot",
            "options": {"A": "laugh along"}
        }));
        assert_eq!(situ.narrative_text().unwrap(), "group chat screenshot");
    }

    #[test]
    fn test_empty_stem_is_rejected() {
        let situ = situation(json!({"stem": "   ", "description": "ignored"}));
        assert!(situ.narrative_text().is_err());
    }

    #[test]
    fn test_no_text_is_rejected() {
        let situ = situation(json!({"options": {"A": "x"}, "scoring": "A=1"}));
        assert!(situ.narrative_text().is_err());
    }
}
