//! Cue extraction records.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How much a cue matters for the depicted situation.
///
/// Models answer in several languages; anything unrecognised is kept
/// verbatim in [`Importance::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Importance {
    /// High importance
    High,
    /// Medium importance
    Medium,
    /// Low importance
    Low,
    /// Not given
    #[default]
    Unspecified,
    /// Any other label
    Other(String),
}

impl From<String> for Importance {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().as_str() {
            "高" | "high" | "h" => Importance::High,
            "中" | "medium" | "mid" | "m" => Importance::Medium,
            "低" | "low" | "l" => Importance::Low,
            "" => Importance::Unspecified,
            _ => Importance::Other(label),
        }
    }
}

impl From<Importance> for String {
    fn from(importance: Importance) -> Self {
        match importance {
            Importance::High => "high".to_string(),
            Importance::Medium => "medium".to_string(),
            Importance::Low => "low".to_string(),
            Importance::Unspecified => String::new(),
            Importance::Other(label) => label,
        }
    }
}

/// An atomic, source-grounded fact extracted from situation text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cue {
    /// Identifier, unique within a [`CueSet`]
    #[serde(alias = "id")]
    pub cue_id: String,
    /// Cue category (environment, core event, conflict, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// The extracted text
    pub content: String,
    /// Importance label
    pub importance: Importance,
    /// Where in the source text this cue comes from
    pub reason: String,
}

/// Output of cue extraction.
///
/// `cues_raw` is only present when the model output could not be parsed;
/// `source_text` is always the text that was analysed.
///
/// # Examples
///
/// ```
/// use sjt_core::CueSet;
///
/// let degraded = CueSet::unparsed("the stem", "not json at all");
/// assert!(degraded.is_degraded());
/// assert_eq!(degraded.source_text, "the stem");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CueSet {
    /// The analysed situation text
    pub source_text: String,
    /// Extracted cues, in model order
    #[serde(default)]
    pub cues: Vec<Cue>,
    /// Raw model output when it was not valid JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cues_raw: Option<String>,
}

impl CueSet {
    /// A parsed cue set with ids made unique.
    pub fn new(source_text: impl Into<String>, cues: Vec<Cue>) -> Self {
        Self {
            source_text: source_text.into(),
            cues: assign_unique_ids(cues),
            cues_raw: None,
        }
    }

    /// A degraded cue set carrying the unparseable model output.
    pub fn unparsed(source_text: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            cues: Vec::new(),
            cues_raw: Some(raw.into()),
        }
    }

    /// True when extraction produced nothing usable.
    pub fn is_degraded(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Fill empty ids with `cue<n>` and suffix repeated ids.
fn assign_unique_ids(cues: Vec<Cue>) -> Vec<Cue> {
    let mut seen = HashSet::new();
    cues.into_iter()
        .enumerate()
        .map(|(index, mut cue)| {
            if cue.cue_id.trim().is_empty() {
                cue.cue_id = format!("cue{}", index + 1);
            }
            let base = cue.cue_id.clone();
            let mut suffix = 2;
            while !seen.insert(cue.cue_id.clone()) {
                cue.cue_id = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            cue
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cue_accepts_model_field_names() {
        let cue: Cue = serde_json::from_value(json!({
            "cue_id": "cue1",
            "type": "环境",
            "content": "a crowded group chat",
            "importance": "高",
            "reason": "题目中说明：群聊"
        }))
        .unwrap();
        assert_eq!(cue.kind, "环境");
        assert_eq!(cue.importance, Importance::High);
    }

    #[test]
    fn test_unknown_importance_is_preserved() {
        let cue: Cue = serde_json::from_value(json!({"importance": "critical"})).unwrap();
        assert_eq!(cue.importance, Importance::Other("critical".to_string()));
        let back = serde_json::to_value(&cue).unwrap();
        assert_eq!(back["importance"], "critical");
    }

    #[test]
    fn test_ids_are_made_unique() {
        let cues = vec![
            Cue { cue_id: "cue1".into(), ..Cue::default() },
            Cue { cue_id: "cue1".into(), ..Cue::default() },
            Cue::default(),
        ];
        let set = CueSet::new("text", cues);
        let ids: Vec<_> = set.cues.iter().map(|c| c.cue_id.as_str()).collect();
        assert_eq!(ids, vec!["cue1", "cue1_2", "cue3"]);
    }

    #[test]
    fn test_raw_field_skipped_when_parsed() {
        let set = CueSet::new("text", vec![]);
        let value = serde_json::to_value(&set).unwrap();
        assert!(value.get("cues_raw").is_none());
    }
}
