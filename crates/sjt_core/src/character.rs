//! Visual subject description shared by storyboard and video prompt tools.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Demographic and visual description of the depicted subject.
///
/// Absent fields take defaults; `description` is derived from the other
/// fields by [`CharacterSeed::with_description`] when not supplied.
///
/// # Examples
///
/// ```
/// use sjt_core::CharacterSeed;
///
/// let seed = CharacterSeed::from_json_or_default(Some(r#"{"age": 30, "gender": "男"}"#));
/// assert_eq!(seed.age, "30");
/// assert_eq!(seed.gender, "男");
/// assert_eq!(seed.group, "大学生");
/// assert!(seed.description.contains("30岁"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSeed {
    /// Age, stored as text (datasets supply both numbers and strings)
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    /// Gender
    pub gender: String,
    /// Social group (student, office worker, ...)
    pub group: String,
    /// Nationality
    pub nationality: String,
    /// Hairstyle
    pub hairstyle: String,
    /// Clothing style
    pub clothing: String,
    /// Free-text description
    pub description: String,
}

impl Default for CharacterSeed {
    fn default() -> Self {
        Self {
            age: "23".to_string(),
            gender: "女".to_string(),
            group: "大学生".to_string(),
            nationality: "中国".to_string(),
            hairstyle: "短发".to_string(),
            clothing: "休闲装".to_string(),
            description: String::new(),
        }
    }
}

impl CharacterSeed {
    /// Parse a seed from JSON, using defaults for anything absent.
    ///
    /// Blank input or invalid JSON yields the default seed.
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        let Some(raw) = json.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default().with_description();
        };

        match serde_json::from_str::<CharacterSeed>(raw) {
            Ok(seed) => seed.with_description(),
            Err(e) => {
                warn!(error = %e, "Invalid character seed JSON, using defaults");
                Self::default().with_description()
            }
        }
    }

    /// Fill `description` from the other fields if it is empty.
    pub fn with_description(mut self) -> Self {
        if self.description.trim().is_empty() {
            self.description = format!(
                "一位来自{}、{}岁的{}性{}，发型为{}，穿着{}",
                self.nationality, self.age, self.gender, self.group, self.hairstyle, self.clothing
            );
        }
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
