//! Classification of trait labels into Big Five output directories.

use serde::{Deserialize, Serialize};

/// Directory classes for generated stimuli.
///
/// # Examples
///
/// ```
/// use sjt_core::TraitDomain;
///
/// assert_eq!(TraitDomain::from_label("宜人性"), TraitDomain::Agreeableness);
/// assert_eq!(TraitDomain::from_label("N4"), TraitDomain::Neuroticism);
/// assert_eq!(TraitDomain::from_label("openness"), TraitDomain::Openness);
/// assert_eq!(TraitDomain::from_label("curiosity"), TraitDomain::Misc);
/// assert_eq!(TraitDomain::Misc.to_string(), "Misc");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TraitDomain {
    /// 开放性
    Openness,
    /// 尽责性
    Conscientiousness,
    /// 外向性
    Extraversion,
    /// 宜人性
    Agreeableness,
    /// 神经质
    Neuroticism,
    /// Anything unclassified
    Misc,
}

impl TraitDomain {
    /// Classify a trait label.
    ///
    /// Accepts Chinese domain names, English domain names (any case) and
    /// NEO-PI-R facet codes such as `N4` or `E1`.
    pub fn from_label(label: &str) -> Self {
        let key = label.trim();
        match key {
            "外向性" | "外倾性" => return TraitDomain::Extraversion,
            "开放" | "开放性" => return TraitDomain::Openness,
            "责任心" | "尽责性" => return TraitDomain::Conscientiousness,
            "宜人" | "宜人性" => return TraitDomain::Agreeableness,
            "神经质" | "情绪不稳定" => return TraitDomain::Neuroticism,
            _ => {}
        }

        if let Ok(domain) = key.parse::<TraitDomain>() {
            return domain;
        }

        Self::from_facet_code(key).unwrap_or(TraitDomain::Misc)
    }

    fn from_facet_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match letter {
            'O' => Some(TraitDomain::Openness),
            'C' => Some(TraitDomain::Conscientiousness),
            'E' => Some(TraitDomain::Extraversion),
            'A' => Some(TraitDomain::Agreeableness),
            'N' => Some(TraitDomain::Neuroticism),
            _ => None,
        }
    }

    /// Directory name under the output root.
    pub fn dir_name(&self) -> &str {
        self.as_ref()
    }
}
