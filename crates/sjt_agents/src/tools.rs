//! Text-model backed generation and reflection tools.
//!
//! Each tool sends one system + user request and parses the answer. Malformed
//! answers never fail a tool: the raw text is kept under a `*_raw` field and
//! the input is carried forward. Only transport failures and empty answers
//! surface as errors.

use crate::extraction::{parse_json, strip_fences};
use crate::prompts;
use crate::roles::ToolName;
use serde_json::{Value, json};
use sjt_core::{Cue, CueSet, GenerateRequest, ReflectionVerdict, Storyboard};
use sjt_error::{AgentError, AgentErrorKind, JsonError, SjtResult};
use sjt_interface::TextDriver;
use sjt_media::CharacterStore;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Result of one generation or reflection tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Output of `get_cues`
    Cues(CueSet),
    /// Output of `generate_storyboard`
    Storyboard(Storyboard),
    /// Output of `generate_video_prompt`
    VideoPrompt(String),
    /// Output of any reflection tool
    Verdict(ReflectionVerdict),
}

impl ToolOutput {
    /// Text returned to the calling role.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured output cannot be serialized.
    pub fn to_content(&self) -> SjtResult<String> {
        let serialized = match self {
            ToolOutput::Cues(cues) => serde_json::to_string(cues),
            ToolOutput::Storyboard(storyboard) => serde_json::to_string(storyboard),
            ToolOutput::VideoPrompt(text) => return Ok(text.clone()),
            ToolOutput::Verdict(verdict) => serde_json::to_string(verdict),
        };
        serialized
            .map_err(|e| JsonError::new(format!("Failed to serialize tool output: {}", e)).into())
    }
}

/// The six generation and reflection tools.
#[derive(Clone)]
pub struct GenerationTools {
    driver: Arc<dyn TextDriver>,
    characters: CharacterStore,
    temperature: Option<f32>,
}

impl std::fmt::Debug for GenerationTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationTools")
            .field("provider", &self.driver.provider_name())
            .field("model", &self.driver.model_name())
            .field("characters", &self.characters)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GenerationTools {
    /// Tools backed by `driver`, reading character features from `characters`.
    pub fn new(driver: Arc<dyn TextDriver>, characters: CharacterStore) -> Self {
        Self {
            driver,
            characters,
            temperature: None,
        }
    }

    /// Override the sampling temperature of every tool request.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Run a generation or reflection tool by name.
    ///
    /// # Errors
    ///
    /// Returns an error for handoff tools, transport failures and empty answers.
    pub async fn invoke(&self, tool: ToolName, argument: &str) -> SjtResult<ToolOutput> {
        let output = match tool {
            ToolName::GetCues => ToolOutput::Cues(self.get_cues(argument).await?),
            ToolName::ReflectCues => ToolOutput::Verdict(self.reflect_cues(argument).await?),
            ToolName::GenerateStoryboard => {
                ToolOutput::Storyboard(self.generate_storyboard(argument).await?)
            }
            ToolName::ReflectStoryboard => {
                ToolOutput::Verdict(self.reflect_storyboard(argument).await?)
            }
            ToolName::GenerateVideoPrompt => {
                ToolOutput::VideoPrompt(self.generate_video_prompt(argument).await?)
            }
            ToolName::ReflectVideoPrompt => {
                ToolOutput::Verdict(self.reflect_video_prompt(argument).await?)
            }
            ToolName::TransferToStoryboard | ToolName::TransferToVideo => {
                return Err(AgentError::new(AgentErrorKind::InvalidArguments {
                    tool: tool.to_string(),
                    message: "handoffs are executed by the orchestrator".to_string(),
                })
                .into());
            }
        };
        Ok(output)
    }

    /// Extract cues from the situation text.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns nothing.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn get_cues(&self, text: &str) -> SjtResult<CueSet> {
        let raw = self
            .complete(ToolName::GetCues, prompts::GET_CUES, text.to_string())
            .await?;
        let cues = cue_set_from_output(text, &raw);
        debug!(
            cue_count = cues.cues.len(),
            degraded = cues.cues_raw.is_some(),
            "Cues extracted"
        );
        Ok(cues)
    }

    /// Review a cue set.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns nothing.
    #[instrument(skip_all)]
    pub async fn reflect_cues(&self, cues_text: &str) -> SjtResult<ReflectionVerdict> {
        self.reflect(ToolName::ReflectCues, prompts::REFLECT_CUES, cues_text)
            .await
    }

    /// Compose a storyboard from cue JSON and the stored character features.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns nothing.
    #[instrument(skip_all)]
    pub async fn generate_storyboard(&self, cues_data: &str) -> SjtResult<Storyboard> {
        let user = json!({
            "role_features": self.characters.load_value(),
            "cues_data": cues_data,
        })
        .to_string();
        let raw = self
            .complete(ToolName::GenerateStoryboard, prompts::GENERATE_STORYBOARD, user)
            .await?;
        let (source_text, cues) = cue_input(cues_data);
        let storyboard = storyboard_from_output(source_text, cues, &raw);
        debug!(degraded = storyboard.is_degraded(), "Storyboard composed");
        Ok(storyboard)
    }

    /// Review a storyboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns nothing.
    #[instrument(skip_all)]
    pub async fn reflect_storyboard(&self, storyboard_data: &str) -> SjtResult<ReflectionVerdict> {
        self.reflect(
            ToolName::ReflectStoryboard,
            prompts::REFLECT_STORYBOARD,
            storyboard_data,
        )
        .await
    }

    /// Write the final video prompt from storyboard JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns only whitespace.
    #[instrument(skip_all)]
    pub async fn generate_video_prompt(&self, storyboard_data: &str) -> SjtResult<String> {
        let user = json!({
            "role_features": self.characters.load_value(),
            "core_video_prompt": core_prompt_input(storyboard_data),
        })
        .to_string();
        let raw = self
            .complete(
                ToolName::GenerateVideoPrompt,
                prompts::GENERATE_VIDEO_PROMPT,
                user,
            )
            .await?;
        let prompt = strip_fences(&raw);
        if prompt.is_empty() {
            return Err(AgentError::new(AgentErrorKind::EmptyResponse(
                ToolName::GenerateVideoPrompt.to_string(),
            ))
            .into());
        }
        debug!(prompt_len = prompt.chars().count(), "Video prompt written");
        Ok(prompt)
    }

    /// Review a video prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails or returns nothing.
    #[instrument(skip_all)]
    pub async fn reflect_video_prompt(
        &self,
        video_prompt_data: &str,
    ) -> SjtResult<ReflectionVerdict> {
        self.reflect(
            ToolName::ReflectVideoPrompt,
            prompts::REFLECT_VIDEO_PROMPT,
            video_prompt_data,
        )
        .await
    }

    async fn reflect(
        &self,
        tool: ToolName,
        system: &str,
        reviewed: &str,
    ) -> SjtResult<ReflectionVerdict> {
        let raw = self.complete(tool, system, reviewed.to_string()).await?;
        let verdict = verdict_from_output(&raw, reviewed);
        if !verdict.pass {
            warn!(%tool, correction = %verdict.correct, "Reflection did not pass");
        }
        Ok(verdict)
    }

    async fn complete(&self, tool: ToolName, system: &str, user: String) -> SjtResult<String> {
        let request =
            GenerateRequest::system_user(system, user).with_temperature(self.temperature);
        let response = self.driver.generate(&request).await?;
        response.text().ok_or_else(|| {
            AgentError::new(AgentErrorKind::EmptyResponse(tool.to_string())).into()
        })
    }
}

fn cues_from_items(items: Vec<Value>) -> Option<Vec<Cue>> {
    serde_json::from_value(Value::Array(items)).ok()
}

/// Build a cue set from a `get_cues` answer.
///
/// Accepts a bare array of cues or an object with a `cues` array.
pub(crate) fn cue_set_from_output(source_text: &str, raw: &str) -> CueSet {
    let items = match parse_json(raw) {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => match map.remove("cues") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => return CueSet::unparsed(source_text, raw),
    };
    match cues_from_items(items) {
        Some(cues) => CueSet::new(source_text, cues),
        None => CueSet::unparsed(source_text, raw),
    }
}

/// Source text and cues from a `cues_data` argument.
///
/// Input that is not JSON is carried forward as the source text.
pub(crate) fn cue_input(cues_data: &str) -> (String, Vec<Cue>) {
    match parse_json(cues_data) {
        Some(Value::Object(mut map)) => {
            let source_text = match map.remove("source_text") {
                Some(Value::String(text)) => text,
                _ => String::new(),
            };
            let cues = match map.remove("cues") {
                Some(Value::Array(items)) => cues_from_items(items).unwrap_or_default(),
                _ => Vec::new(),
            };
            (source_text, cues)
        }
        Some(Value::Array(items)) => (String::new(), cues_from_items(items).unwrap_or_default()),
        _ => (cues_data.trim().to_string(), Vec::new()),
    }
}

fn core_prompt_field(value: &Value) -> Option<&str> {
    value
        .get("core_video_prompt")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("storyboard")
                .and_then(|board| board.get("core_video_prompt"))
                .and_then(Value::as_str)
        })
        .filter(|text| !text.trim().is_empty())
}

/// Build a storyboard from a `generate_storyboard` answer.
pub(crate) fn storyboard_from_output(source_text: String, cues: Vec<Cue>, raw: &str) -> Storyboard {
    match parse_json(raw).as_ref().and_then(core_prompt_field) {
        Some(prompt) => Storyboard::composed(source_text, cues, prompt),
        None => Storyboard::unparsed(source_text, cues, raw),
    }
}

/// The narrative inside a `storyboard_data` argument, or the whole argument.
pub(crate) fn core_prompt_input(storyboard_data: &str) -> String {
    parse_json(storyboard_data)
        .as_ref()
        .and_then(core_prompt_field)
        .map(str::to_string)
        .unwrap_or_else(|| storyboard_data.trim().to_string())
}

/// Build a verdict from a reflection answer.
pub(crate) fn verdict_from_output(raw: &str, reviewed: &str) -> ReflectionVerdict {
    match parse_json(raw) {
        Some(value @ Value::Object(_)) => match serde_json::from_value::<ReflectionVerdict>(value)
        {
            Ok(verdict) => verdict.normalized(),
            Err(e) => {
                debug!(error = %e, "Reflection JSON did not match the verdict shape");
                ReflectionVerdict::unparsed(raw, reviewed)
            }
        },
        _ => ReflectionVerdict::unparsed(raw, reviewed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sjt_core::Importance;

    #[test]
    fn test_cues_from_object() {
        let raw = r#"```json
{"cues": [{"cue_id": "cue1", "type": "环境", "content": "群聊", "importance": "高", "reason": "r"}]}
```"#;
        let set = cue_set_from_output("stem", raw);
        assert_eq!(set.source_text, "stem");
        assert_eq!(set.cues.len(), 1);
        assert_eq!(set.cues[0].importance, Importance::High);
        assert!(set.cues_raw.is_none());
    }

    #[test]
    fn test_cues_from_bare_list() {
        let set = cue_set_from_output("stem", r#"[{"content": "a"}, {"content": "b"}]"#);
        let ids: Vec<_> = set.cues.iter().map(|c| c.cue_id.as_str()).collect();
        assert_eq!(ids, vec!["cue1", "cue2"]);
    }

    #[test]
    fn test_object_without_cues_is_empty() {
        let set = cue_set_from_output("stem", r#"{"note": "nothing found"}"#);
        assert!(set.cues.is_empty());
        assert!(set.cues_raw.is_none());
    }

    #[test]
    fn test_malformed_cues_keep_raw() {
        let set = cue_set_from_output("stem", "I could not find cues");
        assert_eq!(set.source_text, "stem");
        assert_eq!(set.cues_raw.as_deref(), Some("I could not find cues"));
    }

    #[test]
    fn test_cue_input_carries_unparsed_text() {
        let (source, cues) = cue_input("just prose");
        assert_eq!(source, "just prose");
        assert!(cues.is_empty());

        let (source, cues) =
            cue_input(r#"{"source_text": "stem", "cues": [{"cue_id": "c", "content": "x"}]}"#);
        assert_eq!(source, "stem");
        assert_eq!(cues[0].cue_id, "c");
    }

    #[test]
    fn test_storyboard_nested_or_flat() {
        let flat =
            storyboard_from_output("s".into(), vec![], r#"{"core_video_prompt": "walks in"}"#);
        let nested = storyboard_from_output(
            "s".into(),
            vec![],
            r#"{"storyboard": {"core_video_prompt": "walks in"}}"#,
        );
        assert_eq!(flat, nested);
        assert!(!flat.is_degraded());
    }

    #[test]
    fn test_core_prompt_input_fallbacks() {
        assert_eq!(
            core_prompt_input(r#"{"storyboard": {"core_video_prompt": "x"}}"#),
            "x"
        );
        assert_eq!(core_prompt_input(r#"{"other": 1}"#), r#"{"other": 1}"#);
        assert_eq!(core_prompt_input("  free text "), "free text");
    }

    #[test]
    fn test_verdict_wrong_shape_is_unparsed() {
        let verdict = verdict_from_output(r#"{"pass": "maybe"}"#, "input");
        assert!(!verdict.pass);
        assert_eq!(verdict.reviewed.as_deref(), Some("input"));
        assert!(verdict.verdict_raw.is_some());
    }
}
