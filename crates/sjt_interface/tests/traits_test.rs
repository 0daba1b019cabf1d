use async_trait::async_trait;
use sjt_core::{GenerateRequest, GenerateResponse, Message, Output};
use sjt_error::SjtResult;
use sjt_interface::{Narrator, NarrationOutcome, TextDriver, ToolDefinition, ToolUse};
use std::path::Path;

struct EchoDriver;

#[async_trait]
impl TextDriver for EchoDriver {
    async fn generate(&self, req: &GenerateRequest) -> SjtResult<GenerateResponse> {
        let last = req
            .messages()
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(GenerateResponse {
            outputs: vec![Output::Text(last)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo-1"
    }
}

#[async_trait]
impl ToolUse for EchoDriver {
    async fn generate_with_tools(
        &self,
        req: &GenerateRequest,
        _tools: &[ToolDefinition],
    ) -> SjtResult<GenerateResponse> {
        self.generate(req).await
    }
}

struct SilentNarrator;

#[async_trait]
impl Narrator for SilentNarrator {
    async fn narrate(
        &self,
        _text: &str,
        _outdir: &Path,
        _target_seconds: Option<u32>,
        _speed: Option<f32>,
    ) -> NarrationOutcome {
        NarrationOutcome::no_audio("offline")
    }
}

#[tokio::test]
async fn test_drivers_are_usable_as_trait_objects() {
    let driver: Box<dyn ToolUse> = Box::new(EchoDriver);
    let request = GenerateRequest::builder()
        .messages(vec![Message::user("hello")])
        .build()
        .unwrap();
    let response = driver.generate_with_tools(&request, &[]).await.unwrap();
    assert_eq!(response.text().as_deref(), Some("hello"));
    assert!(!driver.supports_parallel_tool_calls());
    assert_eq!(driver.provider_name(), "echo");
}

#[tokio::test]
async fn test_no_audio_has_no_path() {
    let outcome = SilentNarrator
        .narrate("text", Path::new("/tmp"), Some(10), None)
        .await;
    assert!(outcome.path().is_none());
    assert_eq!(
        outcome,
        NarrationOutcome::NoAudio {
            reason: "offline".to_string()
        }
    );
}
