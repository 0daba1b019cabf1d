//! Trait definitions for text models and media backends.

use crate::{NarrationOutcome, RenderedVideo, ToolDefinition};
use async_trait::async_trait;
use sjt_core::{GenerateRequest, GenerateResponse};
use sjt_error::SjtResult;
use std::path::Path;

/// Core trait that all text-generation backends must implement.
#[async_trait]
pub trait TextDriver: Send + Sync {
    /// Generate model output for a request.
    async fn generate(&self, req: &GenerateRequest) -> SjtResult<GenerateResponse>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gpt-4o").
    fn model_name(&self) -> &str;
}

/// Trait for models that support function/tool calling.
#[async_trait]
pub trait ToolUse: TextDriver {
    /// Generate with available tools.
    ///
    /// The response may contain tool calls (in `Output::ToolCalls`) instead of
    /// or in addition to text output.
    async fn generate_with_tools(
        &self,
        req: &GenerateRequest,
        tools: &[ToolDefinition],
    ) -> SjtResult<GenerateResponse>;

    /// Whether the model may return several tool calls in one turn.
    fn supports_parallel_tool_calls(&self) -> bool {
        false
    }
}

/// Remote text-to-video rendering.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    /// Render `prompt` and download the result into a fresh run directory
    /// classified by `trait_label`.
    async fn render(&self, prompt: &str, trait_label: &str) -> SjtResult<RenderedVideo>;
}

/// Text-to-speech narration.
///
/// Failure is not an error: it is reported as [`NarrationOutcome::NoAudio`].
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Synthesize `text` into an audio file under `outdir`.
    async fn narrate(
        &self,
        text: &str,
        outdir: &Path,
        target_seconds: Option<u32>,
        speed: Option<f32>,
    ) -> NarrationOutcome;
}

/// Combines one video and one audio file into a single clip.
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Write the merged clip to `output`.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> SjtResult<()>;
}
