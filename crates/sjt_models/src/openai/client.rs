use crate::{
    ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sjt_config::LlmConfig;
use sjt_core::{GenerateRequest, GenerateResponse, Message, Output, ToolCall};
use sjt_error::{HttpError, JsonError, SjtResult};
use sjt_interface::{TextDriver, ToolDefinition, ToolUse};
use tracing::{debug, error, instrument};

/// Client for OpenAI-compatible chat-completions endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiChatClient {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token
    /// * `model` - Model identifier (e.g., "gpt-4o")
    /// * `base_url` - API base such as `https://api.openai.com/v1`
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Self {
        let endpoint = format!(
            "{}/chat/completions",
            base_url.as_ref().trim_end_matches('/')
        );
        debug!(endpoint = %endpoint, "Creating chat-completions client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Creates a client from the `[llm]` section.
    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        let mut client = Self::new(api_key, &config.model, &config.base_url);
        client.temperature = Some(config.temperature);
        client.max_tokens = config.max_tokens;
        client
    }

    /// Sends a raw chat request.
    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    pub async fn send(&self, request: &ChatRequest) -> SjtResult<ChatResponse> {
        debug!(messages = request.messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send chat request");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Chat API returned error");
            return Err(HttpError::new(format!("API error {}: {}", status.as_u16(), body)).into());
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse chat response");
            JsonError::new(format!("Failed to parse chat response: {}", e))
        })?;

        debug!(choices = chat.choices.len(), "Received chat response");
        Ok(chat)
    }

    /// Converts a [`GenerateRequest`] into the wire request.
    pub fn convert_request(
        &self,
        request: &GenerateRequest,
        tools: &[ToolDefinition],
    ) -> ChatRequest {
        ChatRequest {
            model: request.model().clone().unwrap_or_else(|| self.model.clone()),
            messages: request.messages().iter().map(convert_message).collect(),
            temperature: request.temperature().or(self.temperature),
            max_tokens: request.max_tokens().or(self.max_tokens),
            tools: tools
                .iter()
                .map(|tool| ChatTool {
                    kind: "function".to_string(),
                    function: ChatFunction {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect(),
        }
    }

    /// Converts the first choice of a wire response.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`] if the response has no choices.
    pub fn convert_response(response: ChatResponse) -> SjtResult<GenerateResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| JsonError::new("Chat response contained no choices"))?;

        let mut outputs = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.trim().is_empty()) {
            outputs.push(Output::Text(text));
        }
        if !choice.message.tool_calls.is_empty() {
            let calls = choice
                .message
                .tool_calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: parse_arguments(call.function.arguments),
                })
                .collect();
            outputs.push(Output::ToolCalls(calls));
        }

        Ok(GenerateResponse { outputs })
    }
}

fn convert_message(message: &Message) -> ChatMessage {
    let content = if message.content.is_empty() && !message.tool_calls.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };
    ChatMessage {
        role: message.role.as_api_str().to_string(),
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| ChatToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: ChatFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

/// Arguments that are not valid JSON are kept as a plain string.
fn parse_arguments(arguments: String) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(&arguments).unwrap_or(Value::String(arguments))
}

#[async_trait]
impl TextDriver for OpenAiChatClient {
    #[instrument(skip(self, req), fields(provider = "openai", model = %self.model))]
    async fn generate(&self, req: &GenerateRequest) -> SjtResult<GenerateResponse> {
        let chat = self.send(&self.convert_request(req, &[])).await?;
        Self::convert_response(chat)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ToolUse for OpenAiChatClient {
    #[instrument(
        skip(self, req, tools),
        fields(provider = "openai", model = %self.model, tools = tools.len())
    )]
    async fn generate_with_tools(
        &self,
        req: &GenerateRequest,
        tools: &[ToolDefinition],
    ) -> SjtResult<GenerateResponse> {
        let chat = self.send(&self.convert_request(req, tools)).await?;
        Self::convert_response(chat)
    }

    fn supports_parallel_tool_calls(&self) -> bool {
        true
    }
}
