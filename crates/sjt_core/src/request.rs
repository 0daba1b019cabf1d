//! Request and response types for text generation.

use crate::{Message, Output, ToolCall};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Generic generation request.
///
/// # Examples
///
/// ```
/// use sjt_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .temperature(Some(0.4))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.temperature(), Some(0.4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Builder, Getters)]
#[builder(setter(into), default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    temperature: Option<f32>,
    /// Model identifier override
    model: Option<String>,
}

impl GenerateRequest {
    /// Create a new builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// System prompt followed by a single user message.
    pub fn system_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            ..Self::default()
        }
    }

    /// Same request with a different temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// The unified response object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text outputs, trimmed. `None` if there is no text.
    ///
    /// # Examples
    ///
    /// ```
    /// use sjt_core::{GenerateResponse, Output};
    ///
    /// let response = GenerateResponse {
    ///     outputs: vec![Output::Text("  hi ".to_string())],
    /// };
    /// assert_eq!(response.text().as_deref(), Some("hi"));
    /// ```
    pub fn text(&self) -> Option<String> {
        let text = self
            .outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                Output::ToolCalls(_) => None,
            })
            .collect::<Vec<_>>()
            .join("");
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// All tool calls across outputs, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::ToolCalls(calls) => Some(calls.clone()),
                Output::Text(_) => None,
            })
            .flatten()
            .collect()
    }
}
