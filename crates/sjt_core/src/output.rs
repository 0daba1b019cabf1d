//! Output types from text model responses.

use serde::{Deserialize, Serialize};

/// Supported output types from text models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Tool/function calls requested by the model.
    ///
    /// The results should be sent back in a subsequent request.
    ToolCalls(Vec<ToolCall>),
}

/// A tool/function call made by the model.
///
/// # Examples
///
/// ```
/// use sjt_core::ToolCall;
/// use serde_json::json;
///
/// let call = ToolCall {
///     id: "call_123".to_string(),
///     name: "transfer_to_video".to_string(),
///     arguments: json!({"storyboard_data": "{}"}),
/// };
///
/// assert_eq!(call.name, "transfer_to_video");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool/function to call
    pub name: String,
    /// Arguments to pass to the tool (as JSON)
    pub arguments: serde_json::Value,
}
