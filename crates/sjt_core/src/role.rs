//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Chat participant roles, as understood by OpenAI-compatible endpoints.
///
/// # Examples
///
/// ```
/// use sjt_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "System");
/// assert_eq!(Role::Tool.as_api_str(), "tool");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    System,
    /// User messages carry the situation and character seed
    User,
    /// Assistant messages are from the model
    Assistant,
    /// Tool messages carry the result of a tool call back to the model
    Tool,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}
