//! Text model integrations for the SJT video generation pipeline.
//!
//! The generation tools and the LLM director talk to any
//! OpenAI-compatible chat-completions endpoint through
//! [`OpenAiChatClient`], which implements both
//! [`TextDriver`](sjt_interface::TextDriver) and
//! [`ToolUse`](sjt_interface::ToolUse).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai;

pub use openai::{
    ChatChoice, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall, OpenAiChatClient,
};
