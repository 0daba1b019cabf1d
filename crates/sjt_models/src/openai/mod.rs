//! OpenAI-compatible chat-completions client.

mod client;
mod dto;

pub use client::OpenAiChatClient;
pub use dto::{
    ChatChoice, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall,
};
