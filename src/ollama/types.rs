//! Wire shapes for the Ollama `/api/chat` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ChatContent>,
}

#[derive(Debug, Deserialize)]
pub struct ChatContent {
    #[serde(default)]
    pub content: String,
}

/// One newline-delimited JSON line of a streaming chat response. The final
/// line carries `done: true`.
#[derive(Debug, Deserialize)]
pub struct ChatStreamLine {
    #[serde(default)]
    pub message: Option<ChatContent>,
    #[serde(default)]
    pub done: bool,
}
