// src/application/dto/mod.rs
// DTOs for the chat-completion wire format

pub mod parser;

use serde::Deserialize;

/// Top level of an OpenAI-compatible chat-completion response. Only
/// the fields the toolkit reads are modeled; the raw JSON is persisted
/// in full regardless.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub content: String,
}
