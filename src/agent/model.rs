//! Model seam for the conversation orchestrator.

use crate::error::Result;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool,
};
use async_trait::async_trait;

/// One model completion: final text, requested tool calls, or both.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
}

/// Trait for the chat-completion collaborator.
///
/// The agent takes an explicitly constructed implementation instead of a
/// process-global client, so tests can substitute a scripted responder.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion over `messages`. When `tools` is Some, the model
    /// may answer with tool invocation requests instead of (or alongside)
    /// text; when None, it must produce plain text.
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Option<Vec<ChatCompletionTool>>,
    ) -> Result<ModelTurn>;
}
