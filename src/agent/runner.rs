//! Conversation orchestrator: the two-phase model-call protocol.

use super::executor::ToolExecutor;
use super::model::ChatModel;
use super::resolver::{TaskResolver, TitleMatch};
use super::tools::tool_definitions;
use crate::backend::TaskStoreClient;
use crate::error::{Result, SysselError};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default system prompt for the task assistant.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful productivity assistant that helps users manage their tasks.
You have access to tools to create, list, update, and delete tasks.
Always respond in a helpful and friendly manner."#;

/// Role of a caller-supplied history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior message of the conversation, supplied fresh by the caller on
/// every turn. There is no server-side conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Identity of the caller for one turn. The auth token is injected into
/// tool arguments server-side; the model never sees it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
    pub auth_token: Option<String>,
}

/// Audit record of one executed tool, with arguments as they were
/// dispatched (token injected, title resolved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedTool {
    pub name: String,
    pub arguments: Value,
}

/// Result of one conversation turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub executed_tools: Vec<ExecutedTool>,
}

/// LLM-backed agent that turns free-text requests into task operations.
///
/// Drives the two-phase protocol: one model call with the tool schema to
/// decide intent, sequential tool execution, then a second call without
/// tools to phrase the final reply.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    executor: ToolExecutor,
    resolver: TaskResolver,
    system_prompt: String,
}

impl Agent {
    /// Create an agent over an explicitly constructed model client and
    /// task backend client.
    pub fn new(model: Arc<dyn ChatModel>, tasks: TaskStoreClient) -> Self {
        Self {
            executor: ToolExecutor::new(tasks.clone()),
            resolver: TaskResolver::new(tasks, TitleMatch::Substring),
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Process one conversation turn.
    ///
    /// Never fails: a model or internal error becomes an apologetic reply
    /// with an empty audit list. Errors are conversational here, not
    /// protocol-level.
    pub async fn process(
        &self,
        user_input: &str,
        history: &[ChatTurn],
        session: &SessionContext,
    ) -> AgentReply {
        match self.run_turn(user_input, history, session).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat turn failed: {}", e);
                AgentReply {
                    text: format!("I'm sorry, I encountered an error: {}", e),
                    executed_tools: Vec::new(),
                }
            }
        }
    }

    async fn run_turn(
        &self,
        user_input: &str,
        history: &[ChatTurn],
        session: &SessionContext,
    ) -> Result<AgentReply> {
        debug!(
            "Processing turn for user {} ({} history messages)",
            session.user_id,
            history.len()
        );

        let mut messages = self.build_messages(user_input, history)?;

        let first = self
            .model
            .complete(messages.clone(), Some(tool_definitions()))
            .await?;

        if first.tool_calls.is_empty() {
            return Ok(AgentReply {
                text: first.content.unwrap_or_default(),
                executed_tools: Vec::new(),
            });
        }

        let session_token = session.auth_token.clone().unwrap_or_default();

        // One assistant message carrying the requested calls, then one tool
        // message per invocation, executed sequentially in model order.
        let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
            .tool_calls(first.tool_calls.clone())
            .build()
            .map_err(|e| SysselError::Agent(e.to_string()))?;
        messages.push(assistant_msg.into());

        let mut executed_tools = Vec::new();
        for tool_call in &first.tool_calls {
            let name = &tool_call.function.name;
            info!("Model requested tool: {}", name);

            let mut arguments = parse_arguments(&tool_call.function.arguments)?;
            arguments.insert("session_token".to_string(), json!(session_token));

            if name == "update_task" {
                // Best-effort substring resolution; the executor re-resolves
                // under the exact policy and owns the user-visible failure.
                if let Err(e) = self
                    .resolver
                    .resolve_arguments(&mut arguments, &session_token)
                    .await
                {
                    debug!("Title resolution before dispatch skipped: {}", e);
                }
            }

            let outcome = self.executor.execute(name, &arguments).await;
            let payload = serde_json::to_string(&outcome)?;

            let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(&tool_call.id)
                .content(payload)
                .build()
                .map_err(|e| SysselError::Agent(e.to_string()))?;
            messages.push(tool_msg.into());

            executed_tools.push(ExecutedTool {
                name: name.clone(),
                arguments: Value::Object(arguments),
            });
        }

        // Second call without the tool schema: the model folds the tool
        // outcomes into the final reply.
        let second = self.model.complete(messages, None).await?;

        Ok(AgentReply {
            text: second.content.unwrap_or_default(),
            executed_tools,
        })
    }

    fn build_messages(
        &self,
        user_input: &str,
        history: &[ChatTurn],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| SysselError::Agent(e.to_string()))?
                .into(),
        ];

        for turn in history {
            let message: ChatCompletionRequestMessage = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| SysselError::Agent(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| SysselError::Agent(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input.to_string())
                .build()
                .map_err(|e| SysselError::Agent(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }
}

/// Parse a tool call's JSON argument string into an object.
fn parse_arguments(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| SysselError::Agent(format!("Malformed tool arguments: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SysselError::Agent(format!(
            "Tool arguments must be an object, got: {}",
            other
        ))),
    }
}
