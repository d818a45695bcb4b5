//! LLM agent for natural-language task management.
//!
//! Turns a free-text chat turn into zero or more structured task
//! operations: one model call decides intent and requests tools, the
//! executor runs them against the task backend (resolving title
//! references to ids on the way), and a second model call phrases the
//! outcome as the reply.

mod executor;
mod model;
mod resolver;
mod runner;
mod tools;

pub use executor::{ToolExecutor, ToolOutcome};
pub use model::{ChatModel, ModelTurn};
pub use resolver::{TaskResolver, TitleMatch};
pub use runner::{Agent, AgentReply, ChatRole, ChatTurn, ExecutedTool, SessionContext};
pub use tools::{
    parse_tool_call, tool_definitions, CreateTaskArgs, DeleteTaskArgs, ToolCall, UpdateTaskArgs,
};
