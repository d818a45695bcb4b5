//! Syssel - Natural-Language Task Assistant
//!
//! Manage a personal task list by chatting with an LLM-backed agent.
//!
//! The name "Syssel" comes from the Norwegian word for "chore."
//!
//! # Overview
//!
//! Syssel allows you to:
//! - Create, list, update, and delete tasks in plain language
//! - Refer to tasks by title instead of id; the agent resolves the reference
//! - Serve the agent over HTTP for frontends (`/chat`, `/call_tool`)
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `backend` - Typed clients for the external task and auth APIs
//! - `agent` - Tool-call orchestration: model seam, tool schema,
//!   title resolution, tool execution, and the two-phase turn protocol
//! - `openai` - Production `ChatModel` over the OpenAI API
//! - `cli` - Command-line interface and the HTTP server command
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use syssel::agent::{Agent, SessionContext};
//! use syssel::backend::TaskStoreClient;
//! use syssel::openai::OpenAiChatModel;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tasks = TaskStoreClient::new("http://localhost:8000", Duration::from_secs(30))?;
//!     let agent = Agent::new(Arc::new(OpenAiChatModel::new("gpt-4o-mini")), tasks);
//!
//!     let session = SessionContext {
//!         user_id: "demo".to_string(),
//!         auth_token: Some("bearer-token".to_string()),
//!     };
//!     let reply = agent.process("add a task called Buy milk", &[], &session).await;
//!     println!("{}", reply.text);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;

pub use error::{Result, SysselError};
