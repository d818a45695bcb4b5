//! HTTP API server exposing the chat agent and the tool dispatch boundary.
//!
//! `/chat` drives a full conversation turn; `/call_tool` exposes the tool
//! executor directly for integrations that already know which operation
//! they want.

use crate::agent::{Agent, ExecutedTool, SessionContext, ToolExecutor, ToolOutcome};
use crate::backend::TaskStoreClient;
use crate::cli::Output;
use crate::config::Settings;
use crate::openai::OpenAiChatModel;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    agent: Agent,
    executor: ToolExecutor,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let tasks = TaskStoreClient::new(
        &settings.backend.base_url,
        Duration::from_secs(settings.backend.timeout_seconds),
    )?;

    let model = Arc::new(OpenAiChatModel::new(&settings.agent.model));
    let mut agent = Agent::new(model, tasks.clone());
    if let Some(prompt) = &settings.agent.system_prompt {
        agent = agent.with_system_prompt(prompt);
    }

    let state = Arc::new(AppState {
        agent,
        executor: ToolExecutor::new(tasks),
    });

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Syssel API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Call Tool", "POST /call_tool");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/call_tool", post(call_tool))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    user_id: String,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    auth_token: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    conversation_id: String,
    response: String,
    tool_calls: Vec<ExecutedTool>,
}

#[derive(Deserialize)]
struct ToolCallRequest {
    tool_name: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

// === Handlers ===

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// One conversation turn. History is not kept server-side; each request
/// stands alone, and a fresh conversation id is minted when none is given.
async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let conversation_id = req
        .conversation_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let session = SessionContext {
        user_id: req.user_id,
        auth_token: req.auth_token,
    };

    // process() folds every failure into a conversational reply, so this
    // handler has no error path of its own
    let reply = state.agent.process(&req.message, &[], &session).await;

    Json(ChatResponse {
        conversation_id,
        response: reply.text,
        tool_calls: reply.executed_tools,
    })
}

/// Direct tool dispatch: always answers `{result, success}`, never a 500.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToolCallRequest>,
) -> Json<ToolOutcome> {
    let outcome = state.executor.execute(&req.tool_name, &req.parameters).await;
    Json(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ChatModel, ModelTurn};
    use crate::backend::testutil::{spawn_fake_backend, TEST_TOKEN};
    use crate::error::Result;
    use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionTool};
    use async_trait::async_trait;
    use serde_json::json;

    /// Model that always answers with the same text and no tool calls.
    struct CannedModel(&'static str);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn complete(
            &self,
            _messages: Vec<ChatCompletionRequestMessage>,
            _tools: Option<Vec<ChatCompletionTool>>,
        ) -> Result<ModelTurn> {
            Ok(ModelTurn {
                content: Some(self.0.to_string()),
                tool_calls: Vec::new(),
            })
        }
    }

    async fn state(reply: &'static str) -> Arc<AppState> {
        let (base_url, _backend) = spawn_fake_backend(vec![]).await;
        let tasks = TaskStoreClient::new(&base_url, Duration::from_secs(5)).unwrap();
        Arc::new(AppState {
            agent: Agent::new(Arc::new(CannedModel(reply)), tasks.clone()),
            executor: ToolExecutor::new(tasks),
        })
    }

    #[tokio::test]
    async fn test_chat_mints_conversation_id_when_absent() {
        let state = state("Hi there!").await;
        let request = ChatRequest {
            message: "hello".to_string(),
            user_id: "u1".to_string(),
            conversation_id: None,
            auth_token: Some(TEST_TOKEN.to_string()),
        };

        let Json(response) = chat(State(state), Json(request)).await;

        assert_eq!(response.response, "Hi there!");
        assert!(response.tool_calls.is_empty());
        assert!(Uuid::parse_str(&response.conversation_id).is_ok());
    }

    #[tokio::test]
    async fn test_chat_keeps_supplied_conversation_id() {
        let state = state("Hi again!").await;
        let request = ChatRequest {
            message: "hello".to_string(),
            user_id: "u1".to_string(),
            conversation_id: Some("conv-42".to_string()),
            auth_token: Some(TEST_TOKEN.to_string()),
        };

        let Json(response) = chat(State(state), Json(request)).await;
        assert_eq!(response.conversation_id, "conv-42");
    }

    #[tokio::test]
    async fn test_call_tool_preserves_success_duality() {
        let state = state("unused").await;

        let Json(outcome) = call_tool(
            State(state.clone()),
            Json(ToolCallRequest {
                tool_name: "get_tasks".to_string(),
                parameters: json!({"session_token": TEST_TOKEN})
                    .as_object()
                    .unwrap()
                    .clone(),
            }),
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.result, "No tasks found.");

        let Json(outcome) = call_tool(
            State(state),
            Json(ToolCallRequest {
                tool_name: "explode".to_string(),
                parameters: Map::new(),
            }),
        )
        .await;
        assert!(!outcome.success);
        assert_eq!(outcome.result, "Unknown tool: explode");
    }

    #[test]
    fn test_chat_request_optional_fields_default() {
        let request: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "user_id": "u1"})).unwrap();
        assert!(request.conversation_id.is_none());
        assert!(request.auth_token.is_none());
    }
}
