//! Tool execution against the task backend.

use super::resolver::{TaskResolver, TitleMatch};
use super::tools::{parse_tool_call, CreateTaskArgs, DeleteTaskArgs, ToolCall, UpdateTaskArgs};
use crate::backend::{NewTask, TaskPatch, TaskStoreClient};
use crate::error::SysselError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Outcome of a tool invocation: a human-readable result plus a success
/// flag. This is the exact shape the `/call_tool` endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub result: String,
    pub success: bool,
}

impl ToolOutcome {
    fn ok(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            success: true,
        }
    }

    fn failed(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            success: false,
        }
    }
}

/// Executes structured tool calls against the task backend.
///
/// Every failure is folded into a [`ToolOutcome`]; nothing propagates past
/// this boundary, so a bad tool call can never abort a chat turn.
pub struct ToolExecutor {
    client: TaskStoreClient,
    resolver: TaskResolver,
}

impl ToolExecutor {
    /// Build an executor over the given task client. Title references are
    /// resolved under the exact policy at this boundary.
    pub fn new(client: TaskStoreClient) -> Self {
        let resolver = TaskResolver::new(client.clone(), TitleMatch::Exact);
        Self { client, resolver }
    }

    /// Execute `name` with `parameters`.
    ///
    /// The session token travels inside the parameter object, injected by
    /// the orchestrator; the model never supplies it.
    pub async fn execute(&self, name: &str, parameters: &Map<String, Value>) -> ToolOutcome {
        info!("Executing tool: {}", name);

        let session_token = parameters
            .get("session_token")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let call = match parse_tool_call(name, parameters) {
            Ok(call) => call,
            Err(e @ SysselError::UnknownTool(_)) => {
                warn!("{}", e);
                return ToolOutcome::failed(e.to_string());
            }
            Err(e) => return ToolOutcome::failed(e.to_string()),
        };

        match call {
            ToolCall::GetTasks => self.get_tasks(&session_token).await,
            ToolCall::CreateTask(args) => self.create_task(&session_token, args).await,
            ToolCall::UpdateTask(args) => self.update_task(&session_token, args).await,
            ToolCall::DeleteTask(args) => self.delete_task(&session_token, args).await,
        }
    }

    async fn get_tasks(&self, token: &str) -> ToolOutcome {
        match self.client.list_tasks(token).await {
            Ok(tasks) if tasks.is_empty() => ToolOutcome::ok("No tasks found."),
            Ok(tasks) => {
                // 1-indexed, in backend order; not re-sorted
                let lines: Vec<String> = tasks
                    .iter()
                    .enumerate()
                    .map(|(i, task)| {
                        let marker = if task.completed { "✓" } else { "○" };
                        format!("{}. [{}] {}", i + 1, marker, task.title)
                    })
                    .collect();
                ToolOutcome::ok(format!("Your tasks:\n{}", lines.join("\n")))
            }
            Err(e) => backend_failure("Failed to list tasks", e),
        }
    }

    async fn create_task(&self, token: &str, args: CreateTaskArgs) -> ToolOutcome {
        let request = NewTask {
            title: args.title.clone(),
            description: args.description.unwrap_or_default(),
        };

        match self.client.create_task(token, &request).await {
            Ok(task) => {
                let title = if task.title.is_empty() {
                    args.title
                } else {
                    task.title
                };
                ToolOutcome::ok(format!("Added task: {}", title))
            }
            Err(e) => backend_failure("Failed to add task", e),
        }
    }

    async fn update_task(&self, token: &str, args: UpdateTaskArgs) -> ToolOutcome {
        let task_id = match self
            .resolver
            .resolve_ref(args.task_id, args.task_title.as_deref(), token)
            .await
        {
            Ok(id) => id,
            Err(e @ SysselError::TaskNotFound(_)) => {
                return ToolOutcome::failed(format!("{}.", e))
            }
            Err(SysselError::MissingIdentifier) => {
                return ToolOutcome::failed(
                    "Either task_id or task_title must be provided for update.",
                )
            }
            Err(e) => return backend_failure("Failed to look up task", e),
        };

        let mut patch = TaskPatch {
            title: args.title,
            ..Default::default()
        };

        if let Some(status) = args.status.as_deref() {
            match status_to_completed(status) {
                Some(completed) => patch.completed = Some(completed),
                // unrecognized status values are ignored rather than mapped
                None => warn!("Unrecognized status value: {}", status),
            }
        }

        // append wins over a plain description when both are supplied
        if let Some(appended) = args.append_description {
            let existing = match self.client.get_task(token, task_id).await {
                Ok(task) => task.description.unwrap_or_default(),
                Err(e) => return backend_failure("Failed to fetch task for append", e),
            };
            patch.description = Some(format!("{}\n{}", existing, appended).trim().to_string());
        } else if let Some(description) = args.description {
            patch.description = Some(description);
        }

        if patch.is_empty() {
            return ToolOutcome::failed("No updates provided.");
        }

        match self.client.update_task(token, task_id, &patch).await {
            Ok(_) => ToolOutcome::ok("Task updated successfully."),
            Err(e) => backend_failure("Failed to update task", e),
        }
    }

    async fn delete_task(&self, token: &str, args: DeleteTaskArgs) -> ToolOutcome {
        let task_id = match self
            .resolver
            .resolve_ref(args.task_id, args.task_title.as_deref(), token)
            .await
        {
            Ok(id) => id,
            Err(e @ SysselError::TaskNotFound(_)) => {
                return ToolOutcome::failed(format!("{}.", e))
            }
            Err(SysselError::MissingIdentifier) => {
                return ToolOutcome::failed(
                    "Either task_id or task_title must be provided for deletion.",
                )
            }
            Err(e) => return backend_failure("Failed to look up task", e),
        };

        match self.client.delete_task(token, task_id).await {
            Ok(_) => ToolOutcome::ok("Task deleted successfully."),
            Err(e) => backend_failure("Failed to delete task", e),
        }
    }
}

/// Map a status word to the backend's completed flag. Unknown values map to
/// None and leave the flag untouched.
fn status_to_completed(status: &str) -> Option<bool> {
    match status.to_lowercase().as_str() {
        "completed" | "done" | "finished" => Some(true),
        "pending" | "not completed" | "incomplete" => Some(false),
        _ => None,
    }
}

/// Fold a backend error into a failure outcome, embedding status and body
/// when the backend answered at all.
fn backend_failure(prefix: &str, err: SysselError) -> ToolOutcome {
    match err {
        SysselError::Backend { status, body } => {
            ToolOutcome::failed(format!("{} (status {}): {}", prefix, status, body))
        }
        other => ToolOutcome::failed(format!("{}: {}", prefix, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::{spawn_fake_backend, FakeBackend, TEST_TOKEN};
    use crate::backend::Task;
    use serde_json::json;
    use std::time::Duration;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            completed: false,
            user_id: None,
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        let mut map = value.as_object().unwrap().clone();
        map.insert("session_token".to_string(), json!(TEST_TOKEN));
        map
    }

    async fn executor(initial: Vec<Task>) -> (ToolExecutor, FakeBackend) {
        let (base_url, state) = spawn_fake_backend(initial).await;
        let client = TaskStoreClient::new(&base_url, Duration::from_secs(5)).unwrap();
        (ToolExecutor::new(client), state)
    }

    #[tokio::test]
    async fn test_get_tasks_empty_list_message() {
        let (executor, _state) = executor(vec![]).await;
        let outcome = executor.execute("get_tasks", &params(json!({}))).await;
        assert!(outcome.success);
        assert_eq!(outcome.result, "No tasks found.");
    }

    #[tokio::test]
    async fn test_get_tasks_formats_in_backend_order() {
        let mut done = task(2, "Water plants");
        done.completed = true;
        let (executor, _state) = executor(vec![task(5, "Buy milk"), done]).await;

        let outcome = executor.execute("get_tasks", &params(json!({}))).await;
        assert!(outcome.success);
        assert_eq!(
            outcome.result,
            "Your tasks:\n1. [○] Buy milk\n2. [✓] Water plants"
        );
    }

    #[tokio::test]
    async fn test_create_task_confirms_title() {
        let (executor, state) = executor(vec![]).await;
        let outcome = executor
            .execute("create_task", &params(json!({"title": "Buy milk"})))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.result, "Added task: Buy milk");
        assert_eq!(state.task_titles(), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn test_create_task_without_title_is_validation_failure() {
        let (executor, state) = executor(vec![]).await;
        let outcome = executor
            .execute("create_task", &params(json!({"description": "just notes"})))
            .await;
        assert!(!outcome.success);
        assert!(outcome.result.contains("title"));
        assert_eq!(state.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_without_identifier_short_circuits() {
        let (executor, state) = executor(vec![task(1, "Buy milk")]).await;
        let outcome = executor
            .execute("update_task", &params(json!({"status": "done"})))
            .await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.result,
            "Either task_id or task_title must be provided for update."
        );
        assert_eq!(state.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_title_short_circuits() {
        let (executor, state) = executor(vec![task(1, "Buy milk")]).await;
        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_title": "walk dog", "status": "done"})),
            )
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.result, "No task found with title: 'walk dog'.");
        assert_eq!(state.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_exact_policy_ignores_partial_title() {
        let (executor, state) = executor(vec![task(1, "Buy milk today")]).await;
        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_title": "Buy milk", "status": "done"})),
            )
            .await;
        assert!(!outcome.success);
        assert_eq!(state.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_status_marks_completed() {
        let (executor, state) = executor(vec![task(7, "Buy milk")]).await;
        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_title": "buy milk", "status": "completed"})),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.result, "Task updated successfully.");
        assert!(state.tasks.lock().unwrap()[0].completed);
    }

    #[tokio::test]
    async fn test_update_unrecognized_status_alone_is_noop() {
        let (executor, state) = executor(vec![task(7, "Buy milk")]).await;
        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_id": 7, "status": "blocked"})),
            )
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.result, "No updates provided.");
        assert_eq!(state.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_append_description_concatenates_and_trims() {
        let mut existing = task(7, "Buy milk");
        existing.description = Some("2 liters".to_string());
        let (executor, state) = executor(vec![existing]).await;

        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_id": 7, "append_description": "oat if possible"})),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(
            state.tasks.lock().unwrap()[0].description.as_deref(),
            Some("2 liters\noat if possible")
        );
    }

    #[tokio::test]
    async fn test_append_description_on_empty_has_no_leading_newline() {
        let (executor, state) = executor(vec![task(7, "Buy milk")]).await;
        let outcome = executor
            .execute(
                "update_task",
                &params(json!({"task_id": 7, "append_description": "oat if possible"})),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(
            state.tasks.lock().unwrap()[0].description.as_deref(),
            Some("oat if possible")
        );
    }

    #[tokio::test]
    async fn test_append_description_wins_over_description() {
        let mut existing = task(7, "Buy milk");
        existing.description = Some("old".to_string());
        let (executor, state) = executor(vec![existing]).await;

        let outcome = executor
            .execute(
                "update_task",
                &params(json!({
                    "task_id": 7,
                    "description": "replaced",
                    "append_description": "added"
                })),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(
            state.tasks.lock().unwrap()[0].description.as_deref(),
            Some("old\nadded")
        );
    }

    #[tokio::test]
    async fn test_delete_by_exact_title() {
        let (executor, state) = executor(vec![task(7, "Buy milk"), task(8, "Walk dog")]).await;
        let outcome = executor
            .execute("delete_task", &params(json!({"task_title": "BUY MILK"})))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.result, "Task deleted successfully.");
        assert_eq!(state.task_titles(), vec!["Walk dog"]);
    }

    #[tokio::test]
    async fn test_delete_missing_task_embeds_status_and_body() {
        let (executor, _state) = executor(vec![]).await;
        let outcome = executor
            .execute("delete_task", &params(json!({"task_id": 42})))
            .await;
        assert!(!outcome.success);
        assert!(outcome.result.contains("status 404"));
        assert!(outcome.result.contains("Task not found"));
    }

    #[test]
    fn test_unknown_tool_returns_result_not_panic() {
        tokio_test::block_on(async {
            let (executor, _state) = executor(vec![]).await;
            let outcome = executor.execute("reboot_server", &params(json!({}))).await;
            assert!(!outcome.success);
            assert_eq!(outcome.result, "Unknown tool: reboot_server");
        });
    }

    #[test]
    fn test_status_word_mapping() {
        assert_eq!(status_to_completed("done"), Some(true));
        assert_eq!(status_to_completed("Finished"), Some(true));
        assert_eq!(status_to_completed("not completed"), Some(false));
        assert_eq!(status_to_completed("incomplete"), Some(false));
        assert_eq!(status_to_completed("blocked"), None);
    }
}
