//! Tool schema and typed argument parsing for the task tools.

use crate::error::{Result, SysselError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Arguments for `create_task`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskArgs {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Arguments for `update_task`. Identity fields and update fields are all
/// optional at the schema level; the executor enforces that one identity
/// field is usable before dispatch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskArgs {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub task_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub append_description: Option<String>,
}

/// Arguments for `delete_task`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteTaskArgs {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub task_title: Option<String>,
}

/// Tool invocations the model may request, one variant per tool.
#[derive(Debug, Clone)]
pub enum ToolCall {
    CreateTask(CreateTaskArgs),
    GetTasks,
    UpdateTask(UpdateTaskArgs),
    DeleteTask(DeleteTaskArgs),
}

/// Parse a named tool call from its argument object.
///
/// Unknown fields (notably the injected `session_token`) are ignored; a
/// missing required field surfaces as an invalid-arguments error.
pub fn parse_tool_call(name: &str, parameters: &Map<String, Value>) -> Result<ToolCall> {
    let value = Value::Object(parameters.clone());
    let invalid =
        |e: serde_json::Error| SysselError::InvalidArguments(format!("{}: {}", name, e));

    match name {
        "create_task" => Ok(ToolCall::CreateTask(
            serde_json::from_value(value).map_err(invalid)?,
        )),
        "get_tasks" => Ok(ToolCall::GetTasks),
        "update_task" => Ok(ToolCall::UpdateTask(
            serde_json::from_value(value).map_err(invalid)?,
        )),
        "delete_task" => Ok(ToolCall::DeleteTask(
            serde_json::from_value(value).map_err(invalid)?,
        )),
        other => Err(SysselError::UnknownTool(other.to_string())),
    }
}

/// OpenAI function/tool definitions for the task tools.
///
/// The session token is deliberately absent from every schema: it is
/// injected by the orchestrator after the model has chosen its calls.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "create_task".to_string(),
                description: Some("Add a new task to the user's task list".to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The title of the task"
                        },
                        "description": {
                            "type": "string",
                            "description": "Optional description of the task"
                        }
                    },
                    "required": ["title"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "get_tasks".to_string(),
                description: Some("List all tasks for a user".to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "update_task".to_string(),
                description: Some(
                    "Update an existing task. Either task_id or task_title must be provided."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "task_id": {
                            "type": "integer",
                            "description": "The ID of the task to update"
                        },
                        "task_title": {
                            "type": "string",
                            "description": "The title of the task to update, if the ID is not known"
                        },
                        "title": {
                            "type": "string",
                            "description": "New title for the task"
                        },
                        "status": {
                            "type": "string",
                            "description": "New status for the task (e.g., 'completed', 'pending')"
                        },
                        "description": {
                            "type": "string",
                            "description": "New description for the task"
                        },
                        "append_description": {
                            "type": "string",
                            "description": "Content to append to the existing description"
                        }
                    },
                    "required": []
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "delete_task".to_string(),
                description: Some(
                    "Delete a task. Either task_id or task_title must be provided.".to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "task_id": {
                            "type": "integer",
                            "description": "The ID of the task to delete"
                        },
                        "task_title": {
                            "type": "string",
                            "description": "The title of the task to delete, if the ID is not known"
                        }
                    },
                    "required": []
                })),
                strict: None,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_parse_create_task() {
        let call = parse_tool_call(
            "create_task",
            &params(json!({"title": "Buy milk", "session_token": "tok"})),
        )
        .unwrap();
        match call {
            ToolCall::CreateTask(args) => {
                assert_eq!(args.title, "Buy milk");
                assert!(args.description.is_none());
            }
            _ => panic!("Expected CreateTask"),
        }
    }

    #[test]
    fn test_parse_create_task_requires_title() {
        let err = parse_tool_call("create_task", &params(json!({"description": "x"}))).unwrap_err();
        assert!(matches!(err, SysselError::InvalidArguments(_)));
    }

    #[test]
    fn test_parse_update_task_all_fields_optional() {
        let call = parse_tool_call("update_task", &params(json!({}))).unwrap();
        match call {
            ToolCall::UpdateTask(args) => {
                assert!(args.task_id.is_none());
                assert!(args.task_title.is_none());
            }
            _ => panic!("Expected UpdateTask"),
        }
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = parse_tool_call("drop_database", &params(json!({}))).unwrap_err();
        assert!(matches!(err, SysselError::UnknownTool(_)));
    }

    #[test]
    fn test_schema_never_exposes_session_token() {
        for tool in tool_definitions() {
            let schema = serde_json::to_string(&tool.function.parameters).unwrap();
            assert!(!schema.contains("session_token"), "{}", tool.function.name);
        }
    }
}
