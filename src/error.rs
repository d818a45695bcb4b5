//! Error types for Syssel.

use thiserror::Error;

/// Library-level error type for Syssel operations.
#[derive(Error, Debug)]
pub enum SysselError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Backend call failed (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("No task found with title: '{0}'")]
    TaskNotFound(String),

    #[error("Either task_id or task_title must be provided")]
    MissingIdentifier,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Result type alias for Syssel operations.
pub type Result<T> = std::result::Result<T, SysselError>;
