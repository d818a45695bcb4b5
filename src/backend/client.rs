//! Typed HTTP client for the task backend.

use crate::error::{Result, SysselError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A task as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// Opaque owner identifier assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Partial-update payload. Unset fields are left out of the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Response body for a successful delete.
#[derive(Debug, Deserialize)]
pub struct DeleteDetail {
    pub detail: String,
}

/// Thin typed wrapper over the backend task CRUD endpoints.
///
/// Attaches the caller's bearer token to each request, never retries, and
/// surfaces non-2xx responses as a status+body error without interpreting
/// them. Business meaning belongs to the tool executor.
#[derive(Clone)]
pub struct TaskStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskStoreClient {
    /// Create a client for the backend at `base_url` with a request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List all tasks for the authenticated user, in backend order.
    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>> {
        let request = self.http.get(self.collection_url());
        decode(with_auth(request, token).send().await?).await
    }

    /// Create a new task.
    pub async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task> {
        let request = self.http.post(self.collection_url()).json(task);
        decode(with_auth(request, token).send().await?).await
    }

    /// Fetch a single task by id.
    pub async fn get_task(&self, token: &str, task_id: i64) -> Result<Task> {
        let request = self.http.get(self.item_url(task_id));
        decode(with_auth(request, token).send().await?).await
    }

    /// Apply a partial update to a task.
    pub async fn update_task(&self, token: &str, task_id: i64, patch: &TaskPatch) -> Result<Task> {
        let request = self.http.put(self.item_url(task_id)).json(patch);
        decode(with_auth(request, token).send().await?).await
    }

    /// Delete a task by id.
    pub async fn delete_task(&self, token: &str, task_id: i64) -> Result<DeleteDetail> {
        let request = self.http.delete(self.item_url(task_id));
        decode(with_auth(request, token).send().await?).await
    }

    fn collection_url(&self) -> String {
        format!("{}/api/tasks/", self.base_url)
    }

    fn item_url(&self, task_id: i64) -> String {
        format!("{}/api/tasks/{}", self.base_url, task_id)
    }
}

/// Attach a bearer token unless it is empty (unauthenticated calls carry no
/// Authorization header and get the backend's 401).
fn with_auth(request: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
    if token.is_empty() {
        request
    } else {
        request.bearer_auth(token)
    }
}

/// Decode a 2xx body, or capture status and body of a failed response.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SysselError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}
