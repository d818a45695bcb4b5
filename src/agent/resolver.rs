//! Title-to-id resolution for ambiguous task references.

use crate::backend::TaskStoreClient;
use crate::error::{Result, SysselError};
use serde_json::{json, Map, Value};

/// How a user-supplied title is matched against task titles.
///
/// Both policies compare case-insensitively and pick the first match in
/// backend list order when several tasks qualify. Silently picking the
/// first is a documented limitation; asking the user for clarification is
/// a known future improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMatch {
    /// The target must be a substring of the task title. Used on the
    /// conversational path, where users rarely quote titles verbatim.
    Substring,
    /// The target must equal the task title. Used on the tool-dispatch path.
    Exact,
}

impl TitleMatch {
    fn matches(&self, task_title: &str, target: &str) -> bool {
        let task_title = task_title.to_lowercase();
        let target = target.to_lowercase();
        match self {
            TitleMatch::Substring => task_title.contains(&target),
            TitleMatch::Exact => task_title == target,
        }
    }
}

/// Resolves `task_title` references to a concrete `task_id`.
///
/// Re-fetches the task list on every call; nothing is cached across
/// invocations, so a resolution always sees the latest backend state at
/// the cost of one extra list call.
pub struct TaskResolver {
    client: TaskStoreClient,
    matching: TitleMatch,
}

impl TaskResolver {
    pub fn new(client: TaskStoreClient, matching: TitleMatch) -> Self {
        Self { client, matching }
    }

    /// Resolve an optional id/title pair to a task id.
    ///
    /// An id of 0 counts as unset, like an absent field.
    pub async fn resolve_ref(
        &self,
        task_id: Option<i64>,
        task_title: Option<&str>,
        session_token: &str,
    ) -> Result<i64> {
        if let Some(id) = task_id.filter(|id| *id != 0) {
            return Ok(id);
        }

        let Some(target) = task_title.filter(|t| !t.is_empty()) else {
            return Err(SysselError::MissingIdentifier);
        };

        let tasks = self.client.list_tasks(session_token).await?;
        tasks
            .iter()
            .find(|t| self.matching.matches(&t.title, target))
            .map(|t| t.id)
            .ok_or_else(|| SysselError::TaskNotFound(target.to_string()))
    }

    /// Resolve in place on a raw argument object: on success `task_id` is
    /// set and `task_title` removed; on failure the arguments are left
    /// untouched. Used by the orchestrator before dispatch.
    pub async fn resolve_arguments(
        &self,
        arguments: &mut Map<String, Value>,
        session_token: &str,
    ) -> Result<i64> {
        // already identified: keep the arguments exactly as they are
        if let Some(id) = arguments
            .get("task_id")
            .and_then(Value::as_i64)
            .filter(|id| *id != 0)
        {
            return Ok(id);
        }

        let task_title = arguments
            .get("task_title")
            .and_then(Value::as_str)
            .map(str::to_string);

        let id = self
            .resolve_ref(None, task_title.as_deref(), session_token)
            .await?;

        arguments.insert("task_id".to_string(), json!(id));
        arguments.remove("task_title");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::{spawn_fake_backend, TEST_TOKEN};
    use crate::backend::Task;
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

    async fn resolver(initial: Vec<Task>, matching: TitleMatch) -> TaskResolver {
        let (base_url, _state) = spawn_fake_backend(initial).await;
        let client = TaskStoreClient::new(&base_url, Duration::from_secs(5)).unwrap();
        TaskResolver::new(client, matching)
    }

    #[tokio::test]
    async fn test_existing_id_short_circuits() {
        let resolver = resolver(vec![], TitleMatch::Exact).await;
        let id = resolver
            .resolve_ref(Some(7), Some("ignored"), TEST_TOKEN)
            .await
            .unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn test_zero_id_counts_as_unset() {
        let resolver = resolver(vec![task(3, "Buy milk")], TitleMatch::Exact).await;
        let id = resolver
            .resolve_ref(Some(0), Some("buy milk"), TEST_TOKEN)
            .await
            .unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn test_exact_match_is_case_insensitive() {
        let resolver = resolver(vec![task(1, "Buy Milk")], TitleMatch::Exact).await;
        let id = resolver
            .resolve_ref(None, Some("buy milk"), TEST_TOKEN)
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_exact_policy_rejects_partial_titles() {
        let resolver = resolver(vec![task(1, "Buy milk")], TitleMatch::Exact).await;
        let err = resolver
            .resolve_ref(None, Some("milk"), TEST_TOKEN)
            .await
            .unwrap_err();
        assert!(matches!(err, SysselError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_substring_policy_accepts_partial_titles() {
        let resolver = resolver(vec![task(1, "Buy milk at the store")], TitleMatch::Substring).await;
        let id = resolver
            .resolve_ref(None, Some("buy milk"), TEST_TOKEN)
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_first_match_wins_deterministically() {
        let tasks = vec![task(4, "Buy milk"), task(9, "Buy milk")];
        let resolver = resolver(tasks, TitleMatch::Exact).await;
        for _ in 0..3 {
            let id = resolver
                .resolve_ref(None, Some("buy milk"), TEST_TOKEN)
                .await
                .unwrap();
            assert_eq!(id, 4);
        }
    }

    #[tokio::test]
    async fn test_missing_identifier() {
        let resolver = resolver(vec![], TitleMatch::Exact).await;
        let err = resolver.resolve_ref(None, None, TEST_TOKEN).await.unwrap_err();
        assert!(matches!(err, SysselError::MissingIdentifier));
    }

    #[tokio::test]
    async fn test_resolve_arguments_rewrites_title_to_id() {
        let resolver = resolver(vec![task(7, "Buy milk")], TitleMatch::Substring).await;
        let mut arguments = serde_json::json!({"task_title": "buy milk", "status": "done"})
            .as_object()
            .unwrap()
            .clone();

        let id = resolver
            .resolve_arguments(&mut arguments, TEST_TOKEN)
            .await
            .unwrap();

        assert_eq!(id, 7);
        assert_eq!(arguments.get("task_id"), Some(&serde_json::json!(7)));
        assert!(!arguments.contains_key("task_title"));
        assert_eq!(arguments.get("status"), Some(&serde_json::json!("done")));
    }

    #[tokio::test]
    async fn test_resolve_arguments_untouched_when_id_present() {
        let resolver = resolver(vec![task(7, "Buy milk")], TitleMatch::Substring).await;
        let mut arguments = serde_json::json!({"task_id": 9, "task_title": "buy milk"})
            .as_object()
            .unwrap()
            .clone();

        let id = resolver
            .resolve_arguments(&mut arguments, TEST_TOKEN)
            .await
            .unwrap();

        // the supplied id wins and the arguments keep their original shape
        assert_eq!(id, 9);
        assert_eq!(arguments.get("task_id"), Some(&serde_json::json!(9)));
        assert_eq!(
            arguments.get("task_title"),
            Some(&serde_json::json!("buy milk"))
        );
    }

    #[tokio::test]
    async fn test_resolve_arguments_leaves_arguments_on_failure() {
        let resolver = resolver(vec![], TitleMatch::Substring).await;
        let mut arguments = serde_json::json!({"task_title": "nope"})
            .as_object()
            .unwrap()
            .clone();

        let err = resolver
            .resolve_arguments(&mut arguments, TEST_TOKEN)
            .await
            .unwrap_err();

        assert!(matches!(err, SysselError::TaskNotFound(_)));
        assert_eq!(arguments.get("task_title"), Some(&serde_json::json!("nope")));
        assert!(!arguments.contains_key("task_id"));
    }
}
