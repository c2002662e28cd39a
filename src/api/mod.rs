//! Mission Control backend API.
//!
//! Two seams keep the sync layer testable without a server: [`BoardApi`]
//! for request/response calls and [`StreamSource`] for event streams.
//! [`ApiClient`] implements both over HTTP.

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::board::merge::Patch;
use crate::board::models::{
    ApprovalStatus, BoardChatMessage, BoardSnapshot, TaskComment, TaskPriority, TaskStatus,
};
use crate::errors::ApiError;

/// Raw body chunks of an open event stream.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ApiError>>;

/// Where an entity stream connects, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl StreamRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Query pairs for one connect attempt, with `since` appended when set.
    pub fn query_with_since(&self, since: Option<&str>) -> Vec<(String, String)> {
        let mut query = self.query.clone();
        if let Some(since) = since {
            query.push(("since".to_string(), since.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Partial task update. Outer `None` leaves a field alone; for nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<Option<String>>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageRequest {
    pub content: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn snapshot(&self, board_id: &str) -> Result<BoardSnapshot, ApiError>;

    async fn create_task(
        &self,
        board_id: &str,
        request: &CreateTaskRequest,
    ) -> Result<Patch, ApiError>;

    async fn update_task(
        &self,
        board_id: &str,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<Patch, ApiError>;

    async fn delete_task(&self, board_id: &str, task_id: &str) -> Result<(), ApiError>;

    async fn list_comments(
        &self,
        board_id: &str,
        task_id: &str,
    ) -> Result<Vec<TaskComment>, ApiError>;

    async fn create_comment(
        &self,
        board_id: &str,
        task_id: &str,
        message: &str,
    ) -> Result<TaskComment, ApiError>;

    async fn decide_approval(
        &self,
        board_id: &str,
        approval_id: &str,
        status: ApprovalStatus,
    ) -> Result<Patch, ApiError>;

    async fn send_chat(
        &self,
        board_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<BoardChatMessage, ApiError>;
}

#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Connect and return the response body. Fails on transport errors and
    /// on any status other than 200.
    async fn open(
        &self,
        request: &StreamRequest,
        since: Option<&str>,
    ) -> Result<ByteStream, ApiError>;

    /// Whether connecting can succeed at all. Streams are never started for
    /// a signed-out source.
    fn is_signed_in(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn since_is_appended_after_fixed_query() {
        let request = StreamRequest::new("/api/v1/agents/stream").query("board_id", "b1");
        assert_eq!(request.query_with_since(None).len(), 1);
        assert_eq!(
            request.query_with_since(Some("2024-01-01T00:00:00Z")),
            vec![
                ("board_id".to_string(), "b1".to_string()),
                ("since".to_string(), "2024-01-01T00:00:00Z".to_string()),
            ]
        );
    }

    #[test]
    fn task_update_serializes_only_set_fields() {
        let update = TaskUpdate {
            assigned_agent_id: Some(None),
            ..TaskUpdate::status(TaskStatus::Inbox)
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "inbox", "assigned_agent_id": null})
        );
        assert!(TaskUpdate::default().is_empty());
        assert!(!update.is_empty());
    }
}
