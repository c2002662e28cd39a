use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::timestamp;

/// Treat an explicit `null` the same as an omitted field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Inbox,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const COLUMNS: [TaskStatus; 4] = [Self::Inbox, Self::InProgress, Self::Review, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Agent liveness as computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Online,
    #[default]
    Offline,
    Provisioning,
    Updating,
    Deleting,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Provisioning => "provisioning",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Invalid approval status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gateway_id: Option<String>,
    #[serde(default, with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A task as shown on the board, including the card-only fields
/// (`assignee`, approval counters) the snapshot endpoint adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: TaskPriority,
    #[serde(default, with = "timestamp::optional")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_agent_id: Option<String>,
    #[serde(default)]
    pub created_by_user_id: Option<String>,
    #[serde(default, with = "timestamp::optional")]
    pub in_progress_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approvals_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approvals_pending_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AgentStatus,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_board_lead: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_gateway_main: bool,
    #[serde(default)]
    pub identity_profile: Option<Map<String, Value>>,
    #[serde(default, with = "timestamp::optional")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A task comment. `agent_id == None` means a human operator wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub action_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApprovalStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
    #[serde(default)]
    pub rubric_scores: Option<Map<String, Value>>,
    #[serde(with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::optional")]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardChatMessage {
    pub id: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_chat: bool,
    #[serde(with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
}

impl BoardChatMessage {
    pub const CHAT_TAG: &'static str = "chat";

    pub fn is_chat_tagged(&self) -> bool {
        self.tags.iter().any(|tag| tag == Self::CHAT_TAG)
    }

    /// Author label; messages without a source came from the operator.
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("User")
    }
}

/// Approval counters recomputed server-side for one task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub approvals_count: Option<u32>,
    #[serde(default)]
    pub approvals_pending_count: Option<u32>,
}

/// Everything the board view needs, fetched in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approvals: Vec<Approval>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat_messages: Vec<BoardChatMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending_approvals_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_defaults_status_and_priority_when_omitted() {
        let task: Task =
            serde_json::from_value(json!({"id": "t1", "title": "Write docs"})).unwrap();
        assert_eq!(task.status, TaskStatus::Inbox);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.approvals_count, 0);
        assert_eq!(task.approvals_pending_count, 0);
    }

    #[test]
    fn task_defaults_status_and_priority_when_null() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "title": "Write docs",
            "status": null,
            "priority": null,
            "approvals_count": null
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Inbox);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.approvals_count, 0);
    }

    #[test]
    fn task_rejects_unknown_status() {
        let result = serde_json::from_value::<Task>(json!({"id": "t1", "status": "blocked"}));
        assert!(result.is_err());
    }

    #[test]
    fn agent_status_defaults_to_offline() {
        let agent: Agent = serde_json::from_value(json!({"id": "a1", "name": "Scout"})).unwrap();
        assert_eq!(agent.status, AgentStatus::Offline);
        assert!(!agent.is_board_lead);
    }

    #[test]
    fn approval_status_defaults_to_pending() {
        let approval: Approval = serde_json::from_value(json!({
            "id": "ap1",
            "action_type": "task.assign",
            "confidence": 80,
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert_eq!(approval.confidence, 80.0);
        assert!(approval.resolved_at.is_none());
    }

    #[test]
    fn chat_message_tag_and_source_helpers() {
        let message: BoardChatMessage = serde_json::from_value(json!({
            "id": "m1",
            "content": "hello",
            "tags": ["chat"],
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(message.is_chat_tagged());
        assert_eq!(message.source_label(), "User");

        let untagged: BoardChatMessage = serde_json::from_value(json!({
            "id": "m2",
            "content": "note",
            "tags": null,
            "source": "Lead",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(!untagged.is_chat_tagged());
        assert_eq!(untagged.source_label(), "Lead");
    }

    #[test]
    fn task_status_round_trips_through_str() {
        for status in TaskStatus::COLUMNS {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn snapshot_tolerates_missing_collections() {
        let snapshot: BoardSnapshot = serde_json::from_value(json!({
            "board": {"id": "b1", "name": "Ops"},
            "tasks": null
        }))
        .unwrap();
        assert!(snapshot.tasks.is_empty());
        assert!(snapshot.chat_messages.is_empty());
        assert_eq!(snapshot.pending_approvals_count, 0);
    }
}
