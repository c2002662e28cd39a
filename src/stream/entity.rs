//! The four live entity streams.
//!
//! Each stream differs only in where it connects, which `event:` name it
//! accepts, how its resume cursor is derived and how a payload becomes
//! board actions. The reconnect loop in [`crate::sync::subscriber`] is
//! shared by all of them.

use serde::Deserialize;

use super::cursor;
use crate::api::StreamRequest;
use crate::board::merge::Patch;
use crate::board::models::{BoardChatMessage, TaskComment, TaskCounts};
use crate::board::state::{BoardAction, BoardState};

pub trait EntityStream: Send + Sync + 'static {
    /// Short name used in logs.
    const NAME: &'static str;
    /// The `event:` field this stream accepts; other frames are skipped.
    const EVENT: &'static str;

    fn request(board_id: &str) -> StreamRequest;

    /// Resume point computed from what is already held locally.
    fn cursor(state: &BoardState) -> Option<String>;

    /// Turn one frame's JSON data into zero or more actions.
    fn actions(data: &str) -> Result<Vec<BoardAction>, serde_json::Error>;
}

pub const TASK_COMMENT_EVENT: &str = "task.comment";

pub struct TaskStream;

#[derive(Debug, Deserialize)]
struct TaskFrame {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    task: Option<Patch>,
    #[serde(default)]
    comment: Option<Patch>,
}

impl EntityStream for TaskStream {
    const NAME: &'static str = "tasks";
    const EVENT: &'static str = "task";

    fn request(board_id: &str) -> StreamRequest {
        StreamRequest::new(format!("/api/v1/boards/{board_id}/tasks/stream"))
    }

    fn cursor(state: &BoardState) -> Option<String> {
        cursor::latest(&state.tasks, cursor::task_timestamp)
    }

    fn actions(data: &str) -> Result<Vec<BoardAction>, serde_json::Error> {
        let frame: TaskFrame = serde_json::from_str(data)?;
        let is_comment = frame.kind.as_deref() == Some(TASK_COMMENT_EVENT)
            && frame
                .comment
                .as_ref()
                .and_then(|comment| comment.get("task_id"))
                .is_some_and(|task_id| task_id.is_string());

        if is_comment {
            if let Some(comment) = frame.comment {
                let comment: TaskComment = serde_json::from_value(comment.into())?;
                return Ok(vec![BoardAction::CommentReceived(comment)]);
            }
        }
        Ok(frame.task.map(BoardAction::TaskUpserted).into_iter().collect())
    }
}

pub struct ApprovalStream;

#[derive(Debug, Deserialize)]
struct ApprovalFrame {
    #[serde(default)]
    approval: Option<Patch>,
    #[serde(default)]
    task_counts: Option<TaskCounts>,
    #[serde(default)]
    pending_approvals_count: Option<u32>,
}

impl EntityStream for ApprovalStream {
    const NAME: &'static str = "approvals";
    const EVENT: &'static str = "approval";

    fn request(board_id: &str) -> StreamRequest {
        StreamRequest::new(format!("/api/v1/boards/{board_id}/approvals/stream"))
    }

    fn cursor(state: &BoardState) -> Option<String> {
        cursor::latest(&state.approvals, cursor::approval_timestamp)
    }

    fn actions(data: &str) -> Result<Vec<BoardAction>, serde_json::Error> {
        let frame: ApprovalFrame = serde_json::from_str(data)?;
        if frame.approval.is_none()
            && frame.task_counts.is_none()
            && frame.pending_approvals_count.is_none()
        {
            return Ok(Vec::new());
        }
        Ok(vec![BoardAction::ApprovalUpserted {
            approval: frame.approval,
            task_counts: frame.task_counts,
            pending_approvals_count: frame.pending_approvals_count,
        }])
    }
}

pub struct AgentStream;

#[derive(Debug, Deserialize)]
struct AgentFrame {
    #[serde(default)]
    agent: Option<Patch>,
}

impl EntityStream for AgentStream {
    const NAME: &'static str = "agents";
    const EVENT: &'static str = "agent";

    fn request(board_id: &str) -> StreamRequest {
        StreamRequest::new("/api/v1/agents/stream").query("board_id", board_id)
    }

    fn cursor(state: &BoardState) -> Option<String> {
        cursor::latest(&state.agents, cursor::agent_timestamp)
    }

    fn actions(data: &str) -> Result<Vec<BoardAction>, serde_json::Error> {
        let frame: AgentFrame = serde_json::from_str(data)?;
        Ok(frame.agent.map(BoardAction::AgentUpserted).into_iter().collect())
    }
}

pub struct ChatStream;

#[derive(Debug, Deserialize)]
struct ChatFrame {
    #[serde(default)]
    memory: Option<BoardChatMessage>,
}

impl EntityStream for ChatStream {
    const NAME: &'static str = "chat";
    const EVENT: &'static str = "memory";

    fn request(board_id: &str) -> StreamRequest {
        StreamRequest::new(format!("/api/v1/boards/{board_id}/memory/stream"))
            .query("is_chat", "true")
    }

    fn cursor(state: &BoardState) -> Option<String> {
        cursor::latest(&state.chat_messages, cursor::chat_timestamp)
    }

    fn actions(data: &str) -> Result<Vec<BoardAction>, serde_json::Error> {
        let frame: ChatFrame = serde_json::from_str(data)?;
        Ok(frame.memory.map(BoardAction::ChatReceived).into_iter().collect())
    }
}
