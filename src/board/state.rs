//! Board state and its reducer.
//!
//! Every change to the locally cached board goes through
//! [`BoardState::reduce`] as a [`BoardAction`]. Streamed events, snapshot
//! loads and confirmed mutation responses all use the same actions, so the
//! upsert rules live in exactly one place.
//!
//! Actions describe what happened (a task arrived, a comment was posted),
//! not how to apply it. Reconciliation is last-write-wins by `id`; there is
//! no sequence number and no ordering between streams.

use std::collections::BTreeMap;

use super::merge::{self, Patch};
use super::models::{
    Agent, Approval, Board, BoardChatMessage, BoardSnapshot, Task, TaskComment, TaskCounts,
    TaskStatus,
};
use crate::errors::SyncError;

/// Maximum number of comments kept in the cross-task live feed.
pub const LIVE_FEED_LIMIT: usize = 50;

/// Independently settable error slots, one per area of the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Board,
    Approvals,
    Chat,
    Comments,
    CreateTask,
    SaveTask,
    DeleteTask,
    PostComment,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Approvals => "approvals",
            Self::Chat => "chat",
            Self::Comments => "comments",
            Self::CreateTask => "create_task",
            Self::SaveTask => "save_task",
            Self::DeleteTask => "delete_task",
            Self::PostComment => "post_comment",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The task currently opened for detail, with its comment thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDetail {
    pub task_id: String,
    pub comments: Vec<TaskComment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub board_id: String,
    pub board: Option<Board>,
    pub tasks: Vec<Task>,
    pub agents: Vec<Agent>,
    pub approvals: Vec<Approval>,
    pub chat_messages: Vec<BoardChatMessage>,
    /// Most recent comments across all tasks, newest pushed first.
    pub live_feed: Vec<TaskComment>,
    pub detail: Option<TaskDetail>,
    pub pending_approvals_count: u32,
    pub errors: BTreeMap<Section, String>,
}

/// Everything that can happen to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    SnapshotLoaded(BoardSnapshot),
    SnapshotFailed(String),

    /// A full or partial task from the stream or a mutation response.
    TaskUpserted(Patch),
    TaskRemoved(String),
    /// Optimistic status change ahead of the server's answer.
    TaskStatusChanged {
        task_id: String,
        status: TaskStatus,
    },
    /// Whole-list rollback after a failed optimistic change.
    TasksRestored(Vec<Task>),

    TaskOpened(String),
    TaskClosed,
    CommentsLoaded {
        task_id: String,
        comments: Vec<TaskComment>,
    },
    /// A comment pushed by the task stream.
    CommentReceived(TaskComment),
    /// A comment confirmed by the comment endpoint.
    CommentPosted(TaskComment),

    ApprovalUpserted {
        approval: Option<Patch>,
        task_counts: Option<TaskCounts>,
        pending_approvals_count: Option<u32>,
    },
    AgentUpserted(Patch),
    ChatReceived(BoardChatMessage),

    SectionFailed {
        section: Section,
        message: String,
    },
    SectionCleared(Section),
}

impl BoardAction {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SnapshotLoaded(_) => "snapshot_loaded",
            Self::SnapshotFailed(_) => "snapshot_failed",
            Self::TaskUpserted(_) => "task_upserted",
            Self::TaskRemoved(_) => "task_removed",
            Self::TaskStatusChanged { .. } => "task_status_changed",
            Self::TasksRestored(_) => "tasks_restored",
            Self::TaskOpened(_) => "task_opened",
            Self::TaskClosed => "task_closed",
            Self::CommentsLoaded { .. } => "comments_loaded",
            Self::CommentReceived(_) => "comment_received",
            Self::CommentPosted(_) => "comment_posted",
            Self::ApprovalUpserted { .. } => "approval_upserted",
            Self::AgentUpserted(_) => "agent_upserted",
            Self::ChatReceived(_) => "chat_received",
            Self::SectionFailed { .. } => "section_failed",
            Self::SectionCleared(_) => "section_cleared",
        }
    }
}

/// Display name of the agent with `agent_id`, if known.
fn assignee_name(agents: &[Agent], agent_id: Option<&str>) -> Option<String> {
    let agent_id = agent_id?;
    agents
        .iter()
        .find(|agent| agent.id == agent_id)
        .map(|agent| agent.name.clone())
}

fn merge_error(entity: &'static str, id: &str) -> impl FnOnce(serde_json::Error) -> SyncError {
    let id = id.to_string();
    move |source| SyncError::Merge { entity, id, source }
}

impl BoardState {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            ..Self::default()
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn error(&self, section: Section) -> Option<&str> {
        self.errors.get(&section).map(String::as_str)
    }

    /// Apply one action. On error the state is left unchanged.
    pub fn reduce(&mut self, action: BoardAction) -> Result<(), SyncError> {
        match action {
            BoardAction::SnapshotLoaded(snapshot) => self.load_snapshot(snapshot),
            BoardAction::SnapshotFailed(message) => {
                for section in [Section::Board, Section::Approvals, Section::Chat] {
                    self.errors.insert(section, message.clone());
                }
            }
            BoardAction::TaskUpserted(patch) => self.upsert_task(&patch)?,
            BoardAction::TaskRemoved(task_id) => {
                self.tasks.retain(|task| task.id != task_id);
                if self.detail.as_ref().is_some_and(|detail| detail.task_id == task_id) {
                    self.detail = None;
                }
            }
            BoardAction::TaskStatusChanged { task_id, status } => {
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) {
                    task.status = status;
                    if status == TaskStatus::Inbox {
                        task.assigned_agent_id = None;
                        task.assignee = None;
                    }
                }
            }
            BoardAction::TasksRestored(tasks) => self.tasks = tasks,
            BoardAction::TaskOpened(task_id) => {
                if self.task(&task_id).is_some() {
                    self.detail = Some(TaskDetail {
                        task_id,
                        comments: Vec::new(),
                    });
                    self.errors.remove(&Section::Comments);
                    self.errors.remove(&Section::PostComment);
                }
            }
            BoardAction::TaskClosed => {
                self.detail = None;
                self.errors.remove(&Section::Comments);
                self.errors.remove(&Section::PostComment);
            }
            BoardAction::CommentsLoaded { task_id, comments } => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.task_id == task_id) {
                    detail.comments = comments;
                }
            }
            BoardAction::CommentReceived(comment) => self.receive_comment(comment),
            BoardAction::CommentPosted(comment) => {
                let open = self.detail.as_mut().filter(|detail| {
                    comment.task_id.as_deref() == Some(detail.task_id.as_str())
                });
                if let Some(detail) = open {
                    if !detail.comments.iter().any(|item| item.id == comment.id) {
                        detail.comments.insert(0, comment);
                    }
                }
            }
            BoardAction::ApprovalUpserted {
                approval,
                task_counts,
                pending_approvals_count,
            } => {
                if let Some(patch) = approval {
                    self.upsert_approval(&patch)?;
                }
                if let Some(counts) = task_counts {
                    self.apply_task_counts(&counts);
                }
                if let Some(count) = pending_approvals_count {
                    self.pending_approvals_count = count;
                }
            }
            BoardAction::AgentUpserted(patch) => self.upsert_agent(&patch)?,
            BoardAction::ChatReceived(message) => self.receive_chat(message),
            BoardAction::SectionFailed { section, message } => {
                self.errors.insert(section, message);
            }
            BoardAction::SectionCleared(section) => {
                self.errors.remove(&section);
            }
        }
        Ok(())
    }

    fn load_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.board = Some(snapshot.board);
        self.tasks = snapshot.tasks;
        self.agents = snapshot.agents;
        self.approvals = snapshot.approvals;
        self.chat_messages = snapshot.chat_messages;
        self.chat_messages.sort_by_key(|message| message.created_at);
        self.pending_approvals_count = snapshot.pending_approvals_count;
        for section in [Section::Board, Section::Approvals, Section::Chat] {
            self.errors.remove(&section);
        }
    }

    fn upsert_task(&mut self, patch: &Patch) -> Result<(), SyncError> {
        let id = merge::patch_id(patch).ok_or(SyncError::MissingId { entity: "task" })?;
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                let existing = &self.tasks[index];
                let mut updated: Task =
                    merge::apply(existing, patch).map_err(merge_error("task", id))?;
                // Stream and mutation payloads never carry the counters.
                updated.approvals_count = existing.approvals_count;
                updated.approvals_pending_count = existing.approvals_pending_count;
                updated.assignee =
                    assignee_name(&self.agents, updated.assigned_agent_id.as_deref());
                self.tasks[index] = updated;
            }
            None => {
                let mut created: Task = merge::build(patch).map_err(merge_error("task", id))?;
                created.approvals_count = 0;
                created.approvals_pending_count = 0;
                created.assignee =
                    assignee_name(&self.agents, created.assigned_agent_id.as_deref());
                self.tasks.insert(0, created);
            }
        }
        Ok(())
    }

    fn upsert_approval(&mut self, patch: &Patch) -> Result<(), SyncError> {
        let id = merge::patch_id(patch).ok_or(SyncError::MissingId { entity: "approval" })?;
        match self.approvals.iter().position(|approval| approval.id == id) {
            Some(index) => {
                let updated: Approval = merge::apply(&self.approvals[index], patch)
                    .map_err(merge_error("approval", id))?;
                self.approvals[index] = updated;
            }
            None => {
                let created: Approval = merge::build(patch).map_err(merge_error("approval", id))?;
                self.approvals.insert(0, created);
            }
        }
        Ok(())
    }

    fn apply_task_counts(&mut self, counts: &TaskCounts) {
        let Some(task_id) = counts.task_id.as_deref() else {
            return;
        };
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) {
            task.approvals_count = counts.approvals_count.unwrap_or(task.approvals_count);
            task.approvals_pending_count = counts
                .approvals_pending_count
                .unwrap_or(task.approvals_pending_count);
        }
    }

    fn upsert_agent(&mut self, patch: &Patch) -> Result<(), SyncError> {
        let id = merge::patch_id(patch).ok_or(SyncError::MissingId { entity: "agent" })?;
        match self.agents.iter().position(|agent| agent.id == id) {
            Some(index) => {
                let updated: Agent =
                    merge::apply(&self.agents[index], patch).map_err(merge_error("agent", id))?;
                self.agents[index] = updated;
            }
            None => {
                let created: Agent = merge::build(patch).map_err(merge_error("agent", id))?;
                self.agents.insert(0, created);
            }
        }
        Ok(())
    }

    fn receive_comment(&mut self, comment: TaskComment) {
        let Some(task_id) = comment.task_id.clone() else {
            return;
        };

        if let Some(detail) = self.detail.as_mut().filter(|detail| detail.task_id == task_id) {
            if !detail.comments.iter().any(|item| item.id == comment.id) {
                detail.comments.push(comment.clone());
            }
        }

        if !self.live_feed.iter().any(|item| item.id == comment.id) {
            self.live_feed.insert(0, comment);
            self.live_feed.truncate(LIVE_FEED_LIMIT);
        }
    }

    fn receive_chat(&mut self, message: BoardChatMessage) {
        if !message.is_chat_tagged() {
            return;
        }
        if self.chat_messages.iter().any(|item| item.id == message.id) {
            return;
        }
        self.chat_messages.push(message);
        self.chat_messages.sort_by_key(|item| item.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn patch(value: Value) -> Patch {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn comment(id: &str, task_id: &str, created_at: &str) -> TaskComment {
        serde_json::from_value(json!({
            "id": id,
            "task_id": task_id,
            "message": format!("comment {id}"),
            "created_at": created_at
        }))
        .unwrap()
    }

    fn chat(id: &str, created_at: &str) -> BoardChatMessage {
        serde_json::from_value(json!({
            "id": id,
            "board_id": "b1",
            "content": format!("message {id}"),
            "tags": ["chat"],
            "created_at": created_at
        }))
        .unwrap()
    }

    fn state_with_task(task: Value) -> BoardState {
        let mut state = BoardState::new("b1");
        state.tasks.push(serde_json::from_value(task).unwrap());
        state
    }

    #[test]
    fn upserting_same_task_twice_is_idempotent() {
        let mut state = BoardState::new("b1");
        let event = patch(json!({
            "id": "t1",
            "title": "Ship it",
            "status": "review",
            "updated_at": "2024-01-01T00:00:00Z"
        }));

        state.reduce(BoardAction::TaskUpserted(event.clone())).unwrap();
        let after_first = state.clone();
        state.reduce(BoardAction::TaskUpserted(event)).unwrap();

        assert_eq!(state, after_first);
        assert_eq!(state.tasks.len(), 1);
    }

    #[test]
    fn new_tasks_are_prepended_with_zero_counters() {
        let mut state = state_with_task(json!({"id": "t0", "title": "Old"}));
        state
            .reduce(BoardAction::TaskUpserted(patch(json!({
                "id": "t1",
                "title": "New",
                "approvals_count": 9
            }))))
            .unwrap();

        assert_eq!(state.tasks[0].id, "t1");
        assert_eq!(state.tasks[0].approvals_count, 0);
        assert_eq!(state.tasks[1].id, "t0");
    }

    #[test]
    fn task_update_preserves_local_approval_counters() {
        let mut state = state_with_task(json!({
            "id": "t1",
            "title": "Review contract",
            "approvals_count": 3,
            "approvals_pending_count": 2
        }));

        state
            .reduce(BoardAction::TaskUpserted(patch(json!({
                "id": "t1",
                "title": "Review contract v2",
                "status": "in_progress"
            }))))
            .unwrap();

        let task = state.task("t1").unwrap();
        assert_eq!(task.title, "Review contract v2");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.approvals_pending_count, 2);
        assert_eq!(task.approvals_count, 3);
    }

    #[test]
    fn task_upsert_recomputes_assignee_from_agents() {
        let mut state =
            state_with_task(json!({"id": "t1", "title": "Triage", "assignee": "Stale"}));
        state
            .agents
            .push(serde_json::from_value(json!({"id": "a1", "name": "Scout"})).unwrap());

        state
            .reduce(BoardAction::TaskUpserted(patch(
                json!({"id": "t1", "assigned_agent_id": "a1"}),
            )))
            .unwrap();
        assert_eq!(state.task("t1").unwrap().assignee.as_deref(), Some("Scout"));

        state
            .reduce(BoardAction::TaskUpserted(patch(
                json!({"id": "t1", "assigned_agent_id": null}),
            )))
            .unwrap();
        assert_eq!(state.task("t1").unwrap().assignee, None);
    }

    #[test]
    fn task_patch_without_id_is_rejected_without_change() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Keep"}));
        let before = state.clone();
        let result = state.reduce(BoardAction::TaskUpserted(patch(json!({"title": "x"}))));
        assert!(matches!(result, Err(SyncError::MissingId { entity: "task" })));
        assert_eq!(state, before);
    }

    #[test]
    fn malformed_task_update_leaves_state_unchanged() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Keep"}));
        let before = state.clone();
        let result = state.reduce(BoardAction::TaskUpserted(patch(
            json!({"id": "t1", "status": "blocked"}),
        )));
        assert!(matches!(result, Err(SyncError::Merge { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn live_feed_keeps_fifty_most_recent() {
        let mut state = BoardState::new("b1");
        for i in 0..60 {
            let created = format!("2024-01-01T00:{:02}:00Z", i);
            state
                .reduce(BoardAction::CommentReceived(comment(&format!("c{i}"), "t1", &created)))
                .unwrap();
        }

        assert_eq!(state.live_feed.len(), LIVE_FEED_LIMIT);
        assert_eq!(state.live_feed[0].id, "c59");
        assert_eq!(state.live_feed[LIVE_FEED_LIMIT - 1].id, "c10");
        assert!(!state.live_feed.iter().any(|c| c.id == "c9"));
    }

    #[test]
    fn live_feed_deduplicates_by_id() {
        let mut state = BoardState::new("b1");
        let c = comment("c1", "t1", "2024-01-01T00:00:00Z");
        state.reduce(BoardAction::CommentReceived(c.clone())).unwrap();
        state.reduce(BoardAction::CommentReceived(c)).unwrap();
        assert_eq!(state.live_feed.len(), 1);
    }

    #[test]
    fn streamed_comment_appends_only_to_matching_open_thread() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Open"}));
        state.tasks.push(serde_json::from_value(json!({"id": "t2", "title": "Other"})).unwrap());
        state.reduce(BoardAction::TaskOpened("t1".to_string())).unwrap();

        state
            .reduce(BoardAction::CommentReceived(comment("c1", "t1", "2024-01-01T00:00:00Z")))
            .unwrap();
        state
            .reduce(BoardAction::CommentReceived(comment("c2", "t2", "2024-01-01T00:01:00Z")))
            .unwrap();
        state
            .reduce(BoardAction::CommentReceived(comment("c1", "t1", "2024-01-01T00:00:00Z")))
            .unwrap();

        let detail = state.detail.as_ref().unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].id, "c1");
        assert_eq!(state.live_feed.len(), 2);
    }

    #[test]
    fn comments_loaded_for_other_task_are_ignored() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Open"}));
        state.reduce(BoardAction::TaskOpened("t1".to_string())).unwrap();
        state
            .reduce(BoardAction::CommentsLoaded {
                task_id: "t2".to_string(),
                comments: vec![comment("c1", "t2", "2024-01-01T00:00:00Z")],
            })
            .unwrap();
        assert!(state.detail.as_ref().unwrap().comments.is_empty());
    }

    #[test]
    fn opening_unknown_task_does_nothing() {
        let mut state = BoardState::new("b1");
        state.reduce(BoardAction::TaskOpened("missing".to_string())).unwrap();
        assert!(state.detail.is_none());
    }

    #[test]
    fn posted_comment_is_prepended_to_open_thread() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Open"}));
        state.reduce(BoardAction::TaskOpened("t1".to_string())).unwrap();
        state
            .reduce(BoardAction::CommentsLoaded {
                task_id: "t1".to_string(),
                comments: vec![comment("c1", "t1", "2024-01-01T00:00:00Z")],
            })
            .unwrap();
        state
            .reduce(BoardAction::CommentPosted(comment("c2", "t1", "2024-01-01T00:05:00Z")))
            .unwrap();

        let ids: Vec<_> = state
            .detail
            .as_ref()
            .unwrap()
            .comments
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["c2", "c1"]);
        assert!(state.live_feed.is_empty());
    }

    #[test]
    fn chat_messages_are_kept_in_chronological_order() {
        let mut state = BoardState::new("b1");
        state.reduce(BoardAction::ChatReceived(chat("m3", "2024-01-03T00:00:00Z"))).unwrap();
        state.reduce(BoardAction::ChatReceived(chat("m1", "2024-01-01T00:00:00Z"))).unwrap();
        state.reduce(BoardAction::ChatReceived(chat("m2", "2024-01-02T00:00:00Z"))).unwrap();

        let ids: Vec<_> = state.chat_messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
    }

    #[test]
    fn chat_ignores_untagged_and_duplicate_messages() {
        let mut state = BoardState::new("b1");
        let mut note = chat("m1", "2024-01-01T00:00:00Z");
        note.tags = vec!["memory".to_string()];
        state.reduce(BoardAction::ChatReceived(note)).unwrap();
        assert!(state.chat_messages.is_empty());

        let message = chat("m2", "2024-01-01T00:00:00Z");
        state.reduce(BoardAction::ChatReceived(message.clone())).unwrap();
        state.reduce(BoardAction::ChatReceived(message)).unwrap();
        assert_eq!(state.chat_messages.len(), 1);
    }

    #[test]
    fn approval_counts_apply_even_without_matching_approval() {
        let mut state = state_with_task(json!({
            "id": "t1",
            "title": "Deploy",
            "approvals_count": 1,
            "approvals_pending_count": 1
        }));

        state
            .reduce(BoardAction::ApprovalUpserted {
                approval: None,
                task_counts: Some(TaskCounts {
                    task_id: Some("t1".to_string()),
                    approvals_count: Some(2),
                    approvals_pending_count: None,
                }),
                pending_approvals_count: Some(4),
            })
            .unwrap();

        let task = state.task("t1").unwrap();
        assert_eq!(task.approvals_count, 2);
        assert_eq!(task.approvals_pending_count, 1);
        assert_eq!(state.pending_approvals_count, 4);
    }

    #[test]
    fn approval_upsert_inserts_then_merges() {
        let mut state = BoardState::new("b1");
        let created = patch(json!({
            "id": "ap1",
            "action_type": "task.assign",
            "confidence": 75,
            "payload": {"task_id": "t1"},
            "created_at": "2024-01-01T00:00:00Z"
        }));
        state
            .reduce(BoardAction::ApprovalUpserted {
                approval: Some(created),
                task_counts: None,
                pending_approvals_count: None,
            })
            .unwrap();
        state
            .reduce(BoardAction::ApprovalUpserted {
                approval: Some(patch(json!({
                    "id": "ap1",
                    "status": "approved",
                    "resolved_at": "2024-01-02T00:00:00Z"
                }))),
                task_counts: None,
                pending_approvals_count: None,
            })
            .unwrap();

        assert_eq!(state.approvals.len(), 1);
        let approval = &state.approvals[0];
        assert_eq!(approval.status, crate::board::models::ApprovalStatus::Approved);
        assert_eq!(approval.action_type, "task.assign");
        assert!(approval.resolved_at.is_some());
    }

    #[test]
    fn agent_upsert_is_shallow_merge() {
        let mut state = BoardState::new("b1");
        state
            .reduce(BoardAction::AgentUpserted(patch(json!({
                "id": "a1",
                "name": "Scout",
                "status": "online",
                "is_board_lead": true
            }))))
            .unwrap();
        state
            .reduce(BoardAction::AgentUpserted(patch(json!({"id": "a1", "name": "Scout II"}))))
            .unwrap();

        let agent = &state.agents[0];
        assert_eq!(agent.name, "Scout II");
        assert!(agent.is_board_lead);
    }

    #[test]
    fn optimistic_move_to_inbox_clears_assignment() {
        let mut state = state_with_task(json!({
            "id": "t1",
            "title": "Triage",
            "status": "review",
            "assigned_agent_id": "a1",
            "assignee": "Scout"
        }));
        state
            .reduce(BoardAction::TaskStatusChanged {
                task_id: "t1".to_string(),
                status: TaskStatus::Inbox,
            })
            .unwrap();
        let task = state.task("t1").unwrap();
        assert_eq!(task.status, TaskStatus::Inbox);
        assert_eq!(task.assigned_agent_id, None);
        assert_eq!(task.assignee, None);
    }

    #[test]
    fn removing_open_task_closes_detail() {
        let mut state = state_with_task(json!({"id": "t1", "title": "Gone"}));
        state.reduce(BoardAction::TaskOpened("t1".to_string())).unwrap();
        state.reduce(BoardAction::TaskRemoved("t1".to_string())).unwrap();
        assert!(state.tasks.is_empty());
        assert!(state.detail.is_none());
    }

    #[test]
    fn snapshot_failure_sets_section_errors_independently() {
        let mut state = BoardState::new("b1");
        state
            .reduce(BoardAction::SnapshotFailed("Unable to load board snapshot.".to_string()))
            .unwrap();
        assert!(state.error(Section::Board).is_some());
        assert!(state.error(Section::Approvals).is_some());
        assert!(state.error(Section::Chat).is_some());

        state.reduce(BoardAction::SectionCleared(Section::Chat)).unwrap();
        assert!(state.error(Section::Chat).is_none());
        assert!(state.error(Section::Board).is_some());
    }
}
