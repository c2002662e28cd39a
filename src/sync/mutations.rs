//! Request/response mutations reconciled into the board state.
//!
//! Confirmed server payloads go through the same actions streamed events
//! use, so the stream echoing the change later is a no-op. Every failure
//! is recorded in the matching [`Section`] and returned to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{BoardApi, ChatMessageRequest, CreateTaskRequest, TaskUpdate};
use crate::board::models::{
    Approval, ApprovalStatus, BoardChatMessage, Task, TaskComment, TaskPriority, TaskStatus,
};
use crate::board::state::{BoardAction, Section};
use crate::board::store::BoardStore;
use crate::errors::SyncError;

pub const TITLE_REQUIRED: &str = "Add a task title to continue.";
pub const EDIT_TITLE_REQUIRED: &str = "Title is required.";
pub const MESSAGE_REQUIRED: &str = "Write a message before sending.";

#[derive(Clone)]
pub struct Mutations {
    board_id: String,
    api: Arc<dyn BoardApi>,
    store: BoardStore,
}

/// Trimmed text, or `None` when only whitespace remains.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Mutations {
    pub fn new(board_id: impl Into<String>, api: Arc<dyn BoardApi>, store: BoardStore) -> Self {
        Self {
            board_id: board_id.into(),
            api,
            store,
        }
    }

    fn record(&self, section: Section, err: impl Into<SyncError>) -> SyncError {
        let err = err.into();
        warn!(section = %section, error = %err, "Board mutation failed");
        let _ = self.store.dispatch(BoardAction::SectionFailed {
            section,
            message: err.to_string(),
        });
        err
    }

    fn clear(&self, section: Section) {
        let _ = self.store.dispatch(BoardAction::SectionCleared(section));
    }

    fn task(&self, task_id: &str) -> Option<Task> {
        self.store.read(|state| state.task(task_id).cloned())
    }

    fn stored_task(&self, task_id: &str) -> Result<Task, SyncError> {
        self.task(task_id).ok_or_else(|| SyncError::TaskNotFound {
            id: task_id.to_string(),
        })
    }

    /// Create a task in the inbox.
    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        priority: TaskPriority,
    ) -> Result<Task, SyncError> {
        let Some(title) = non_blank(title) else {
            let err = SyncError::Validation(TITLE_REQUIRED.to_string());
            return Err(self.record(Section::CreateTask, err));
        };
        let request = CreateTaskRequest {
            title,
            description: description.and_then(non_blank),
            status: TaskStatus::Inbox,
            priority,
        };

        let created = self
            .api
            .create_task(&self.board_id, &request)
            .await
            .map_err(|err| self.record(Section::CreateTask, err))?;
        let id = crate::board::merge::patch_id(&created)
            .map(str::to_string)
            .ok_or(SyncError::MissingId { entity: "task" })?;

        self.store.dispatch(BoardAction::TaskUpserted(created))?;
        self.clear(Section::CreateTask);
        info!(task_id = %id, "Task created");
        self.stored_task(&id)
    }

    /// Edit a task. Approval counters are kept from the local copy.
    pub async fn update_task(
        &self,
        task_id: &str,
        mut update: TaskUpdate,
    ) -> Result<Task, SyncError> {
        if let Some(title) = update.title.take() {
            let Some(title) = non_blank(&title) else {
                let err = SyncError::Validation(EDIT_TITLE_REQUIRED.to_string());
                return Err(self.record(Section::SaveTask, err));
            };
            update.title = Some(title);
        }
        update.description = update
            .description
            .take()
            .map(|description| description.and_then(|text| non_blank(&text)));
        self.stored_task(task_id)?;

        let updated = self
            .api
            .update_task(&self.board_id, task_id, &update)
            .await
            .map_err(|err| self.record(Section::SaveTask, err))?;
        self.store.dispatch(BoardAction::TaskUpserted(updated))?;
        self.clear(Section::SaveTask);
        self.stored_task(task_id)
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), SyncError> {
        self.api
            .delete_task(&self.board_id, task_id)
            .await
            .map_err(|err| self.record(Section::DeleteTask, err))?;
        self.store.dispatch(BoardAction::TaskRemoved(task_id.to_string()))?;
        self.clear(Section::DeleteTask);
        info!(task_id, "Task deleted");
        Ok(())
    }

    /// Move a task to another column, optimistically.
    ///
    /// The whole task list is captured before the local change; if the
    /// server rejects the move that exact list is put back.
    pub async fn move_task(&self, task_id: &str, status: TaskStatus) -> Result<(), SyncError> {
        let Some(current) = self.task(task_id) else {
            return Ok(());
        };
        if current.status == status {
            return Ok(());
        }

        let previous = self.store.read(|state| state.tasks.clone());
        self.store.dispatch(BoardAction::TaskStatusChanged {
            task_id: task_id.to_string(),
            status,
        })?;

        match self.api.update_task(&self.board_id, task_id, &TaskUpdate::status(status)).await {
            Ok(updated) => {
                self.store.dispatch(BoardAction::TaskUpserted(updated))?;
                info!(task_id, status = %status, "Task moved");
                Ok(())
            }
            Err(err) => {
                let _ = self.store.dispatch(BoardAction::TasksRestored(previous));
                Err(self.record(Section::Board, err))
            }
        }
    }

    pub async fn decide_approval(
        &self,
        approval_id: &str,
        status: ApprovalStatus,
    ) -> Result<Approval, SyncError> {
        let decided = self
            .api
            .decide_approval(&self.board_id, approval_id, status)
            .await
            .map_err(|err| self.record(Section::Approvals, err))?;
        self.store.dispatch(BoardAction::ApprovalUpserted {
            approval: Some(decided),
            task_counts: None,
            pending_approvals_count: None,
        })?;
        self.clear(Section::Approvals);
        info!(approval_id, status = %status, "Approval decided");

        self.store
            .read(|state| state.approvals.iter().find(|a| a.id == approval_id).cloned())
            .ok_or(SyncError::MissingId { entity: "approval" })
    }

    /// Open a task's detail view and load its comment thread.
    pub async fn open_task(&self, task_id: &str) -> Result<Vec<TaskComment>, SyncError> {
        self.stored_task(task_id)?;
        self.store.dispatch(BoardAction::TaskOpened(task_id.to_string()))?;

        let comments = self
            .api
            .list_comments(&self.board_id, task_id)
            .await
            .map_err(|err| self.record(Section::Comments, err))?;
        self.store.dispatch(BoardAction::CommentsLoaded {
            task_id: task_id.to_string(),
            comments: comments.clone(),
        })?;
        Ok(comments)
    }

    pub fn close_task(&self) {
        let _ = self.store.dispatch(BoardAction::TaskClosed);
    }

    /// Comment on the open task.
    pub async fn post_comment(&self, message: &str) -> Result<TaskComment, SyncError> {
        let task_id = self
            .store
            .read(|state| state.detail.as_ref().map(|detail| detail.task_id.clone()))
            .ok_or(SyncError::NoOpenTask)?;
        let Some(message) = non_blank(message) else {
            let err = SyncError::Validation(MESSAGE_REQUIRED.to_string());
            return Err(self.record(Section::PostComment, err));
        };

        let created = self
            .api
            .create_comment(&self.board_id, &task_id, &message)
            .await
            .map_err(|err| self.record(Section::PostComment, err))?;
        self.store.dispatch(BoardAction::CommentPosted(created.clone()))?;
        self.clear(Section::PostComment);
        Ok(created)
    }

    /// Post to board chat. Blank input is ignored and returns `None`.
    pub async fn send_chat(&self, content: &str) -> Result<Option<BoardChatMessage>, SyncError> {
        let Some(content) = non_blank(content) else {
            return Ok(None);
        };
        let request = ChatMessageRequest {
            content,
            tags: vec![BoardChatMessage::CHAT_TAG.to_string()],
        };

        let created = self
            .api
            .send_chat(&self.board_id, &request)
            .await
            .map_err(|err| self.record(Section::Chat, err))?;
        self.store.dispatch(BoardAction::ChatReceived(created.clone()))?;
        self.clear(Section::Chat);
        Ok(Some(created))
    }
}
