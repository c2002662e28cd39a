//! Resume cursors for the entity streams.
//!
//! On every (re)connect a stream asks the server to resume from the newest
//! timestamp already held locally for its entity class. This bounds replay;
//! duplicates that still arrive are absorbed by upsert-by-id.

use chrono::{DateTime, Utc};

use crate::board::models::{Agent, Approval, BoardChatMessage, Task};
use crate::board::timestamp;

/// Largest preferred timestamp across `items`, formatted for the `since`
/// query parameter. `None` when nothing carries a timestamp.
pub fn latest<T, F>(items: &[T], preferred: F) -> Option<String>
where
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    items.iter().filter_map(preferred).max().map(|max| timestamp::format(&max))
}

pub fn task_timestamp(task: &Task) -> Option<DateTime<Utc>> {
    task.updated_at.or(task.created_at)
}

pub fn approval_timestamp(approval: &Approval) -> Option<DateTime<Utc>> {
    approval.resolved_at.or(Some(approval.created_at))
}

pub fn agent_timestamp(agent: &Agent) -> Option<DateTime<Utc>> {
    agent.updated_at.or(agent.last_seen_at)
}

pub fn chat_timestamp(message: &BoardChatMessage) -> Option<DateTime<Utc>> {
    Some(message.created_at)
}
