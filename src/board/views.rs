//! Read-only projections of [`BoardState`] used by the renderers.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::{Map, Value};

use super::models::{Agent, AgentStatus, Approval, ApprovalStatus, Task, TaskComment, TaskStatus};
use super::state::BoardState;

/// Glyph shown for the board lead.
pub const LEAD_GLYPH: &str = "⚙️";

const EMOJI_GLYPHS: &[(&str, &str)] = &[
    (":gear:", "⚙️"),
    (":sparkles:", "✨"),
    (":rocket:", "🚀"),
    (":megaphone:", "📣"),
    (":chart_with_upwards_trend:", "📈"),
    (":bulb:", "💡"),
    (":wrench:", "🔧"),
    (":shield:", "🛡️"),
    (":memo:", "📝"),
    (":brain:", "🧠"),
];

/// Tasks of one board column, in stored order.
pub fn column<'a>(state: &'a BoardState, status: TaskStatus) -> Vec<&'a Task> {
    state.tasks.iter().filter(|task| task.status == status).collect()
}

/// All columns in board order.
pub fn columns(state: &BoardState) -> Vec<(TaskStatus, Vec<&Task>)> {
    TaskStatus::COLUMNS
        .iter()
        .map(|status| (*status, column(state, *status)))
        .collect()
}

fn newest_first(comments: &[TaskComment]) -> Vec<&TaskComment> {
    let mut ordered: Vec<&TaskComment> = comments.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

pub fn live_feed(state: &BoardState) -> Vec<&TaskComment> {
    newest_first(&state.live_feed)
}

/// Comments of the open task, newest first. Empty when no task is open.
pub fn open_thread(state: &BoardState) -> Vec<&TaskComment> {
    state
        .detail
        .as_ref()
        .map(|detail| newest_first(&detail.comments))
        .unwrap_or_default()
}

pub fn pending_approvals(state: &BoardState) -> Vec<&Approval> {
    state
        .approvals
        .iter()
        .filter(|approval| approval.status == ApprovalStatus::Pending)
        .collect()
}

pub fn task_approvals<'a>(state: &'a BoardState, task_id: &str) -> Vec<&'a Approval> {
    state
        .approvals
        .iter()
        .filter(|approval| approval.task_id.as_deref() == Some(task_id))
        .collect()
}

/// Agents assigned to at least one in-progress task.
pub fn working_agent_ids(state: &BoardState) -> HashSet<&str> {
    state
        .tasks
        .iter()
        .filter(|task| task.status == TaskStatus::InProgress)
        .filter_map(|task| task.assigned_agent_id.as_deref())
        .collect()
}

fn agent_rank(agent: &Agent, working: &HashSet<&str>) -> u8 {
    if working.contains(agent.id.as_str()) {
        return 0;
    }
    match agent.status {
        AgentStatus::Online => 1,
        AgentStatus::Provisioning => 2,
        _ => 3,
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Agents ordered working, online, provisioning, then everything else;
/// ties broken by name.
pub fn sorted_agents(state: &BoardState) -> Vec<&Agent> {
    let working = working_agent_ids(state);
    let mut agents: Vec<&Agent> = state.agents.iter().collect();
    agents.sort_by(|a, b| {
        agent_rank(a, &working)
            .cmp(&agent_rank(b, &working))
            .then_with(|| compare_names(&a.name, &b.name))
    });
    agents
}

pub fn agent_status_label(state: &BoardState, agent: &Agent) -> &'static str {
    if working_agent_ids(state).contains(agent.id.as_str()) {
        return "Working";
    }
    match agent.status {
        AgentStatus::Online => "Active",
        AgentStatus::Provisioning => "Provisioning",
        _ => "Offline",
    }
}

/// Agents a task can be assigned to.
pub fn assignable_agents(state: &BoardState) -> Vec<&Agent> {
    state.agents.iter().filter(|agent| !agent.is_board_lead).collect()
}

/// Up to two uppercase initials from the agent's name.
pub fn agent_initials(name: &str) -> String {
    name.split(' ')
        .filter(|part| !part.is_empty())
        .take(2)
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Resolve a `:shortcode:` or literal emoji. Unknown shortcodes resolve to
/// nothing.
pub fn resolve_emoji(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((_, glyph)) = EMOJI_GLYPHS.iter().find(|(code, _)| *code == trimmed) {
        return Some((*glyph).to_string());
    }
    if trimmed.len() > 1 && trimmed.starts_with(':') && trimmed.ends_with(':') {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn agent_avatar(agent: &Agent) -> String {
    if agent.is_board_lead {
        return LEAD_GLYPH.to_string();
    }
    agent
        .identity_profile
        .as_ref()
        .and_then(|profile| profile.get("emoji"))
        .and_then(Value::as_str)
        .and_then(resolve_emoji)
        .unwrap_or_else(|| agent_initials(&agent.name))
}

/// `task.assign_agent` becomes `Task · Assign Agent`.
pub fn humanize_action(action_type: &str) -> String {
    action_type
        .split('.')
        .map(|part| {
            let spaced = part.replace('_', " ");
            let mut out = String::with_capacity(spaced.len());
            let mut at_word_start = true;
            for ch in spaced.chars() {
                if at_word_start && ch.is_alphanumeric() {
                    out.extend(ch.to_uppercase());
                } else {
                    out.push(ch);
                }
                at_word_start = !ch.is_alphanumeric();
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

fn payload_value(payload: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match payload?.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Task id of an approval, falling back to the payload spellings agents use.
pub fn approval_task_id(approval: &Approval) -> Option<String> {
    let payload = approval.payload.as_ref();
    approval
        .task_id
        .clone()
        .or_else(|| payload_value(payload, "task_id"))
        .or_else(|| payload_value(payload, "taskId"))
        .or_else(|| payload_value(payload, "taskID"))
}

/// Labelled detail rows shown under an approval.
pub fn approval_rows(approval: &Approval) -> Vec<(&'static str, String)> {
    let payload = approval.payload.as_ref();
    let mut rows = Vec::new();
    if let Some(task_id) = approval_task_id(approval) {
        rows.push(("Task", task_id));
    }
    if approval.action_type.contains("assign") {
        let assignee = payload_value(payload, "assigned_agent_id")
            .or_else(|| payload_value(payload, "assignedAgentId"))
            .unwrap_or_else(|| "Unassigned".to_string());
        rows.push(("Assignee", assignee));
    }
    if let Some(title) = payload_value(payload, "title") {
        rows.push(("Title", title));
    }
    if let Some(role) = payload_value(payload, "role") {
        rows.push(("Role", role));
    }
    rows
}

pub fn approval_reason(approval: &Approval) -> Option<String> {
    payload_value(approval.payload.as_ref(), "reason")
}
