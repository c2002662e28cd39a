//! Plain-terminal rendering of a board.
//!
//! Every function returns a `String` so the watch loop can redraw the
//! whole screen at once and tests can inspect the output.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use console::style;

use crate::board::models::{Approval, ApprovalStatus, Task, TaskComment, TaskPriority, TaskStatus};
use crate::board::state::{BoardState, Section};
use crate::board::views;
use crate::ui::icons::{AGENT, APPROVAL, BOARD, CHAT, COMMENT, LIVE, WARN};

const DEFAULT_WIDTH: usize = 100;

/// `Jan 5, 14:03` in local time.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%b %-d, %H:%M").to_string()
}

fn format_optional(value: Option<&DateTime<Utc>>) -> String {
    value.map(format_timestamp).unwrap_or_else(|| "—".to_string())
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

fn priority_label(priority: TaskPriority) -> String {
    match priority {
        TaskPriority::High => style("high").red().to_string(),
        TaskPriority::Medium => style("medium").yellow().to_string(),
        TaskPriority::Low => style("low").green().to_string(),
    }
}

fn status_label(status: TaskStatus) -> String {
    let label = status.label();
    match status {
        TaskStatus::InProgress => style(label).magenta().to_string(),
        TaskStatus::Review => style(label).blue().to_string(),
        TaskStatus::Done => style(label).green().to_string(),
        TaskStatus::Inbox => style(label).dim().to_string(),
    }
}

fn task_line(task: &Task) -> String {
    let mut line = format!("  {} {}", style(&task.id).dim(), task.title);
    let _ = write!(line, " [{}]", priority_label(task.priority));
    if let Some(assignee) = &task.assignee {
        let _ = write!(line, " @{}", style(assignee).cyan());
    }
    if task.approvals_pending_count > 0 {
        let _ = write!(
            line,
            " {}{} pending",
            APPROVAL,
            style(task.approvals_pending_count).yellow()
        );
    }
    line
}

fn section_errors(state: &BoardState) -> String {
    let mut out = String::new();
    for (section, message) in &state.errors {
        let _ = writeln!(out, "{}{}: {}", WARN, style(section).bold(), style(message).red());
    }
    out
}

/// Full board: header, columns, agents, approvals, live feed and chat.
pub fn render_board(state: &BoardState, width: Option<usize>) -> String {
    let width = width.unwrap_or(DEFAULT_WIDTH);
    let mut out = String::new();

    let name = state.board.as_ref().map(|b| b.name.as_str()).unwrap_or("Board");
    let _ = writeln!(
        out,
        "{}{} {}",
        BOARD,
        style(name).bold(),
        style(format!("({})", state.board_id)).dim()
    );
    if let Some(description) = state.board.as_ref().and_then(|b| b.description.as_deref()) {
        let _ = writeln!(out, "{}", wrap(description, width, ""));
    }
    out.push_str(&section_errors(state));
    out.push('\n');

    for (status, tasks) in views::columns(state) {
        let _ = writeln!(out, "{} ({})", status_label(status), tasks.len());
        for task in tasks {
            let _ = writeln!(out, "{}", task_line(task));
        }
    }

    out.push('\n');
    out.push_str(&render_agents(state));
    out.push('\n');
    out.push_str(&render_approvals(state, false, width));
    out.push('\n');
    out.push_str(&render_live_feed(state, 10, width));
    out.push('\n');
    out.push_str(&render_chat(state, 10, width));
    out
}

pub fn render_agents(state: &BoardState) -> String {
    let mut out = format!("{}{}\n", AGENT, style("Agents").bold());
    let agents = views::sorted_agents(state);
    if agents.is_empty() {
        let _ = writeln!(out, "  {}", style("No agents yet.").dim());
    }
    for agent in agents {
        let label = views::agent_status_label(state, agent);
        let status = match label {
            "Working" => style(label).magenta().to_string(),
            "Active" => style(label).green().to_string(),
            "Provisioning" => style(label).yellow().to_string(),
            _ => style(label).dim().to_string(),
        };
        let _ = writeln!(out, "  {} {} {}", views::agent_avatar(agent), agent.name, status);
    }
    out
}

fn approval_block(approval: &Approval, width: usize) -> String {
    let mut out = String::new();
    let status = match approval.status {
        ApprovalStatus::Pending => style("pending").yellow().to_string(),
        ApprovalStatus::Approved => style("approved").green().to_string(),
        ApprovalStatus::Rejected => style("rejected").red().to_string(),
    };
    let _ = writeln!(
        out,
        "  {} {} [{}] {}% confidence",
        style(&approval.id).dim(),
        style(views::humanize_action(&approval.action_type)).bold(),
        status,
        approval.confidence.round()
    );
    for (label, value) in views::approval_rows(approval) {
        let _ = writeln!(out, "    {}: {}", style(label).dim(), value);
    }
    if let Some(reason) = views::approval_reason(approval) {
        let _ = writeln!(out, "{}", wrap(&reason, width, "    "));
    }
    let _ = writeln!(
        out,
        "    {} created {} resolved {}",
        style("·").dim(),
        format_timestamp(&approval.created_at),
        format_optional(approval.resolved_at.as_ref())
    );
    out
}

/// Approvals, pending only unless `all` is set.
pub fn render_approvals(state: &BoardState, all: bool, width: usize) -> String {
    let mut out = format!(
        "{}{} ({} pending)\n",
        APPROVAL,
        style("Approvals").bold(),
        state.pending_approvals_count
    );
    let approvals: Vec<&Approval> = if all {
        state.approvals.iter().collect()
    } else {
        views::pending_approvals(state)
    };
    if approvals.is_empty() {
        let _ = writeln!(out, "  {}", style("Nothing waiting for a decision.").dim());
    }
    for approval in approvals {
        out.push_str(&approval_block(approval, width));
    }
    out
}

fn comment_block(comment: &TaskComment, width: usize) -> String {
    let author = comment.agent_id.as_deref().unwrap_or("operator");
    let mut out = format!(
        "  {} {} {}\n",
        style(format_timestamp(&comment.created_at)).dim(),
        style(author).cyan(),
        comment.task_id.as_deref().map(|id| format!("on {id}")).unwrap_or_default()
    );
    if let Some(message) = comment.message.as_deref() {
        let _ = writeln!(out, "{}", wrap(message, width, "    "));
    }
    out
}

pub fn render_live_feed(state: &BoardState, limit: usize, width: usize) -> String {
    let mut out = format!("{}{}\n", LIVE, style("Live feed").bold());
    let feed = views::live_feed(state);
    if feed.is_empty() {
        let _ = writeln!(out, "  {}", style("Waiting for new comments…").dim());
    }
    for comment in feed.into_iter().take(limit) {
        out.push_str(&comment_block(comment, width));
    }
    out
}

/// Most recent `limit` chat messages, oldest first.
pub fn render_chat(state: &BoardState, limit: usize, width: usize) -> String {
    let mut out = format!("{}{}\n", CHAT, style("Board chat").bold());
    let skip = state.chat_messages.len().saturating_sub(limit);
    if state.chat_messages.is_empty() {
        let _ = writeln!(out, "  {}", style("No messages yet.").dim());
    }
    for message in state.chat_messages.iter().skip(skip) {
        let _ = writeln!(
            out,
            "  {} {}",
            style(format_timestamp(&message.created_at)).dim(),
            style(message.source_label()).cyan()
        );
        let _ = writeln!(out, "{}", wrap(&message.content, width, "    "));
    }
    out
}

/// The open task with its approvals and comment thread.
pub fn render_task_detail(state: &BoardState, width: usize) -> String {
    let Some(detail) = state.detail.as_ref() else {
        return style("No task is open.").dim().to_string();
    };
    let Some(task) = state.task(&detail.task_id) else {
        return style(format!("Task {} is no longer on the board.", detail.task_id))
            .dim()
            .to_string();
    };

    let mut out = format!("{}\n", style(&task.title).bold());
    let _ = writeln!(
        out,
        "  {} · {} · {}",
        status_label(task.status),
        priority_label(task.priority),
        task.assignee.as_deref().unwrap_or("Unassigned")
    );
    let _ = writeln!(
        out,
        "  created {} · updated {} · due {}",
        format_optional(task.created_at.as_ref()),
        format_optional(task.updated_at.as_ref()),
        format_optional(task.due_at.as_ref())
    );
    if let Some(description) = task.description.as_deref() {
        let _ = writeln!(out, "{}", wrap(description, width, "  "));
    }
    for section in [Section::Comments, Section::PostComment, Section::SaveTask] {
        if let Some(message) = state.error(section) {
            let _ = writeln!(out, "{}{}", WARN, style(message).red());
        }
    }

    let approvals = views::task_approvals(state, &task.id);
    if !approvals.is_empty() {
        let _ = writeln!(out, "\n{}{}", APPROVAL, style("Approvals").bold());
        for approval in approvals {
            out.push_str(&approval_block(approval, width));
        }
    }

    let thread = views::open_thread(state);
    let _ = writeln!(out, "\n{}{} ({})", COMMENT, style("Comments").bold(), thread.len());
    for comment in thread {
        out.push_str(&comment_block(comment, width));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::BoardAction;
    use serde_json::json;

    fn state() -> BoardState {
        console::set_colors_enabled(false);
        let mut state = BoardState::new("b1");
        state
            .reduce(BoardAction::SnapshotLoaded(
                serde_json::from_value(json!({
                    "board": {"id": "b1", "name": "Launch", "description": "Ship the thing"},
                    "tasks": [
                        {"id": "t1", "title": "Write copy", "status": "review", "priority": "high",
                         "assignee": "Scout", "approvals_pending_count": 1},
                        {"id": "t2", "title": "Fix build", "status": "in_progress",
                         "assigned_agent_id": "a1"}
                    ],
                    "agents": [{"id": "a1", "name": "Scout", "status": "online"}],
                    "approvals": [{"id": "ap1", "action_type": "task.assign", "confidence": 72.4,
                                   "task_id": "t1", "payload": {"reason": "Fits the role"},
                                   "created_at": "2024-01-01T00:00:00Z"}],
                    "chat_messages": [{"id": "m1", "content": "hello team", "tags": ["chat"],
                                       "created_at": "2024-01-01T00:00:00Z"}],
                    "pending_approvals_count": 1
                }))
                .unwrap(),
            ))
            .unwrap();
        state
    }

    #[test]
    fn board_render_lists_columns_and_sections() {
        let out = render_board(&state(), Some(80));
        assert!(out.contains("Launch"));
        assert!(out.contains("Write copy"));
        assert!(out.contains("Review (1)"));
        assert!(out.contains("Inbox (0)"));
        assert!(out.contains("Task · Assign"));
        assert!(out.contains("hello team"));
        assert!(out.contains("Working"));
    }

    #[test]
    fn approval_render_includes_rows_and_reason() {
        let out = render_approvals(&state(), false, 80);
        assert!(out.contains("1 pending"));
        assert!(out.contains("Assignee"));
        assert!(out.contains("Fits the role"));
        assert!(out.contains("72%"));
    }

    #[test]
    fn detail_requires_open_task() {
        let mut state = state();
        assert!(render_task_detail(&state, 80).contains("No task is open."));

        state.reduce(BoardAction::TaskOpened("t1".to_string())).unwrap();
        let out = render_task_detail(&state, 80);
        assert!(out.contains("Write copy"));
        assert!(out.contains("Comments (0)"));
    }

    #[test]
    fn section_errors_are_shown() {
        let mut state = state();
        state
            .reduce(BoardAction::SectionFailed {
                section: Section::Chat,
                message: "Unable to send message.".to_string(),
            })
            .unwrap();
        let out = render_board(&state, None);
        assert!(out.contains("Unable to send message."));
    }
}
