//! Approval commands: `mission-control approval`.

use anyhow::Result;
use console::style;

use mission_control::board::models::ApprovalStatus;
use mission_control::board::views;
use mission_control::config::MissionControlConfig;
use mission_control::ui::board::render_approvals;
use mission_control::ui::icons::{CHECK, CROSS};

use super::super::ApprovalCommands;
use super::{open_board, terminal_width};

pub async fn cmd_approval(config: &MissionControlConfig, command: ApprovalCommands) -> Result<()> {
    let (board, approval_id, status) = match command {
        ApprovalCommands::List { board, all } => {
            let sync = open_board(config, &board).await?;
            let rendered = sync
                .store()
                .read(|state| render_approvals(state, all, terminal_width().unwrap_or(100)));
            println!("{}", rendered);
            return Ok(());
        }
        ApprovalCommands::Approve { board, approval_id } => {
            (board, approval_id, ApprovalStatus::Approved)
        }
        ApprovalCommands::Reject { board, approval_id } => {
            (board, approval_id, ApprovalStatus::Rejected)
        }
    };

    let sync = open_board(config, &board).await?;
    let approval = sync.mutations().decide_approval(&approval_id, status).await?;
    let icon = match approval.status {
        ApprovalStatus::Rejected => CROSS,
        _ => CHECK,
    };
    println!(
        "{}{} {} ({})",
        icon,
        style(views::humanize_action(&approval.action_type)).bold(),
        approval.status,
        style(&approval.id).dim()
    );
    let pending = sync.store().read(|state| state.pending_approvals_count);
    println!("  {} still pending", pending);
    Ok(())
}
