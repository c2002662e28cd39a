//! Task commands: `mission-control task`.

use anyhow::{Result, bail};
use console::style;
use dialoguer::Confirm;

use mission_control::api::TaskUpdate;
use mission_control::config::MissionControlConfig;
use mission_control::errors::SyncError;
use mission_control::ui::board::render_task_detail;
use mission_control::ui::icons::{CHECK, COMMENT};

use super::super::TaskCommands;
use super::{open_board, terminal_width};

fn require_task(sync: &mission_control::sync::BoardSync, task_id: &str) -> Result<()> {
    if sync.store().read(|state| state.task(task_id).is_none()) {
        return Err(SyncError::TaskNotFound {
            id: task_id.to_string(),
        }
        .into());
    }
    Ok(())
}

pub async fn cmd_task(
    config: &MissionControlConfig,
    command: TaskCommands,
    yes: bool,
) -> Result<()> {
    match command {
        TaskCommands::Create {
            board,
            title,
            description,
            priority,
        } => {
            let sync = open_board(config, &board).await?;
            let task = sync
                .mutations()
                .create_task(&title, description.as_deref(), priority)
                .await?;
            println!("{}Created {} {}", CHECK, style(&task.id).dim(), task.title);
        }
        TaskCommands::Update {
            board,
            task_id,
            title,
            description,
            clear_description,
            priority,
            assign,
            unassign,
        } => {
            let update = TaskUpdate {
                title,
                description: if clear_description { Some(None) } else { description.map(Some) },
                status: None,
                priority,
                assigned_agent_id: if unassign { Some(None) } else { assign.map(Some) },
            };
            if update.is_empty() {
                bail!(
                    "Nothing to update. Pass --title, --description, --priority, --assign or \
                     --unassign."
                );
            }
            let sync = open_board(config, &board).await?;
            let task = sync.mutations().update_task(&task_id, update).await?;
            println!("{}Updated {} {}", CHECK, style(&task.id).dim(), task.title);
        }
        TaskCommands::Move {
            board,
            task_id,
            status,
        } => {
            let sync = open_board(config, &board).await?;
            require_task(&sync, &task_id)?;
            sync.mutations().move_task(&task_id, status).await?;
            println!("{}Moved {} to {}", CHECK, style(&task_id).dim(), status.label());
        }
        TaskCommands::Delete { board, task_id } => {
            let sync = open_board(config, &board).await?;
            require_task(&sync, &task_id)?;
            let title = sync
                .store()
                .read(|state| state.task(&task_id).map(|task| task.title.clone()))
                .unwrap_or_default();

            if !yes {
                let confirm = Confirm::new()
                    .with_prompt(format!("Delete task '{}'?", title))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            sync.mutations().delete_task(&task_id).await?;
            println!("{}Deleted {} {}", CHECK, style(&task_id).dim(), title);
        }
        TaskCommands::Comment {
            board,
            task_id,
            message,
        } => {
            let sync = open_board(config, &board).await?;
            let mutations = sync.mutations();
            mutations.open_task(&task_id).await?;
            let comment = mutations.post_comment(&message).await?;
            println!(
                "{}Commented on {} {}",
                COMMENT,
                style(&task_id).dim(),
                style(&comment.id).dim()
            );
        }
        TaskCommands::Comments { board, task_id } => {
            let sync = open_board(config, &board).await?;
            sync.mutations().open_task(&task_id).await?;
            let rendered = sync
                .store()
                .read(|state| render_task_detail(state, terminal_width().unwrap_or(100)));
            println!("{}", rendered);
        }
    }
    Ok(())
}
