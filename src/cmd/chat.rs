//! Board chat: `mission-control chat`.

use anyhow::{Result, bail};
use console::style;

use mission_control::config::MissionControlConfig;
use mission_control::sync::mutations::MESSAGE_REQUIRED;
use mission_control::ui::icons::CHAT;

use super::super::ChatCommands;
use super::board_sync;

pub async fn cmd_chat(config: &MissionControlConfig, command: ChatCommands) -> Result<()> {
    match command {
        ChatCommands::Send { board, message } => {
            let sync = board_sync(config, &board)?;
            let Some(sent) = sync.mutations().send_chat(&message).await? else {
                bail!(MESSAGE_REQUIRED);
            };
            println!("{}Sent {}", CHAT, style(&sent.id).dim());
        }
    }
    Ok(())
}
