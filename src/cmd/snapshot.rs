//! One-shot board view: `mission-control snapshot`.

use anyhow::{Context, Result};

use mission_control::api::BoardApi;
use mission_control::config::MissionControlConfig;
use mission_control::ui::board::render_board;

use super::{api_client, open_board, terminal_width};

pub async fn cmd_snapshot(config: &MissionControlConfig, board_id: &str, json: bool) -> Result<()> {
    if json {
        let snapshot = api_client(config)?
            .snapshot(board_id)
            .await
            .with_context(|| format!("Failed to load board {}", board_id))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
        );
        return Ok(());
    }

    let sync = open_board(config, board_id).await?;
    let rendered = sync.store().read(|state| render_board(state, terminal_width()));
    println!("{}", rendered);
    Ok(())
}
