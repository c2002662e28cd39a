//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module      | Commands handled |
//! |-------------|------------------|
//! | `snapshot`  | `Snapshot`       |
//! | `watch`     | `Watch`          |
//! | `task`      | `Task`           |
//! | `approval`  | `Approval`       |
//! | `chat`      | `Chat`           |
//! | `config`    | `Config`         |

pub mod approval;
pub mod chat;
pub mod config;
pub mod snapshot;
pub mod task;
pub mod watch;

pub use approval::cmd_approval;
pub use chat::cmd_chat;
pub use config::cmd_config;
pub use snapshot::cmd_snapshot;
pub use task::cmd_task;
pub use watch::cmd_watch;

use anyhow::{Context, Result};
use console::Term;

use mission_control::api::ApiClient;
use mission_control::config::MissionControlConfig;
use mission_control::errors::SyncError;
use mission_control::sync::BoardSync;
use mission_control::ui::Spinner;

pub(crate) fn api_client(config: &MissionControlConfig) -> Result<ApiClient> {
    config
        .client()
        .with_context(|| format!("Cannot use API at {}", config.api_url()))
}

/// A board sync for `board_id` with nothing loaded yet.
pub(crate) fn board_sync(config: &MissionControlConfig, board_id: &str) -> Result<BoardSync> {
    Ok(BoardSync::with_client(
        board_id,
        api_client(config)?,
        config.stream_settings(),
    ))
}

/// Load the snapshot behind a spinner.
pub(crate) async fn load_with_spinner(sync: &BoardSync) -> Result<(), SyncError> {
    let spinner = Spinner::start(format!("Loading board {}...", sync.board_id()));
    match sync.load_snapshot().await {
        Ok(()) => {
            let name = sync
                .store()
                .read(|state| state.board.as_ref().map(|board| board.name.clone()))
                .unwrap_or_else(|| sync.board_id().to_string());
            spinner.succeed(format!("Loaded {}", name));
            Ok(())
        }
        Err(err) => {
            spinner.fail(err.to_string());
            Err(err)
        }
    }
}

/// Connect and load; any failure aborts the command.
pub(crate) async fn open_board(config: &MissionControlConfig, board_id: &str) -> Result<BoardSync> {
    let sync = board_sync(config, board_id)?;
    load_with_spinner(&sync)
        .await
        .with_context(|| format!("Failed to load board {}", board_id))?;
    Ok(sync)
}

/// Columns available for wrapping, if stdout is a terminal.
pub(crate) fn terminal_width() -> Option<usize> {
    Term::stdout()
        .size_checked()
        .map(|(_, cols)| usize::from(cols))
}
