//! Live board view: `mission-control watch`.
//!
//! Loads the snapshot, starts the entity streams and redraws the board
//! whenever the store revision moves. Ctrl-C stops the streams before
//! exiting. A signed-out client exits at once.

use anyhow::{Context, Result};
use console::{Term, style};
use tracing::warn;

use mission_control::board::store::BoardStore;
use mission_control::config::MissionControlConfig;
use mission_control::errors::{ApiError, SyncError};
use mission_control::ui::board::render_board;
use mission_control::ui::icons::LIVE;

use super::{board_sync, load_with_spinner, terminal_width};

fn redraw(term: &Term, store: &BoardStore) -> Result<()> {
    let rendered = store.read(|state| render_board(state, terminal_width()));
    term.clear_screen().context("Failed to clear terminal")?;
    term.write_line(&rendered).context("Failed to write board")?;
    term.write_line(&format!(
        "{}{}",
        LIVE,
        style(format!("Live · revision {} · Ctrl-C to stop", store.revision())).dim()
    ))
    .context("Failed to write board")?;
    Ok(())
}

pub async fn cmd_watch(config: &MissionControlConfig, board_id: &str) -> Result<()> {
    let mut sync = board_sync(config, board_id)?;
    // Without a snapshot only agents are streamed; the failure is shown in
    // the board's section errors.
    match load_with_spinner(&sync).await {
        Ok(()) => {}
        Err(SyncError::Api(ApiError::NotSignedIn)) => return Err(ApiError::NotSignedIn.into()),
        Err(err) => warn!(board_id, error = %err, "Watching without a snapshot"),
    }
    sync.start_streams()?;

    let store = sync.store().clone();
    let mut changes = store.subscribe();
    let term = Term::stdout();
    redraw(&term, &store)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let outcome = loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                break signal.context("Failed to listen for Ctrl-C");
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                if let Err(err) = redraw(&term, &store) {
                    break Err(err);
                }
            }
        }
    };

    sync.shutdown().await;
    outcome
}
