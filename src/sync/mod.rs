//! Live synchronisation of one board.
//!
//! [`BoardSync`] ties the pieces together: it loads the snapshot, spawns
//! one reconnecting task per entity stream and hands out [`Mutations`].
//! All of them write through the same [`BoardStore`].

pub mod mutations;
pub mod subscriber;

pub use mutations::Mutations;
pub use subscriber::{StreamContext, StreamSettings, run_entity_stream};

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, BoardApi, StreamSource};
use crate::board::state::BoardAction;
use crate::board::store::BoardStore;
use crate::errors::{ApiError, SyncError};
use crate::stream::entity::{AgentStream, ApprovalStream, ChatStream, EntityStream, TaskStream};

pub struct BoardSync {
    board_id: String,
    api: Arc<dyn BoardApi>,
    source: Arc<dyn StreamSource>,
    store: BoardStore,
    settings: StreamSettings,
    cancel: CancellationToken,
    streams: Vec<(&'static str, JoinHandle<()>)>,
}

impl BoardSync {
    pub fn new(
        board_id: impl Into<String>,
        api: Arc<dyn BoardApi>,
        source: Arc<dyn StreamSource>,
        settings: StreamSettings,
    ) -> Self {
        let board_id = board_id.into();
        Self {
            store: BoardStore::new(board_id.clone()),
            board_id,
            api,
            source,
            settings,
            cancel: CancellationToken::new(),
            streams: Vec::new(),
        }
    }

    /// Use one HTTP client for both REST calls and streams.
    pub fn with_client(
        board_id: impl Into<String>,
        client: ApiClient,
        settings: StreamSettings,
    ) -> Self {
        let client = Arc::new(client);
        Self::new(board_id, client.clone(), client, settings)
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn mutations(&self) -> Mutations {
        Mutations::new(self.board_id.clone(), self.api.clone(), self.store.clone())
    }

    /// Fetch the snapshot and replace the local collections with it.
    ///
    /// On failure the board, approvals and chat sections carry the message;
    /// nothing is retried.
    pub async fn load_snapshot(&self) -> Result<(), SyncError> {
        match self.api.snapshot(&self.board_id).await {
            Ok(snapshot) => {
                info!(
                    board_id = %self.board_id,
                    tasks = snapshot.tasks.len(),
                    agents = snapshot.agents.len(),
                    approvals = snapshot.approvals.len(),
                    "Board snapshot loaded"
                );
                self.store.dispatch(BoardAction::SnapshotLoaded(snapshot))
            }
            Err(err) => {
                warn!(board_id = %self.board_id, error = %err, "Board snapshot failed");
                let _ = self.store.dispatch(BoardAction::SnapshotFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Spawn the entity streams that are not running yet.
    ///
    /// A signed-out source starts nothing. Until the board itself has
    /// loaded only the agent stream runs; calling this again after a
    /// successful [`load_snapshot`](Self::load_snapshot) adds the rest.
    pub fn start_streams(&mut self) -> Result<(), SyncError> {
        if !self.source.is_signed_in() {
            warn!(board_id = %self.board_id, "Not signed in; streams not started");
            return Err(ApiError::NotSignedIn.into());
        }
        let ctx = StreamContext {
            board_id: self.board_id.clone(),
            source: self.source.clone(),
            store: self.store.clone(),
            settings: self.settings,
            cancel: self.cancel.clone(),
        };

        self.spawn::<AgentStream>(&ctx);
        if self.store.read(|state| state.board.is_some()) {
            self.spawn::<TaskStream>(&ctx);
            self.spawn::<ApprovalStream>(&ctx);
            self.spawn::<ChatStream>(&ctx);
        } else {
            debug!(board_id = %self.board_id, "Board not loaded; only agents are streamed");
        }
        Ok(())
    }

    fn spawn<E: EntityStream>(&mut self, ctx: &StreamContext) {
        if self.streams.iter().any(|(name, _)| *name == E::NAME) {
            return;
        }
        debug!(board_id = %self.board_id, stream = E::NAME, "Entity stream started");
        let handle = tokio::spawn(run_entity_stream::<E>(ctx.clone()));
        self.streams.push((E::NAME, handle));
    }

    /// Names of the streams spawned so far.
    pub fn running_streams(&self) -> Vec<&'static str> {
        self.streams.iter().map(|(name, _)| *name).collect()
    }

    pub fn is_streaming(&self) -> bool {
        !self.streams.is_empty() && !self.cancel.is_cancelled()
    }

    /// Cancel all streams and wait for them to stop. Once this returns no
    /// stream touches the store again.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        for (_, handle) in self.streams.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "Stream task ended abnormally");
            }
        }
        info!(board_id = %self.board_id, "Board sync stopped");
    }
}

impl Drop for BoardSync {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
