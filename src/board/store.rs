//! Shared handle to the board state.
//!
//! `BoardStore` is cheap to clone; every clone points at the same state.
//! [`BoardStore::dispatch`] is the only way to change it and holds the lock
//! for one `reduce` call, so each action lands atomically. Observers wait on
//! [`BoardStore::subscribe`] for the revision counter to move.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::warn;

use super::state::{BoardAction, BoardState};
use crate::errors::SyncError;

#[derive(Clone)]
pub struct BoardStore {
    state: Arc<Mutex<BoardState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl BoardStore {
    pub fn new(board_id: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(BoardState::new(board_id))),
            revision: Arc::new(revision),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        // A panic inside reduce leaves the previous value in place.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an action and notify observers. Actions that fail to apply are
    /// logged and leave the state untouched.
    pub fn dispatch(&self, action: BoardAction) -> Result<(), SyncError> {
        let kind = action.kind();
        let result = self.lock().reduce(action);
        match &result {
            Ok(()) => {
                self.revision.send_modify(|revision| *revision += 1);
            }
            Err(err) => warn!(action = kind, error = %err, "Dropped board action"),
        }
        result
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.lock())
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> BoardState {
        self.lock().clone()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that changes after every applied action.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}
