//! Typed error hierarchy for the Mission Control client.
//!
//! Three enums cover the three layers:
//! - `ApiError`: REST and event-stream transport failures
//! - `FrameError`: event-stream decoding failures
//! - `SyncError`: board sync, reconciliation and mutation failures

use thiserror::Error;

/// Errors from the HTTP layer (REST calls and stream connects).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in: configure an API token to access boards")]
    NotSignedIn,

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Request for {what} failed: {source}")]
    Transport {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP {status} from {what}")]
    UnexpectedStatus { what: String, status: u16 },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while splitting an event stream into frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Pending stream buffer of {size} bytes exceeds limit of {max} bytes")]
    OversizedBuffer { size: usize, max: usize },
}

/// Errors from the sync layer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    #[error("Task {id} not found")]
    TaskNotFound { id: String },

    #[error("No task is open")]
    NoOpenTask,

    #[error("{entity} payload has no id")]
    MissingId { entity: &'static str },

    #[error("Failed to merge {entity} {id}: {source}")]
    Merge {
        entity: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_names_the_resource() {
        let err = ApiError::UnexpectedStatus {
            what: "board snapshot".to_string(),
            status: 503,
        };
        let message = err.to_string();
        assert!(message.contains("board snapshot"));
        assert!(message.contains("503"));
    }

    #[test]
    fn sync_error_converts_from_api_error() {
        let err: SyncError = ApiError::NotSignedIn.into();
        assert!(matches!(err, SyncError::Api(ApiError::NotSignedIn)));
        assert!(err.to_string().contains("Not signed in"));
    }

    #[test]
    fn validation_error_displays_message_verbatim() {
        let err = SyncError::Validation("Add a task title to continue.".to_string());
        assert_eq!(err.to_string(), "Add a task title to continue.");
    }

    #[test]
    fn merge_error_carries_entity_and_id() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = SyncError::Merge {
            entity: "task",
            id: "t1".to_string(),
            source,
        };
        match &err {
            SyncError::Merge { entity, id, .. } => {
                assert_eq!(*entity, "task");
                assert_eq!(id, "t1");
            }
            _ => panic!("Expected Merge"),
        }
    }

    #[test]
    fn frame_error_reports_sizes() {
        let err = FrameError::OversizedBuffer { size: 10, max: 4 };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("4"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ApiError::NotSignedIn);
        assert_std_error(&FrameError::OversizedBuffer { size: 1, max: 0 });
        assert_std_error(&SyncError::NoOpenTask);
    }
}
