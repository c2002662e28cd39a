//! Reconnecting entity-stream supervisor.
//!
//! One loop serves all four entity streams: connect with the current
//! cursor, decode frames, dispatch actions, and on any failure or end of
//! stream wait a fixed delay and reconnect. The loop exits only through
//! its cancellation token.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ByteStream, StreamSource};
use crate::board::store::BoardStore;
use crate::errors::ApiError;
use crate::stream::entity::EntityStream;
use crate::stream::frame::{DEFAULT_MAX_FRAME_BYTES, SseDecoder};

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Fixed wait between a failed or finished connection and the next
    /// attempt. There is no back-off and no retry limit.
    pub reconnect_delay: Duration,
    pub max_frame_bytes: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// Everything a stream task needs, cloned into each spawned task.
#[derive(Clone)]
pub struct StreamContext {
    pub board_id: String,
    pub source: Arc<dyn StreamSource>,
    pub store: BoardStore,
    pub settings: StreamSettings,
    pub cancel: CancellationToken,
}

enum StreamEnd {
    Cancelled,
    Closed,
    Failed(ApiError),
}

/// Run one entity stream until `ctx.cancel` fires.
pub async fn run_entity_stream<E: EntityStream>(ctx: StreamContext) {
    let request = E::request(&ctx.board_id);
    let mut attempt: u64 = 0;

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }
        attempt += 1;
        let since = ctx.store.read(E::cursor);

        let opened = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            opened = ctx.source.open(&request, since.as_deref()) => opened,
        };

        match opened {
            Ok(body) => {
                info!(
                    stream = E::NAME,
                    attempt,
                    since = since.as_deref().unwrap_or("-"),
                    "Stream connected"
                );
                match pump::<E>(&ctx, body).await {
                    StreamEnd::Cancelled => break,
                    StreamEnd::Closed => info!(stream = E::NAME, "Stream ended by server"),
                    StreamEnd::Failed(err) => {
                        warn!(stream = E::NAME, error = %err, "Stream read failed")
                    }
                }
            }
            Err(err) => warn!(stream = E::NAME, attempt, error = %err, "Stream connect failed"),
        }

        debug!(
            stream = E::NAME,
            delay_ms = ctx.settings.reconnect_delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            _ = tokio::time::sleep(ctx.settings.reconnect_delay) => {}
        }
    }

    debug!(stream = E::NAME, "Stream stopped");
}

async fn pump<E: EntityStream>(ctx: &StreamContext, mut body: ByteStream) -> StreamEnd {
    let mut decoder = SseDecoder::new(ctx.settings.max_frame_bytes);

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return StreamEnd::Cancelled,
            next = body.next() => next,
        };
        let chunk = match next {
            None => return StreamEnd::Closed,
            Some(Err(err)) => return StreamEnd::Failed(err),
            Some(Ok(chunk)) => chunk,
        };

        let report = decoder.push_chunk(&chunk);
        for err in report.errors {
            warn!(stream = E::NAME, error = %err, "Discarded stream buffer");
        }
        for frame in report.frames {
            if frame.event != E::EVENT || frame.data.is_empty() {
                continue;
            }
            let actions = match E::actions(&frame.data) {
                Ok(actions) => actions,
                Err(err) => {
                    debug!(stream = E::NAME, error = %err, "Dropped malformed frame");
                    continue;
                }
            };
            for action in actions {
                if ctx.cancel.is_cancelled() {
                    return StreamEnd::Cancelled;
                }
                // Rejected actions are logged by the store.
                let _ = ctx.store.dispatch(action);
            }
        }
    }
}
