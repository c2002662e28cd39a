//! Server-sent event plumbing for the live board streams.

pub mod cursor;
pub mod entity;
pub mod frame;

pub use entity::{AgentStream, ApprovalStream, ChatStream, EntityStream, TaskStream};
pub use frame::{DEFAULT_MAX_FRAME_BYTES, DecodeReport, SseDecoder, SseFrame};
