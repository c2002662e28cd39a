//! Local model of one board.
//!
//! | Module      | Purpose                                              |
//! |-------------|------------------------------------------------------|
//! | `models`    | Wire entities (board, task, agent, approval, chat)   |
//! | `timestamp` | Lenient RFC 3339 / naive UTC timestamps              |
//! | `merge`     | Shallow merge of partial payloads                    |
//! | `state`     | `BoardState`, `BoardAction` and the reducer          |
//! | `store`     | Shared, observable handle with one dispatch point    |
//! | `views`     | Derived read-only projections                        |

pub mod merge;
pub mod models;
pub mod state;
pub mod store;
pub mod timestamp;
pub mod views;

pub use models::{
    Agent, AgentStatus, Approval, ApprovalStatus, Board, BoardChatMessage, BoardSnapshot, Task,
    TaskComment, TaskCounts, TaskPriority, TaskStatus,
};
pub use state::{BoardAction, BoardState, LIVE_FEED_LIMIT, Section, TaskDetail};
pub use store::BoardStore;
