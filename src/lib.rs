pub mod api;
pub mod board;
pub mod config;
pub mod errors;
pub mod stream;
pub mod sync;
pub mod ui;
