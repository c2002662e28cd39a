//! Shared UI icons.
//!
//! Each icon falls back to a plain-text marker on terminals without emoji
//! support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
pub static LIVE: Emoji<'_, '_> = Emoji("📡 ", "[LIVE]");

// Board sections
pub static BOARD: Emoji<'_, '_> = Emoji("📋 ", "");
pub static APPROVAL: Emoji<'_, '_> = Emoji("🛂 ", "[A]");
pub static AGENT: Emoji<'_, '_> = Emoji("🤖 ", "[@]");
pub static COMMENT: Emoji<'_, '_> = Emoji("💬 ", ">");
pub static CHAT: Emoji<'_, '_> = Emoji("🗨️  ", "#");
