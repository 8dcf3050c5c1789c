//! notekeep-core: chat-scoped notes with inline buttons
//!
//! This crate persists named notes for chats, each optionally flagged as a
//! reply and carrying an ordered set of label/URL buttons. Writes to notes and
//! buttons are serialized by a pair of locks owned by the [`Database`] handle.

pub mod buttons;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notes;
pub mod schema;

pub use buttons::ButtonStore;
pub use config::Config;
pub use db::Database;
pub use error::Error;
pub use error::Result;
pub use models::{Button, ButtonLink, ChatId, ChatMigration, Note, NoteStats};
pub use notes::NoteStore;

/// Application name used for config directories and paths.
pub const APP_NAME: &str = "notekeep";
