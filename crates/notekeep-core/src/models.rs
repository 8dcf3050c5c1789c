//! Domain models for notes and their buttons.

use serde::{Deserialize, Serialize};

/// Identifier of the chat that owns a note.
///
/// Kept as text: numeric chat ids (negative for groups) do not fit every
/// backend's integer columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ChatId> for ChatId {
    fn from(id: &ChatId) -> Self {
        id.clone()
    }
}

/// A named snippet stored for a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub chat_id: ChatId,
    pub name: String,
    pub value: String,
    pub is_reply: bool,
    pub has_buttons: bool,
}

/// A clickable link attached to a note, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: i64,
    pub chat_id: ChatId,
    pub note_name: String,
    pub name: String,
    pub url: String,
}

impl Button {
    /// The label/URL pair without storage identity.
    pub fn link(&self) -> ButtonLink {
        ButtonLink {
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}

/// Label and URL supplied when saving a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLink {
    pub name: String,
    pub url: String,
}

impl ButtonLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Aggregate counts across all chats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStats {
    pub notes: i64,
    pub chats: i64,
}

/// Rows re-keyed by a chat migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMigration {
    pub notes: u64,
    pub buttons: u64,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
