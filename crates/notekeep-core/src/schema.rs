//! Database schema for notekeep.

/// SQL schema for notes and their buttons.
///
/// `note_urls` references `notes` by `(chat_id, note_name)` without a foreign
/// key; the note store deletes and re-keys both tables together.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    chat_id TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    is_reply BOOLEAN NOT NULL DEFAULT 0,
    has_buttons BOOLEAN NOT NULL DEFAULT 0,
    PRIMARY KEY (chat_id, name)
);

CREATE TABLE IF NOT EXISTS note_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id TEXT NOT NULL,
    note_name TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_note_urls_note ON note_urls(chat_id, note_name);
"#;
