//! Note operations.
//!
//! Writes here are the only place note rows change, and the only place a
//! note's buttons are cleared or re-keyed. Every write that touches both tables
//! holds the notes lock, then the buttons lock, and runs in one transaction.

use crate::buttons::{delete_note_buttons, insert_links, rekey_chat_buttons};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{ButtonLink, ChatId, ChatMigration, Note, NoteStats};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

/// Store for `notes` rows.
#[derive(Clone)]
pub struct NoteStore {
    db: Database,
}

impl NoteStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Save a note, replacing any note with the same name in the chat together
    /// with all of its buttons.
    ///
    /// The old rows, the new note and its buttons commit as one transaction, so
    /// readers never see `has_buttons` set on a note without button rows.
    pub async fn upsert_note(
        &self,
        chat_id: impl Into<ChatId>,
        name: &str,
        value: &str,
        is_reply: bool,
        buttons: &[ButtonLink],
    ) -> Result<()> {
        let chat_id = chat_id.into();
        require_key(&chat_id, name)?;

        // Both locks are taken before the transaction starts so a concurrent
        // append cannot invalidate our read snapshot.
        let _locks = self.db.locks().both().await;

        let replacing = self.exists(&chat_id, name).await?;

        let mut tx = self.db.pool().begin().await?;

        // Buttons appended before any note existed under this key are cleared
        // too, so the stored rows always match `has_buttons`.
        let cleared = delete_note_buttons(&mut *tx, &chat_id, name).await?;
        if replacing {
            delete_row(&mut *tx, &chat_id, name).await?;
            tracing::debug!(chat_id = %chat_id, note = name, cleared, "Replacing note");
        } else if cleared > 0 {
            tracing::debug!(chat_id = %chat_id, note = name, cleared, "Cleared orphaned buttons");
        }

        sqlx::query(
            "INSERT INTO notes (chat_id, name, value, is_reply, has_buttons) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id.as_str())
        .bind(name)
        .bind(value)
        .bind(is_reply)
        .bind(!buttons.is_empty())
        .execute(&mut *tx)
        .await?;

        insert_links(&mut *tx, &chat_id, name, buttons).await?;

        tx.commit().await?;
        tracing::debug!(
            chat_id = %chat_id,
            note = name,
            buttons = buttons.len(),
            "Saved note"
        );
        Ok(())
    }

    /// Delete a note and its buttons. Returns `false` if there was no such note.
    pub async fn remove_note(&self, chat_id: impl Into<ChatId>, name: &str) -> Result<bool> {
        let chat_id = chat_id.into();

        let locks = self.db.locks();
        let _notes = locks.notes().await;

        if !self.exists(&chat_id, name).await? {
            return Ok(false);
        }

        let _buttons = locks.buttons().await;
        let mut tx = self.db.pool().begin().await?;

        let cleared = delete_note_buttons(&mut *tx, &chat_id, name).await?;
        delete_row(&mut *tx, &chat_id, name).await?;

        tx.commit().await?;
        tracing::debug!(chat_id = %chat_id, note = name, cleared, "Removed note");
        Ok(true)
    }

    /// Move every note and button of `old` to `new`.
    ///
    /// The caller must make sure `new` holds no note with a name that `old`
    /// also uses. On such a collision the commit fails, nothing moves, and the
    /// database error is returned.
    pub async fn migrate_chat(
        &self,
        old: impl Into<ChatId>,
        new: impl Into<ChatId>,
    ) -> Result<ChatMigration> {
        let old = old.into();
        let new = new.into();
        if old.is_empty() || new.is_empty() {
            return Err(Error::InvalidArgument(
                "chat ids for migration must not be empty".to_string(),
            ));
        }
        if old == new {
            return Ok(ChatMigration::default());
        }

        let _locks = self.db.locks().both().await;
        let mut tx = self.db.pool().begin().await?;

        let notes = sqlx::query("UPDATE notes SET chat_id = ? WHERE chat_id = ?")
            .bind(new.as_str())
            .bind(old.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let buttons = rekey_chat_buttons(&mut *tx, &old, &new).await?;

        tx.commit().await?;
        tracing::info!(
            from = %old,
            to = %new,
            notes,
            buttons,
            "Migrated chat notes"
        );
        Ok(ChatMigration { notes, buttons })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a note by chat and name.
    pub async fn get_note(&self, chat_id: impl Into<ChatId>, name: &str) -> Result<Option<Note>> {
        let chat_id = chat_id.into();
        let row = sqlx::query("SELECT * FROM notes WHERE chat_id = ? AND name = ?")
            .bind(chat_id.as_str())
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    /// All notes of a chat, ordered by name.
    pub async fn list_notes(&self, chat_id: impl Into<ChatId>) -> Result<Vec<Note>> {
        let chat_id = chat_id.into();
        let rows = sqlx::query("SELECT * FROM notes WHERE chat_id = ? ORDER BY name")
            .bind(chat_id.as_str())
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    /// Get note count across all chats.
    pub async fn count_notes(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count.0)
    }

    /// Get the number of chats that have at least one note.
    pub async fn count_chats(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT chat_id) FROM notes")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count.0)
    }

    /// Note and chat counts.
    pub async fn stats(&self) -> Result<NoteStats> {
        Ok(NoteStats {
            notes: self.count_notes().await?,
            chats: self.count_chats().await?,
        })
    }

    async fn exists(&self, chat_id: &ChatId, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM notes WHERE chat_id = ? AND name = ?")
            .bind(chat_id.as_str())
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }
}

fn require_key(chat_id: &ChatId, name: &str) -> Result<()> {
    if chat_id.is_empty() {
        return Err(Error::InvalidArgument("chat id must not be empty".to_string()));
    }
    if name.is_empty() {
        return Err(Error::InvalidArgument("note name must not be empty".to_string()));
    }
    Ok(())
}

async fn delete_row(conn: &mut SqliteConnection, chat_id: &ChatId, name: &str) -> Result<()> {
    sqlx::query("DELETE FROM notes WHERE chat_id = ? AND name = ?")
        .bind(chat_id.as_str())
        .bind(name)
        .execute(conn)
        .await?;
    Ok(())
}

fn note_from_row(row: &SqliteRow) -> Note {
    Note {
        chat_id: ChatId::from(row.get::<String, _>("chat_id")),
        name: row.get("name"),
        value: row.get("value"),
        is_reply: row.get("is_reply"),
        has_buttons: row.get("has_buttons"),
    }
}
