//! Button rows attached to notes.

use crate::db::Database;
use crate::error::Result;
use crate::models::{Button, ButtonLink, ChatId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

/// Store for `note_urls` rows.
///
/// Buttons reference their note by `(chat_id, note_name)` only. Replacing or
/// deleting a note's buttons goes through [`crate::NoteStore`].
#[derive(Clone)]
pub struct ButtonStore {
    db: Database,
}

impl ButtonStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a button to a note and return its id.
    ///
    /// Duplicate labels are kept. The owning note's `has_buttons` flag is not
    /// updated, so appending to a note saved without buttons leaves it
    /// reporting `has_buttons == false` while button rows exist. Re-save the
    /// note through [`crate::NoteStore::upsert_note`] to restore the flag.
    /// Buttons appended under a name with no note are dropped by the next
    /// upsert of that name.
    pub async fn append_button(
        &self,
        chat_id: impl Into<ChatId>,
        note_name: &str,
        name: &str,
        url: &str,
    ) -> Result<i64> {
        let chat_id = chat_id.into();
        let _buttons = self.db.locks().buttons().await;

        let mut conn = self.db.pool().acquire().await?;
        let id = insert_row(&mut *conn, &chat_id, note_name, name, url).await?;

        tracing::debug!(chat_id = %chat_id, note = note_name, id, "Appended button");
        Ok(id)
    }

    /// Buttons for a note in insertion order.
    pub async fn list_buttons(
        &self,
        chat_id: impl Into<ChatId>,
        note_name: &str,
    ) -> Result<Vec<Button>> {
        let chat_id = chat_id.into();
        let rows = sqlx::query(
            "SELECT id, chat_id, note_name, name, url FROM note_urls WHERE chat_id = ? AND note_name = ? ORDER BY id",
        )
        .bind(chat_id.as_str())
        .bind(note_name)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(button_from_row).collect())
    }
}

async fn insert_row(
    conn: &mut SqliteConnection,
    chat_id: &ChatId,
    note_name: &str,
    name: &str,
    url: &str,
) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO note_urls (chat_id, note_name, name, url) VALUES (?, ?, ?, ?)")
            .bind(chat_id.as_str())
            .bind(note_name)
            .bind(name)
            .bind(url)
            .execute(conn)
            .await?;
    Ok(result.last_insert_rowid())
}

/// Insert `links` in order on an open transaction.
pub(crate) async fn insert_links(
    conn: &mut SqliteConnection,
    chat_id: &ChatId,
    note_name: &str,
    links: &[ButtonLink],
) -> Result<()> {
    for link in links {
        insert_row(&mut *conn, chat_id, note_name, &link.name, &link.url).await?;
    }
    Ok(())
}

/// Delete every button of a note. Returns the number of rows removed.
pub(crate) async fn delete_note_buttons(
    conn: &mut SqliteConnection,
    chat_id: &ChatId,
    note_name: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM note_urls WHERE chat_id = ? AND note_name = ?")
        .bind(chat_id.as_str())
        .bind(note_name)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Move every button of `old` to `new`. Returns the number of rows updated.
pub(crate) async fn rekey_chat_buttons(
    conn: &mut SqliteConnection,
    old: &ChatId,
    new: &ChatId,
) -> Result<u64> {
    let result = sqlx::query("UPDATE note_urls SET chat_id = ? WHERE chat_id = ?")
        .bind(new.as_str())
        .bind(old.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

fn button_from_row(row: &SqliteRow) -> Button {
    Button {
        id: row.get("id"),
        chat_id: ChatId::from(row.get::<String, _>("chat_id")),
        note_name: row.get("note_name"),
        name: row.get("name"),
        url: row.get("url"),
    }
}
