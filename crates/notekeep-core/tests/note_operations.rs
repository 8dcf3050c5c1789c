//! Integration tests for note and button operations.

use notekeep_core::config::DatabaseConfig;
use notekeep_core::{Button, ButtonLink, ChatId, Database, Error};
use uuid::Uuid;

fn temp_db_path() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    let filename = format!("notekeep-test-{}.db", Uuid::new_v4());
    path.push(filename);
    path
}

async fn open_db() -> Database {
    Database::open(&temp_db_path(), &DatabaseConfig::default())
        .await
        .expect("open db")
}

fn links(pairs: &[(&str, &str)]) -> Vec<ButtonLink> {
    pairs
        .iter()
        .map(|(name, url)| ButtonLink::new(*name, *url))
        .collect()
}

// ============================================================================
// Upsert
// ============================================================================

#[tokio::test]
async fn upsert_without_buttons_stores_plain_note() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note(-100_i64, "rules", "Be nice.", true, &[])
        .await
        .expect("upsert");

    let note = notes
        .get_note(-100_i64, "rules")
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(note.chat_id, ChatId::from("-100"));
    assert_eq!(note.name, "rules");
    assert_eq!(note.value, "Be nice.");
    assert!(note.is_reply);
    assert!(!note.has_buttons);

    let buttons = db
        .buttons()
        .list_buttons(-100_i64, "rules")
        .await
        .expect("buttons");
    assert!(buttons.is_empty());
}

#[tokio::test]
async fn upsert_with_buttons_keeps_insertion_order() {
    let db = open_db().await;
    let supplied = links(&[
        ("Website", "https://example.com"),
        ("Docs", "https://example.com/docs"),
        ("Website", "https://example.com/mirror"),
    ]);

    db.notes()
        .upsert_note("chat", "links", "Useful links", false, &supplied)
        .await
        .expect("upsert");

    let note = db
        .notes()
        .get_note("chat", "links")
        .await
        .expect("get")
        .expect("exists");
    assert!(note.has_buttons);
    assert!(!note.is_reply);

    let stored = db
        .buttons()
        .list_buttons("chat", "links")
        .await
        .expect("buttons");
    let stored_links: Vec<ButtonLink> = stored.iter().map(Button::link).collect();
    assert_eq!(stored_links, supplied);
    assert!(stored.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(stored.iter().all(|b| b.note_name == "links"));
}

#[tokio::test]
async fn upsert_replaces_note_and_all_previous_buttons() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note(
            "chat",
            "faq",
            "v1",
            false,
            &links(&[("a", "https://a.example"), ("b", "https://b.example")]),
        )
        .await
        .expect("upsert v1");
    notes
        .upsert_note(
            "chat",
            "faq",
            "v2",
            true,
            &links(&[("c", "https://c.example")]),
        )
        .await
        .expect("upsert v2");

    let note = notes
        .get_note("chat", "faq")
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(note.value, "v2");
    assert!(note.is_reply);
    assert!(note.has_buttons);

    let buttons = db
        .buttons()
        .list_buttons("chat", "faq")
        .await
        .expect("buttons");
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].name, "c");
    assert_eq!(notes.count_notes().await.expect("count"), 1);
}

#[tokio::test]
async fn upsert_without_buttons_clears_previous_buttons() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note("chat", "faq", "v1", false, &links(&[("a", "https://a.example")]))
        .await
        .expect("upsert v1");
    notes
        .upsert_note("chat", "faq", "v2", false, &[])
        .await
        .expect("upsert v2");

    let note = notes
        .get_note("chat", "faq")
        .await
        .expect("get")
        .expect("exists");
    assert!(!note.has_buttons);
    assert!(
        db.buttons()
            .list_buttons("chat", "faq")
            .await
            .expect("buttons")
            .is_empty()
    );
}

#[tokio::test]
async fn upsert_does_not_touch_same_name_in_other_chat() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note("one", "hello", "from one", false, &links(&[("x", "https://x.example")]))
        .await
        .expect("upsert one");
    notes
        .upsert_note("two", "hello", "from two", false, &[])
        .await
        .expect("upsert two");

    let one = notes
        .get_note("one", "hello")
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(one.value, "from one");
    assert_eq!(
        db.buttons()
            .list_buttons("one", "hello")
            .await
            .expect("buttons")
            .len(),
        1
    );
}

#[tokio::test]
async fn upsert_without_buttons_drops_buttons_appended_before_the_note() {
    let db = open_db().await;

    db.buttons()
        .append_button("chat", "early", "stray", "https://stray.example")
        .await
        .expect("append");
    db.notes()
        .upsert_note("chat", "early", "v", false, &[])
        .await
        .expect("upsert");

    let note = db
        .notes()
        .get_note("chat", "early")
        .await
        .expect("get")
        .expect("exists");
    let rows = db
        .buttons()
        .list_buttons("chat", "early")
        .await
        .expect("buttons");
    assert!(!note.has_buttons);
    assert_eq!(note.has_buttons, !rows.is_empty());
}

#[tokio::test]
async fn upsert_with_buttons_replaces_buttons_appended_before_the_note() {
    let db = open_db().await;

    db.buttons()
        .append_button("chat", "early", "stale", "https://stale.example")
        .await
        .expect("append");
    let supplied = links(&[("B", "https://b.example")]);
    db.notes()
        .upsert_note("chat", "early", "v", false, &supplied)
        .await
        .expect("upsert");

    let note = db
        .notes()
        .get_note("chat", "early")
        .await
        .expect("get")
        .expect("exists");
    assert!(note.has_buttons);

    let stored = db
        .buttons()
        .list_buttons("chat", "early")
        .await
        .expect("buttons");
    let stored_links: Vec<ButtonLink> = stored.iter().map(Button::link).collect();
    assert_eq!(stored_links, supplied);
}

#[tokio::test]
async fn append_to_note_saved_without_buttons_leaves_flag_until_resaved() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note("chat", "plain", "v", false, &[])
        .await
        .expect("upsert");
    db.buttons()
        .append_button("chat", "plain", "late", "https://late.example")
        .await
        .expect("append");

    let note = notes
        .get_note("chat", "plain")
        .await
        .expect("get")
        .expect("exists");
    assert!(!note.has_buttons);

    let appended = db
        .buttons()
        .list_buttons("chat", "plain")
        .await
        .expect("buttons");
    let appended_links: Vec<ButtonLink> = appended.iter().map(Button::link).collect();
    notes
        .upsert_note("chat", "plain", "v", false, &appended_links)
        .await
        .expect("resave");

    let note = notes
        .get_note("chat", "plain")
        .await
        .expect("get")
        .expect("exists");
    assert!(note.has_buttons);
    assert_eq!(
        db.buttons()
            .list_buttons("chat", "plain")
            .await
            .expect("buttons")
            .len(),
        1
    );
}

#[tokio::test]
async fn upsert_rejects_empty_key() {
    let db = open_db().await;
    let notes = db.notes();

    let err = notes
        .upsert_note("", "name", "value", false, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = notes
        .upsert_note("chat", "", "value", false, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    assert_eq!(notes.count_notes().await.expect("count"), 0);
}

// ============================================================================
// Get / remove / list
// ============================================================================

#[tokio::test]
async fn get_note_returns_none_for_missing() {
    let db = open_db().await;
    let result = db.notes().get_note("chat", "missing").await.expect("get");
    assert!(result.is_none());
}

#[tokio::test]
async fn remove_note_deletes_note_and_buttons() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note("chat", "gone", "bye", false, &links(&[("a", "https://a.example")]))
        .await
        .expect("upsert");
    notes
        .upsert_note(
            "chat",
            "sibling",
            "stays",
            false,
            &links(&[("s1", "https://s1.example"), ("s2", "https://s2.example")]),
        )
        .await
        .expect("upsert sibling");

    assert!(notes.remove_note("chat", "gone").await.expect("remove"));
    assert!(notes.get_note("chat", "gone").await.expect("get").is_none());
    assert!(
        db.buttons()
            .list_buttons("chat", "gone")
            .await
            .expect("buttons")
            .is_empty()
    );

    let sibling = db
        .buttons()
        .list_buttons("chat", "sibling")
        .await
        .expect("buttons");
    let labels: Vec<&str> = sibling.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(labels, vec!["s1", "s2"]);
    assert!(
        notes
            .get_note("chat", "sibling")
            .await
            .expect("get")
            .expect("exists")
            .has_buttons
    );
}

#[tokio::test]
async fn remove_missing_note_returns_false_and_changes_nothing() {
    let db = open_db().await;
    let notes = db.notes();

    notes
        .upsert_note("chat", "kept", "still here", false, &[])
        .await
        .expect("upsert");

    assert!(!notes.remove_note("chat", "missing").await.expect("remove"));
    assert!(!notes.remove_note("other", "kept").await.expect("remove"));
    assert_eq!(notes.count_notes().await.expect("count"), 1);
}

#[tokio::test]
async fn list_notes_is_scoped_to_chat() {
    let db = open_db().await;
    let notes = db.notes();

    for name in ["zeta", "alpha", "mid"] {
        notes
            .upsert_note("listed", name, "v", false, &[])
            .await
            .expect("upsert");
    }
    notes
        .upsert_note("elsewhere", "alpha", "v", false, &[])
        .await
        .expect("upsert");

    let listed = notes.list_notes("listed").await.expect("list");
    let names: Vec<&str> = listed.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    assert!(notes.list_notes("empty").await.expect("list").is_empty());
}

// ============================================================================
// Buttons
// ============================================================================

#[tokio::test]
async fn append_button_keeps_duplicates_in_order() {
    let db = open_db().await;
    let buttons = db.buttons();

    let first = buttons
        .append_button("chat", "note", "Same", "https://one.example")
        .await
        .expect("append");
    let second = buttons
        .append_button("chat", "note", "Same", "https://two.example")
        .await
        .expect("append");
    assert!(second > first);

    let listed = buttons.list_buttons("chat", "note").await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[0].url, "https://one.example");
    assert_eq!(listed[1].id, second);
    assert_eq!(listed[1].url, "https://two.example");
}

#[tokio::test]
async fn list_buttons_returns_empty_for_unknown_note() {
    let db = open_db().await;
    let listed = db
        .buttons()
        .list_buttons("chat", "nothing")
        .await
        .expect("list");
    assert!(listed.is_empty());
}

// ============================================================================
// Counts
// ============================================================================

#[tokio::test]
async fn counts_track_present_notes_and_chats() {
    let db = open_db().await;
    let notes = db.notes();

    assert_eq!(notes.count_notes().await.expect("count"), 0);
    assert_eq!(notes.count_chats().await.expect("count"), 0);

    notes.upsert_note("a", "one", "v", false, &[]).await.expect("upsert");
    notes.upsert_note("a", "two", "v", false, &[]).await.expect("upsert");
    notes.upsert_note("a", "two", "v2", false, &[]).await.expect("overwrite");
    notes.upsert_note("b", "one", "v", false, &[]).await.expect("upsert");
    notes.upsert_note("c", "one", "v", false, &[]).await.expect("upsert");

    assert_eq!(notes.count_notes().await.expect("count"), 4);
    assert_eq!(notes.count_chats().await.expect("count"), 3);

    notes.remove_note("c", "one").await.expect("remove");

    let stats = notes.stats().await.expect("stats");
    assert_eq!(stats.notes, 3);
    assert_eq!(stats.chats, 2);
}
