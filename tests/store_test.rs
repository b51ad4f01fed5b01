//! Tests for the SQLite key-value store.

use tempfile::NamedTempFile;

use strictly_mahjong::{
    CURRENT_GAME_KEY, GameSession, KeyValueStore, RoundInput, SqliteStore, Wind,
};

/// Creates a temporary database file and opens a migrated store on it.
/// The file handle must stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

#[test]
fn test_save_and_load() {
    let (_db, store) = setup_test_db();
    store.save("greeting", "hello").expect("Save failed");

    let value = store.load("greeting").expect("Load failed");
    assert_eq!(value.as_deref(), Some("hello"));
}

#[test]
fn test_load_missing_key() {
    let (_db, store) = setup_test_db();
    assert!(store.load("nothing").expect("Load failed").is_none());
}

#[test]
fn test_save_replaces_value() {
    let (_db, store) = setup_test_db();
    store.save("key", "first").expect("Save failed");
    store.save("key", "second").expect("Save failed");

    assert_eq!(
        store.load("key").expect("Load failed").as_deref(),
        Some("second")
    );
    assert_eq!(store.entries().expect("List failed").len(), 1);
}

#[test]
fn test_remove() {
    let (_db, store) = setup_test_db();
    store.save("key", "value").expect("Save failed");
    store.remove("key").expect("Remove failed");
    assert!(store.load("key").expect("Load failed").is_none());

    // Removing again is fine.
    store.remove("key").expect("Remove failed");
}

#[test]
fn test_entries_sorted_by_key() {
    let (_db, store) = setup_test_db();
    store.save("b", "2").expect("Save failed");
    store.save("a", "1").expect("Save failed");

    let entries = store.entries().expect("List failed");
    let keys: Vec<&str> = entries.iter().map(|e| e.key().as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(entries[0].value(), "1");
}

#[test]
fn test_reopen_keeps_data() {
    let (db, store) = setup_test_db();
    store.save("key", "value").expect("Save failed");

    let reopened = SqliteStore::open(store.db_path()).expect("Reopen failed");
    assert_eq!(
        reopened.load("key").expect("Load failed").as_deref(),
        Some("value")
    );
    drop(db);
}

#[test]
fn test_session_survives_restart() {
    let (_db, store) = setup_test_db();
    let path = store.db_path().to_string();

    let mut session = GameSession::new(store);
    session.start_game(&["Ann", "Bo", "Cy", "Di"], None);
    session
        .add_round(RoundInput::discard(Wind::South, Wind::West, 2))
        .expect("Round accepted");
    let expected = session.state().cloned();

    let store = SqliteStore::open(path).expect("Reopen failed");
    assert!(store.load(CURRENT_GAME_KEY).expect("Load failed").is_some());

    let mut resumed = GameSession::new(store);
    assert_eq!(resumed.load().cloned(), expected);
}
