use chrono::{Duration, Utc};
use redb::ReadableTable;

use billet_db::{Message, Store, StoreError, ids};

fn draft(to: &str, options: &[&str]) -> Message {
    Message {
        from: "a@x.com".to_string(),
        to: to.to_string(),
        subject: "S".to_string(),
        body: "B".to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn ensure_user_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    store.ensure_user("a@x.com").unwrap();
    let id = store
        .record_message("a@x.com", &draft("b@x.com", &["yes"]))
        .unwrap();

    // A second call must not reset the message list.
    store.ensure_user("a@x.com").unwrap();
    let user = store.user("a@x.com").unwrap().unwrap();
    assert_eq!(user.message_ids, vec![id]);
}

#[test]
fn record_message_links_sender_and_materializes_responses() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    store.ensure_user("a@x.com").unwrap();
    let id = store
        .record_message("a@x.com", &draft("b@x.com", &["yes", "no"]))
        .unwrap();

    let user = store.user("a@x.com").unwrap().unwrap();
    assert_eq!(user.message_ids, vec![id.clone()]);

    let stored = store.message(&id).unwrap().unwrap();
    assert_eq!(stored.subject, "S");
    assert_eq!(stored.options, vec!["yes", "no"]);

    // Each slot resolvable independently by its recomputed key.
    for option in 0..2u32 {
        let key = ids::response_id(&id, 0, option);
        let response = store.response(&key).unwrap().unwrap();
        assert_eq!(response.message_id, id);
        assert_eq!(response.recipient, 0);
        assert_eq!(response.option, option);
        assert!(response.selected_at.is_none());
    }

    let slots = store.message_responses(&id).unwrap();
    assert_eq!(slots.len(), 2);
}

#[test]
fn record_message_for_unknown_sender_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("billet.redb");
    let store = Store::open(&path).unwrap();

    store.ensure_user("a@x.com").unwrap();
    let mut message = draft("b@x.com", &["yes", "no"]);
    message.from = "nobody@x.com".to_string();
    let err = store.record_message("nobody@x.com", &message).unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(email) if email == "nobody@x.com"));

    // Reopen the raw file: the buffered message and response writes must
    // have been rolled back with the failed transaction.
    drop(store);
    let db = redb::Database::open(&path).unwrap();
    let txn = db.begin_read().unwrap();

    let messages = txn
        .open_table(redb::TableDefinition::<&str, &[u8]>::new("messages"))
        .unwrap();
    assert_eq!(messages.iter().unwrap().count(), 0);

    let responses = txn
        .open_table(redb::TableDefinition::<&str, &[u8]>::new("responses"))
        .unwrap();
    assert_eq!(responses.iter().unwrap().count(), 0);

    let users = txn
        .open_table(redb::TableDefinition::<&str, &[u8]>::new("users"))
        .unwrap();
    assert_eq!(users.iter().unwrap().count(), 1);
}

#[test]
fn message_without_options_materializes_no_responses() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    store.ensure_user("a@x.com").unwrap();
    let id = store.record_message("a@x.com", &draft("b@x.com", &[])).unwrap();
    assert!(store.message_responses(&id).unwrap().is_empty());
}

#[test]
fn record_selection_first_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    store.ensure_user("a@x.com").unwrap();
    let id = store
        .record_message("a@x.com", &draft("b@x.com", &["yes", "no"]))
        .unwrap();
    let key = ids::response_id(&id, 0, 1);

    let first = Utc::now();
    let selected = store.record_selection(&key, first).unwrap();
    assert_eq!(selected.selected_at, Some(first));

    // Replays (mail prefetchers, double clicks) keep the original timestamp.
    let replay = store.record_selection(&key, first + Duration::hours(2)).unwrap();
    assert_eq!(replay.selected_at, Some(first));

    let stored = store.response(&key).unwrap().unwrap();
    assert_eq!(stored.selected_at, Some(first));
}

#[test]
fn record_selection_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    let err = store.record_selection("no-such-key", Utc::now()).unwrap_err();
    assert!(matches!(err, StoreError::ResponseNotFound(_)));
}

#[test]
fn login_token_verifies_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    let token = store.issue_login("a@x.com").unwrap();
    assert_eq!(store.verify_login(&token).unwrap(), "a@x.com");

    let err = store.verify_login(&token).unwrap_err();
    assert!(matches!(err, StoreError::LoginNotFound));
}

#[test]
fn expired_login_token_is_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    let now = Utc::now();
    let token = store
        .issue_login_at("a@x.com", now - Duration::hours(2))
        .unwrap();

    let err = store.verify_login_at(&token, now).unwrap_err();
    assert!(matches!(err, StoreError::LoginExpired));

    // The expired token was deleted on the first attempt.
    let err = store.verify_login_at(&token, now).unwrap_err();
    assert!(matches!(err, StoreError::LoginNotFound));
}

#[test]
fn login_verifies_inside_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    let now = Utc::now();
    let token = store
        .issue_login_at("a@x.com", now - Duration::minutes(59))
        .unwrap();
    assert_eq!(store.verify_login_at(&token, now).unwrap(), "a@x.com");
}

#[test]
fn sweep_prunes_only_stale_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("billet.redb")).unwrap();

    let now = Utc::now();
    let stale = store
        .issue_login_at("a@x.com", now - Duration::hours(3))
        .unwrap();
    let fresh = store.issue_login_at("b@x.com", now).unwrap();

    let pruned = store.sweep_logins(now - Duration::hours(1)).unwrap();
    assert_eq!(pruned, 1);

    let err = store.verify_login_at(&stale, now).unwrap_err();
    assert!(matches!(err, StoreError::LoginNotFound));
    assert_eq!(store.verify_login_at(&fresh, now).unwrap(), "b@x.com");
}
