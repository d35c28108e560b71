//! Integration tests for the Postgres repositories and `PgChatStore`.
//!
//! Exercises the schema and queries against a real database:
//! - Direct pair convergence on `uq_conversations_direct_key`
//! - Superset lookup through the `@>` containment operator
//! - Transactional append and its rollback on a missing conversation
//! - The `ck_conversations_direct_shape` check constraint

use assert_matches::assert_matches;
use mingle_core::channel_key::{ChannelKey, ParticipantSet};
use mingle_core::error::CoreError;
use mingle_db::models::conversation::CreateGroup;
use mingle_db::models::message::NewMessage;
use mingle_db::repositories::{ConversationRepo, MessageRepo};
use mingle_db::store::{ChatStore, PgChatStore, StoreError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn set(key: &str) -> ParticipantSet {
    ChannelKey::new(key).unwrap().participants().unwrap()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn msg(sender: &str, content: &str) -> NewMessage {
    NewMessage {
        sender: sender.to_string(),
        content: content.to_string(),
    }
}

async fn conversation_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn message_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: find_or_create_direct converges on one row per pair
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_direct_pair_converges_on_one_row(pool: PgPool) {
    let pair = set("alice_bob");
    let key = pair.direct_key().unwrap();

    let first = ConversationRepo::find_or_create_direct(&pool, pair.as_slice(), &key)
        .await
        .unwrap();
    let second = ConversationRepo::find_or_create_direct(&pool, pair.as_slice(), &key)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(!first.is_group);
    assert_eq!(first.participants, ids(&["alice", "bob"]));
    assert_eq!(first.direct_key.as_deref(), Some("5:alice3:bob"));
    assert_eq!(conversation_rows(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_direct_creation_yields_one_row(pool: PgPool) {
    let store = PgChatStore::new(pool.clone());
    let forward = set("alice_bob");
    let reverse = set("bob_alice");

    let (a, b) = tokio::join!(
        store.find_or_create_conversation(&forward),
        store.find_or_create_conversation(&reverse),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(conversation_rows(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_separator_ids_get_distinct_direct_rows(pool: PgPool) {
    let store = PgChatStore::new(pool.clone());

    // Pairs {"a:b", "c"} and {"a", "b:c"}.
    let left = store.find_or_create_conversation(&set("a:b_c")).await.unwrap();
    let right = store.find_or_create_conversation(&set("a_b:c")).await.unwrap();

    assert_ne!(left.id, right.id);
    assert_ne!(left.direct_key, right.direct_key);
    assert_eq!(conversation_rows(&pool).await, 2);
}

// ---------------------------------------------------------------------------
// Test: superset lookup for group keys
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_find_containing_matches_superset(pool: PgPool) {
    let group = ConversationRepo::create_group(
        &pool,
        &ids(&["alice", "bob", "carol", "dave"]),
        Some("Crew"),
        Some("alice"),
    )
    .await
    .unwrap();

    let found = ConversationRepo::find_containing(&pool, &ids(&["alice", "bob", "carol"]))
        .await
        .unwrap()
        .expect("superset group should match");
    assert_eq!(found.id, group.id);

    let missing = ConversationRepo::find_containing(&pool, &ids(&["alice", "erin", "bob"]))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_group_key_reuses_containing_conversation(pool: PgPool) {
    let store = PgChatStore::new(pool.clone());

    let created = store.find_or_create_conversation(&set("alice_bob_carol")).await.unwrap();
    assert!(created.is_group);

    let again = store.find_or_create_conversation(&set("carol_alice_bob")).await.unwrap();
    assert_eq!(created.id, again.id);

    // A pair inside the group still gets its own direct conversation.
    let direct = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    assert_ne!(direct.id, created.id);
    assert!(!direct.is_group);
}

// ---------------------------------------------------------------------------
// Test: append links the conversation to its newest message
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_append_links_last_message_in_order(pool: PgPool) {
    let store = PgChatStore::new(pool.clone());
    let conversation = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();

    let first = store.append_message(conversation.id, &msg("alice", "hi")).await.unwrap();
    let second = store.append_message(conversation.id, &msg("bob", "hey")).await.unwrap();

    let detail = store.get_conversation(conversation.id).await.unwrap();
    assert_eq!(detail.conversation.last_message_id, Some(second.id));
    assert_eq!(detail.message_ids, vec![first.id, second.id]);

    let messages = store.list_messages(conversation.id).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hi", "hey"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_append_to_missing_conversation_writes_nothing(pool: PgPool) {
    let store = PgChatStore::new(pool.clone());

    let result = store.append_message(999_999, &msg("alice", "lost")).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound {
            entity: "Conversation",
            id: 999_999
        }))
    );
    assert_eq!(message_rows(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_repo_append_reports_row_not_found(pool: PgPool) {
    let result = MessageRepo::append(&pool, 424_242, &msg("alice", "lost")).await;
    assert_matches!(result, Err(sqlx::Error::RowNotFound));
}

// ---------------------------------------------------------------------------
// Test: direct conversations must carry a key and exactly two participants
// ---------------------------------------------------------------------------

fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_direct_without_key_rejected(pool: PgPool) {
    let err = sqlx::query(
        "INSERT INTO conversations (participants, direct_key, is_group) \
         VALUES ($1, NULL, false)",
    )
    .bind(ids(&["alice", "bob"]))
    .execute(&pool)
    .await
    .expect_err("direct row without a key should fail");

    assert_eq!(
        violated_constraint(&err).as_deref(),
        Some("ck_conversations_direct_shape")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_direct_with_three_participants_rejected(pool: PgPool) {
    let err = sqlx::query(
        "INSERT INTO conversations (participants, direct_key, is_group) \
         VALUES ($1, 'k', false)",
    )
    .bind(ids(&["alice", "bob", "carol"]))
    .execute(&pool)
    .await
    .expect_err("direct row with three participants should fail");

    assert_eq!(
        violated_constraint(&err).as_deref(),
        Some("ck_conversations_direct_shape")
    );
}

// ---------------------------------------------------------------------------
// Test: groups, listing and read receipts through PgChatStore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_group_adds_admin(pool: PgPool) {
    let store = PgChatStore::new(pool);

    let group = store
        .create_group(&CreateGroup {
            name: "  Weekend  ".to_string(),
            admin: "alice".to_string(),
            participants: ids(&["carol", "bob"]),
        })
        .await
        .unwrap();

    assert!(group.is_group);
    assert!(group.direct_key.is_none());
    assert_eq!(group.group_name.as_deref(), Some("Weekend"));
    assert_eq!(group.group_admin.as_deref(), Some("alice"));
    assert_eq!(group.participants, ids(&["alice", "bob", "carol"]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_for_user_orders_by_activity(pool: PgPool) {
    let store = PgChatStore::new(pool);
    let older = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    let newer = store.find_or_create_conversation(&set("alice_carol")).await.unwrap();
    store.find_or_create_conversation(&set("bob_carol")).await.unwrap();

    // A new message bumps the older conversation to the top.
    store.append_message(older.id, &msg("bob", "ping")).await.unwrap();

    let listed: Vec<i64> = store
        .list_for_user("alice")
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(listed, vec![older.id, newer.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_read_skips_own_messages(pool: PgPool) {
    let store = PgChatStore::new(pool);
    let conversation = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    store.append_message(conversation.id, &msg("alice", "one")).await.unwrap();
    store.append_message(conversation.id, &msg("bob", "two")).await.unwrap();
    store.append_message(conversation.id, &msg("bob", "three")).await.unwrap();

    assert_eq!(store.mark_read(conversation.id, "alice").await.unwrap(), 2);
    assert_eq!(store.mark_read(conversation.id, "alice").await.unwrap(), 0);

    let unread: Vec<String> = store
        .list_messages(conversation.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| !m.is_read)
        .map(|m| m.sender)
        .collect();
    assert_eq!(unread, ids(&["alice"]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check_succeeds(pool: PgPool) {
    let store = PgChatStore::new(pool);
    store.health_check().await.unwrap();
}
