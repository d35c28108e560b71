//! Behaviour of the in-process `ChatStore`.
//!
//! The Postgres store implements the same contract through the
//! repositories; these tests pin the contract itself.

use std::sync::Arc;

use assert_matches::assert_matches;
use mingle_core::channel_key::{ChannelKey, ParticipantSet};
use mingle_core::error::CoreError;
use mingle_db::models::conversation::CreateGroup;
use mingle_db::models::message::NewMessage;
use mingle_db::store::{ChatStore, MemoryChatStore, StoreError};

fn set(key: &str) -> ParticipantSet {
    ChannelKey::new(key).unwrap().participants().unwrap()
}

fn msg(sender: &str, content: &str) -> NewMessage {
    NewMessage {
        sender: sender.to_string(),
        content: content.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Test: the same pair always resolves to one direct conversation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pair_resolves_to_single_direct_conversation() {
    let store = MemoryChatStore::new();

    let first = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    let second = store.find_or_create_conversation(&set("bob_alice")).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(!first.is_group);
    assert_eq!(first.direct_key.as_deref(), Some("5:alice3:bob"));
    assert_eq!(store.conversation_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: a direct pair never matches a group that happens to contain it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pair_lookup_is_exact_not_superset() {
    let store = MemoryChatStore::new();

    let group = store.find_or_create_conversation(&set("alice_bob_carol")).await.unwrap();
    assert!(group.is_group);

    let direct = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    assert_ne!(group.id, direct.id);
    assert!(!direct.is_group);
}

// ---------------------------------------------------------------------------
// Test: group keys match any conversation containing all participants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn group_key_matches_superset() {
    let store = MemoryChatStore::new();

    let created = store
        .create_group(&CreateGroup {
            name: "Trip".to_string(),
            admin: "dave".to_string(),
            participants: vec!["alice".into(), "bob".into(), "carol".into()],
        })
        .await
        .unwrap();

    let resolved = store.find_or_create_conversation(&set("alice_bob_carol")).await.unwrap();
    assert_eq!(created.id, resolved.id);
    assert_eq!(store.conversation_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: concurrent resolution of a new pair creates exactly one conversation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_find_or_create_does_not_duplicate() {
    let store = Arc::new(MemoryChatStore::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.find_or_create_conversation(&set("alice_bob")).await.unwrap().id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.dedup();

    assert_eq!(ids.len(), 1);
    assert_eq!(store.conversation_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: appended messages are linked in order and update last_message_id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn append_links_messages_in_order() {
    let store = MemoryChatStore::new();
    let conversation = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();

    let m1 = store.append_message(conversation.id, &msg("alice", "hi")).await.unwrap();
    let m2 = store.append_message(conversation.id, &msg("bob", "hey")).await.unwrap();

    let detail = store.get_conversation(conversation.id).await.unwrap();
    assert_eq!(detail.message_ids, vec![m1.id, m2.id]);
    assert_eq!(detail.conversation.last_message_id, Some(m2.id));
    assert!(!m1.is_read);
}

// ---------------------------------------------------------------------------
// Test: appending to an unknown conversation is NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn append_to_unknown_conversation_fails() {
    let store = MemoryChatStore::new();

    let result = store.append_message(42, &msg("alice", "hi")).await;

    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Conversation", id: 42 }))
    );
    assert_eq!(store.message_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: mark_read only flips messages from other participants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mark_read_skips_own_messages() {
    let store = MemoryChatStore::new();
    let conversation = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();

    store.append_message(conversation.id, &msg("alice", "one")).await.unwrap();
    store.append_message(conversation.id, &msg("bob", "two")).await.unwrap();
    store.append_message(conversation.id, &msg("bob", "three")).await.unwrap();

    assert_eq!(store.mark_read(conversation.id, "alice").await.unwrap(), 2);
    assert_eq!(store.mark_read(conversation.id, "alice").await.unwrap(), 0);

    let messages = store.list_messages(conversation.id).await.unwrap();
    let unread: Vec<_> = messages.iter().filter(|m| !m.is_read).collect();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].sender, "alice");
}

// ---------------------------------------------------------------------------
// Test: list_for_user returns most recently active first
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_for_user_orders_by_activity() {
    let store = MemoryChatStore::new();
    let with_bob = store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    let with_carol = store.find_or_create_conversation(&set("alice_carol")).await.unwrap();
    store.find_or_create_conversation(&set("bob_carol")).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.append_message(with_bob.id, &msg("bob", "ping")).await.unwrap();

    let listed = store.list_for_user("alice").await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![with_bob.id, with_carol.id]);
}

// ---------------------------------------------------------------------------
// Test: group creation validates name and always includes the admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_group_includes_admin_and_validates_name() {
    let store = MemoryChatStore::new();

    let group = store
        .create_group(&CreateGroup {
            name: "  Book club ".to_string(),
            admin: "alice".to_string(),
            participants: vec!["bob".into()],
        })
        .await
        .unwrap();
    assert_eq!(group.participants, vec!["alice".to_string(), "bob".to_string()]);
    assert_eq!(group.group_name.as_deref(), Some("Book club"));
    assert_eq!(group.group_admin.as_deref(), Some("alice"));
    assert!(group.is_group);
    assert!(group.direct_key.is_none());

    let invalid = store
        .create_group(&CreateGroup {
            name: " ".to_string(),
            admin: "alice".to_string(),
            participants: vec!["bob".into()],
        })
        .await;
    assert_matches!(invalid, Err(StoreError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Test: find_direct is None for group-sized sets and unknown pairs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_direct_returns_none_when_absent() {
    let store = MemoryChatStore::new();
    assert!(store.find_direct(&set("alice_bob")).await.unwrap().is_none());

    store.find_or_create_conversation(&set("alice_bob")).await.unwrap();
    assert!(store.find_direct(&set("bob_alice")).await.unwrap().is_some());
    assert!(store.find_direct(&set("alice_bob_carol")).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: ids containing separators never share a direct conversation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn separator_ids_resolve_to_distinct_pairs() {
    let store = MemoryChatStore::new();

    let left = store.find_or_create_conversation(&set("a:b_c")).await.unwrap();
    let right = store.find_or_create_conversation(&set("a_b:c")).await.unwrap();

    assert_ne!(left.id, right.id);
    assert_eq!(left.participants, vec!["a:b".to_string(), "c".to_string()]);
    assert_eq!(right.participants, vec!["a".to_string(), "b:c".to_string()]);
    assert_eq!(store.conversation_count().await, 2);
}
