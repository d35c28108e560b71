//! Online-user tracking.
//!
//! Maps each announced user to the one connection that last announced it.
//! The table itself is plain data; the gateway owns it behind a mutex and
//! broadcasts every change while still holding that mutex.

use indexmap::IndexMap;
use mingle_core::types::UserId;

/// User id to connection id, in first-announcement order.
#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: IndexMap<UserId, String>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `user_id` as online through `conn_id` and return the online list.
    ///
    /// A second announcement for the same user replaces the stored connection
    /// but keeps the user's position in the list. A connection represents one
    /// user at a time: announcing a different user drops its previous entry.
    pub fn set_online(&mut self, user_id: UserId, conn_id: String) -> Vec<UserId> {
        self.entries
            .retain(|user, conn| *conn != conn_id || *user == user_id);
        self.entries.insert(user_id, conn_id);
        self.online_users()
    }

    /// Drop every entry owned by `conn_id` and return the online list.
    ///
    /// A connection that was superseded by a newer announcement of the same
    /// user owns no entry, so its disconnect leaves the user online.
    pub fn remove_by_connection(&mut self, conn_id: &str) -> Vec<UserId> {
        self.entries.retain(|_, conn| conn.as_str() != conn_id);
        self.online_users()
    }

    pub fn online_users(&self) -> Vec<UserId> {
        self.entries.keys().cloned().collect()
    }

    pub fn connection_for(&self, user_id: &str) -> Option<&str> {
        self.entries.get(user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
