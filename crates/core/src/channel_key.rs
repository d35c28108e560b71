//! Channel keys and participant sets.
//!
//! Clients address a conversation on the realtime channel with a composite
//! key made of participant ids joined by [`CHANNEL_KEY_SEPARATOR`]
//! (e.g. `"alice_bob"`). The key is a transport address only: storage
//! lookups go through the canonical [`ParticipantSet`] parsed out of it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::UserId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Separator between participant ids inside a channel key.
pub const CHANNEL_KEY_SEPARATOR: char = '_';

/// Separator between an id's byte length and the id in a canonical key.
pub const CANONICAL_LENGTH_SEPARATOR: char = ':';

/// Minimum number of distinct participants a conversation can have.
pub const MIN_PARTICIPANTS: usize = 2;

// ---------------------------------------------------------------------------
// ChannelKey
// ---------------------------------------------------------------------------

/// The `conversationId` string exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Wrap a raw key, rejecting empty or whitespace-only values.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::Validation(
                "conversationId must not be empty".into(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the key into its participant set.
    ///
    /// Empty segments are ignored and duplicates collapse, so `"bob_alice_"`
    /// and `"alice_bob"` resolve to the same set.
    pub fn participants(&self) -> Result<ParticipantSet, CoreError> {
        ParticipantSet::new(self.0.split(CHANNEL_KEY_SEPARATOR).map(str::to_string))
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ParticipantSet
// ---------------------------------------------------------------------------

/// Sorted, de-duplicated set of participant ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParticipantSet(Vec<UserId>);

impl ParticipantSet {
    /// Build a set from arbitrary ids. Needs at least [`MIN_PARTICIPANTS`]
    /// distinct non-empty ids.
    pub fn new<I>(ids: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut ids: Vec<UserId> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        ids.sort();
        ids.dedup();

        if ids.len() < MIN_PARTICIPANTS {
            return Err(CoreError::Validation(format!(
                "a conversation needs at least {MIN_PARTICIPANTS} distinct participants, got {}",
                ids.len()
            )));
        }
        Ok(Self(ids))
    }

    /// Exactly two participants: a one-to-one conversation.
    pub fn is_direct(&self) -> bool {
        self.0.len() == 2
    }

    /// Injective string encoding of the set.
    ///
    /// Each sorted id is written as `<byte length>:<id>`, so ids containing
    /// any character (separators included) never make two sets collide:
    /// `{"a:b", "c"}` is `3:a:b1:c` while `{"a", "b:c"}` is `1:a3:b:c`.
    pub fn canonical_key(&self) -> String {
        self.0.iter().fold(String::new(), |mut key, id| {
            key.push_str(&id.len().to_string());
            key.push(CANONICAL_LENGTH_SEPARATOR);
            key.push_str(id);
            key
        })
    }

    /// Canonical key for a direct conversation, `None` for groups.
    ///
    /// Stored in a unique column so two concurrent creators of the same pair
    /// cannot both succeed.
    pub fn direct_key(&self) -> Option<String> {
        self.is_direct().then(|| self.canonical_key())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.0.binary_search_by(|id| id.as_str().cmp(user_id)).is_ok()
    }

    /// True when every id of `self` is also in `other`.
    pub fn is_subset_of(&self, other: &[UserId]) -> bool {
        self.0.iter().all(|id| other.contains(id))
    }

    pub fn as_slice(&self) -> &[UserId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<UserId> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
