//! Repository for the `conversations` table.

use mingle_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::conversation::Conversation;

/// Column list for `conversations` queries.
const COLUMNS: &str = "id, participants, direct_key, is_group, group_name, group_admin, \
                       last_message_id, created_at, updated_at";

/// Provides lookup and creation for conversations.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Find a conversation by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the direct conversation identified by a canonical pair key.
    pub async fn find_direct(
        pool: &PgPool,
        direct_key: &str,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE direct_key = $1 AND is_group = false"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(direct_key)
            .fetch_optional(pool)
            .await
    }

    /// Find the oldest conversation whose participants include all of `participants`.
    ///
    /// Uses the `@>` array containment operator backed by the GIN index.
    pub async fn find_containing(
        pool: &PgPool,
        participants: &[UserId],
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE participants @> $1::text[] \
             ORDER BY id ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(participants)
            .fetch_optional(pool)
            .await
    }

    /// Create the direct conversation for a pair, or return the existing one.
    ///
    /// `ON CONFLICT (direct_key) DO NOTHING` makes concurrent creators of the
    /// same pair converge on a single row.
    pub async fn find_or_create_direct(
        pool: &PgPool,
        participants: &[UserId],
        direct_key: &str,
    ) -> Result<Conversation, sqlx::Error> {
        let insert = format!(
            "INSERT INTO conversations (participants, direct_key, is_group) \
             VALUES ($1, $2, false) \
             ON CONFLICT (direct_key) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Conversation>(&insert)
            .bind(participants)
            .bind(direct_key)
            .fetch_optional(pool)
            .await?;

        match created {
            Some(conversation) => Ok(conversation),
            None => Self::find_direct(pool, direct_key)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Insert a group conversation, returning the created row.
    pub async fn create_group(
        pool: &PgPool,
        participants: &[UserId],
        name: Option<&str>,
        admin: Option<&str>,
    ) -> Result<Conversation, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversations (participants, is_group, group_name, group_admin) \
             VALUES ($1, true, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(participants)
            .bind(name)
            .bind(admin)
            .fetch_one(pool)
            .await
    }

    /// List conversations a user participates in, most recently active first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE $1 = ANY(participants) \
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Ordered message ids of a conversation.
    pub async fn message_ids(pool: &PgPool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }
}
