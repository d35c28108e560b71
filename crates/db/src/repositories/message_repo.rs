//! Repository for the `messages` table.

use mingle_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::{Message, NewMessage};

/// Column list for `messages` queries.
const COLUMNS: &str = "id, conversation_id, sender, content, is_read, created_at";

/// Provides append, listing and read-state updates for messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a message and move the conversation's `last_message_id` to it.
    ///
    /// Both writes run in one transaction, so a reader never sees a stored
    /// message the conversation does not point past. The conversation row is
    /// locked first; appends to one conversation are serialized and a missing
    /// conversation yields `RowNotFound` with nothing written.
    pub async fn append(
        pool: &PgPool,
        conversation_id: DbId,
        input: &NewMessage,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
                .bind(conversation_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(sqlx::Error::RowNotFound);
        }

        let insert = format!(
            "INSERT INTO messages (conversation_id, sender, content) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&insert)
            .bind(conversation_id)
            .bind(&input.sender)
            .bind(&input.content)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE conversations \
             SET last_message_id = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(message.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// List all messages of a conversation in creation order.
    pub async fn list_for_conversation(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(pool)
            .await
    }

    /// Mark every unread message not sent by `reader` as read.
    ///
    /// Returns the number of messages that changed.
    pub async fn mark_read(
        pool: &PgPool,
        conversation_id: DbId,
        reader: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages \
             SET is_read = true \
             WHERE conversation_id = $1 AND sender <> $2 AND is_read = false",
        )
        .bind(conversation_id)
        .bind(reader)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
