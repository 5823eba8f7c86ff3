//! Chat sessions owned by a user.

use super::{format_ts, now, parse_ts, Store};
use chrono::{DateTime, Utc};
use eko_core::{
    error::EkoError,
    models::{new_id, Chat, ChatStatus},
};

const CHAT_COLUMNS: &str = "id, user_id, title, short_description, is_temporary, status, \
     created_at, updated_at, last_message_at, message_count, is_deleted";

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: String,
    user_id: String,
    title: String,
    short_description: String,
    is_temporary: bool,
    status: String,
    created_at: String,
    updated_at: String,
    last_message_at: String,
    message_count: i64,
    is_deleted: bool,
}

impl TryFrom<ChatRow> for Chat {
    type Error = EkoError;

    fn try_from(row: ChatRow) -> Result<Self, Self::Error> {
        let status = ChatStatus::parse(&row.status)
            .ok_or_else(|| EkoError::Memory(format!("unknown chat status '{}'", row.status)))?;
        Ok(Chat {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            short_description: row.short_description,
            is_temporary: row.is_temporary,
            status,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            last_message_at: parse_ts(&row.last_message_at)?,
            message_count: row.message_count,
            is_deleted: row.is_deleted,
        })
    }
}

impl Store {
    pub async fn create_chat(
        &self,
        user_id: &str,
        title: &str,
        short_description: &str,
        is_temporary: bool,
    ) -> Result<Chat, EkoError> {
        let id = new_id();
        let at = now()?;
        let ts = format_ts(&at);

        sqlx::query(
            "INSERT INTO chats (id, user_id, title, short_description, is_temporary, status, \
             created_at, updated_at, last_message_at, message_count, is_deleted) \
             VALUES (?, ?, ?, ?, ?, 'active', ?, ?, ?, 0, 0)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(short_description)
        .bind(is_temporary)
        .bind(&ts)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("insert chat failed: {e}")))?;

        Ok(Chat {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            short_description: short_description.to_string(),
            is_temporary,
            status: ChatStatus::Active,
            created_at: at,
            updated_at: at,
            last_message_at: at,
            message_count: 0,
            is_deleted: false,
        })
    }

    /// A non-deleted chat owned by `user_id`.
    pub async fn find_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<Chat>, EkoError> {
        let row: Option<ChatRow> = sqlx::query_as(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE id = ? AND user_id = ? AND is_deleted = 0"
        ))
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        row.map(Chat::try_from).transpose()
    }

    /// Non-deleted chats, most recently active first.
    pub async fn saved_chats(&self, user_id: &str, limit: i64) -> Result<Vec<Chat>, EkoError> {
        let rows: Vec<ChatRow> = sqlx::query_as(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE user_id = ? AND is_deleted = 0 \
             ORDER BY last_message_at DESC, rowid DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        rows.into_iter().map(Chat::try_from).collect()
    }

    /// Soft delete one chat. Returns the deletion time, or `None` when the
    /// chat is unknown, foreign or already deleted.
    pub async fn soft_delete_chat(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> Result<Option<DateTime<Utc>>, EkoError> {
        let at = now()?;
        let result = sqlx::query(
            "UPDATE chats SET is_deleted = 1, status = 'deleted', updated_at = ? \
             WHERE id = ? AND user_id = ? AND is_deleted = 0",
        )
        .bind(format_ts(&at))
        .bind(chat_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        Ok((result.rows_affected() > 0).then_some(at))
    }

    /// Soft delete every live chat of a user. Returns how many were deleted
    /// and when.
    pub async fn soft_delete_all_chats(
        &self,
        user_id: &str,
    ) -> Result<(u64, DateTime<Utc>), EkoError> {
        let at = now()?;
        let result = sqlx::query(
            "UPDATE chats SET is_deleted = 1, status = 'deleted', updated_at = ? \
             WHERE user_id = ? AND is_deleted = 0",
        )
        .bind(format_ts(&at))
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        Ok((result.rows_affected(), at))
    }

    /// Record activity: bump `last_message_at` and the message count.
    pub async fn touch_chat(
        &self,
        chat_id: &str,
        at: &DateTime<Utc>,
        added_messages: i64,
    ) -> Result<(), EkoError> {
        let ts = format_ts(at);
        sqlx::query(
            "UPDATE chats SET last_message_at = ?, updated_at = ?, \
             message_count = message_count + ? WHERE id = ?",
        )
        .bind(&ts)
        .bind(&ts)
        .bind(added_messages)
        .bind(chat_id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        Ok(())
    }
}
