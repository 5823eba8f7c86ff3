//! Chat messages: storage, paging and completion history.

use super::{format_ts, now, parse_ts, Store};
use eko_core::{
    error::EkoError,
    models::{new_id, ChatMessage, NewMessage, Sender},
};

const MESSAGE_COLUMNS: &str =
    "id, chat_id, user_id, sender, text, pictures, voices, timestamp, is_deleted, updated_at";

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    chat_id: String,
    user_id: String,
    sender: String,
    text: String,
    pictures: String,
    voices: String,
    timestamp: String,
    is_deleted: bool,
    updated_at: String,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = EkoError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let sender = Sender::parse(&row.sender)
            .ok_or_else(|| EkoError::Memory(format!("unknown sender '{}'", row.sender)))?;
        Ok(ChatMessage {
            id: row.id,
            chat_id: row.chat_id,
            user_id: row.user_id,
            sender,
            text: row.text,
            pictures: serde_json::from_str(&row.pictures)?,
            voices: serde_json::from_str(&row.voices)?,
            timestamp: parse_ts(&row.timestamp)?,
            is_deleted: row.is_deleted,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

/// One page of a conversation plus the total number of live messages.
#[derive(Debug, Clone)]
pub struct ConversationPage {
    pub messages: Vec<ChatMessage>,
    pub total: i64,
}

impl Store {
    pub async fn insert_message(&self, new: &NewMessage) -> Result<ChatMessage, EkoError> {
        let id = new_id();
        let at = now()?;
        let ts = format_ts(&at);

        sqlx::query(
            "INSERT INTO messages (id, chat_id, user_id, sender, text, pictures, voices, \
             timestamp, is_deleted, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(&new.chat_id)
        .bind(&new.user_id)
        .bind(new.sender.as_str())
        .bind(&new.text)
        .bind(serde_json::to_string(&new.pictures)?)
        .bind(serde_json::to_string(&new.voices)?)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("insert message failed: {e}")))?;

        Ok(ChatMessage {
            id,
            chat_id: new.chat_id.clone(),
            user_id: new.user_id.clone(),
            sender: new.sender,
            text: new.text.clone(),
            pictures: new.pictures.clone(),
            voices: new.voices.clone(),
            timestamp: at,
            is_deleted: false,
            updated_at: at,
        })
    }

    /// The last `limit` live messages of a chat, oldest first.
    pub async fn recent_messages(
        &self,
        chat_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, EkoError> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? AND is_deleted = 0 \
             ORDER BY timestamp DESC, rowid DESC LIMIT ?"
        ))
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        let mut messages = rows
            .into_iter()
            .map(ChatMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// A page of live messages, newest first. `page` starts at 1; a page
    /// whose offset overflows is past the end and comes back empty.
    pub async fn conversation_page(
        &self,
        chat_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<ConversationPage, EkoError> {
        let offset = (page.max(1) - 1)
            .checked_mul(limit)
            .unwrap_or(i64::MAX);
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? AND is_deleted = 0 \
             ORDER BY timestamp DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE chat_id = ? AND is_deleted = 0")
                .bind(chat_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| EkoError::Memory(format!("count failed: {e}")))?;

        let messages = rows
            .into_iter()
            .map(ChatMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConversationPage { messages, total })
    }

    /// A live message owned by `user_id`.
    pub async fn find_message(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>, EkoError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ? AND user_id = ? AND is_deleted = 0"
        ))
        .bind(message_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        row.map(ChatMessage::try_from).transpose()
    }

    /// Replace the content of a live message owned by `user_id`.
    pub async fn update_message(
        &self,
        user_id: &str,
        message_id: &str,
        text: &str,
        pictures: &[String],
        voices: &[String],
    ) -> Result<Option<ChatMessage>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query(
            "UPDATE messages SET text = ?, pictures = ?, voices = ?, updated_at = ? \
             WHERE id = ? AND user_id = ? AND is_deleted = 0",
        )
        .bind(text)
        .bind(serde_json::to_string(pictures)?)
        .bind(serde_json::to_string(voices)?)
        .bind(&at)
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_message(user_id, message_id).await
    }

    /// Soft delete a live message owned by `user_id`. Returns the updated
    /// record, or `None` when there was nothing to delete.
    pub async fn soft_delete_message(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>, EkoError> {
        let Some(mut message) = self.find_message(user_id, message_id).await? else {
            return Ok(None);
        };

        let at = now()?;
        let result = sqlx::query(
            "UPDATE messages SET is_deleted = 1, updated_at = ? \
             WHERE id = ? AND user_id = ? AND is_deleted = 0",
        )
        .bind(format_ts(&at))
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        message.is_deleted = true;
        message.updated_at = at;
        Ok(Some(message))
    }
}
