//! Conversation paging, sending with a bot reply, edit and soft delete.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use eko_core::{
    i18n::Localizer,
    models::{parse_id, NewMessage, Sender},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{chat::chat_id, parse_body, required};
use crate::api::{
    auth::CurrentUser,
    error::{success, ApiError, ApiResult},
    ApiState,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    message: Option<String>,
    #[serde(default)]
    pictures: Vec<String>,
    #[serde(default)]
    voices: Vec<String>,
}

fn message_id(raw: &str, l: &Localizer<'_>) -> Result<String, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::bad_request(l.t("general.invalid_message_id")))
}

/// Validated `(page, limit)`.
fn page_params(query: PageQuery, l: &Localizer<'_>) -> Result<(i64, i64), ApiError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    // The row offset must fit in an i64.
    if page < 1 || (page - 1).checked_mul(MAX_LIMIT).is_none() {
        return Err(ApiError::validation(l, &l.t("validation.invalid_page")));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        let max = MAX_LIMIT.to_string();
        return Err(ApiError::validation(
            l,
            &l.t_with("validation.invalid_limit", &[("max", &max)]),
        ));
    }
    Ok((page, limit))
}

/// Ceiling division; zero messages means zero pages.
fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// `GET /message/chat/{chat_id}?page=&limit=`
pub async fn conversation(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(raw_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let id = chat_id(&raw_id, &l)?;
    current.require_active(&l)?;
    let Query(query) = query.map_err(|e| ApiError::validation(&l, &e.body_text()))?;
    let (page, limit) = page_params(query, &l)?;

    let chat = state
        .store
        .find_chat(&current.0.id, &id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("chat.not_found")))?;

    let result = state
        .store
        .conversation_page(&chat.id, page, limit)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    let pages = total_pages(result.total, limit);
    success(
        l.t("message.conversation.success"),
        json!({
            "messages": result.messages,
            "pagination": {
                "current_page": page,
                "total_pages": pages,
                "total_messages": result.total,
                "has_next": page < pages,
            },
        }),
    )
}

/// `POST /message/chat/{chat_id}`
///
/// Stores the user's message, asks the companion for a reply with the
/// recent history, and stores the reply when there is one.
pub async fn send(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(raw_id): Path<String>,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let id = chat_id(&raw_id, &l)?;
    current.require_active(&l)?;
    let request = parse_body(body, &l)?;
    let text = required(request.message.as_deref(), "message", &l)?.to_string();

    let chat = state
        .store
        .find_chat(&current.0.id, &id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("chat.not_found")))?;

    // History is read before the new message lands so it is not sent twice.
    let history = state
        .store
        .recent_messages(&chat.id, state.config.memory.max_context_messages as i64)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    let user_message = state
        .store
        .insert_message(&NewMessage {
            chat_id: chat.id.clone(),
            user_id: current.0.id.clone(),
            sender: Sender::User,
            text: text.clone(),
            pictures: request.pictures,
            voices: request.voices,
        })
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    let bot_message = match state
        .companion
        .reply(current.0.language(), &history, &text)
        .await
    {
        Some(reply) => {
            let stored = state
                .store
                .insert_message(&NewMessage {
                    chat_id: chat.id.clone(),
                    user_id: current.0.id.clone(),
                    sender: Sender::Bot,
                    text: reply,
                    pictures: Vec::new(),
                    voices: Vec::new(),
                })
                .await;
            match stored {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("bot reply for chat {} not stored: {e}", chat.id);
                    None
                }
            }
        }
        None => None,
    };

    let (last_at, added) = match &bot_message {
        Some(bot) => (bot.timestamp, 2),
        None => (user_message.timestamp, 1),
    };
    state
        .store
        .touch_chat(&chat.id, &last_at, added)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;
    debug!("chat {} received {added} message(s)", chat.id);

    let mut data = json!(user_message);
    if let (Some(bot), Some(map)) = (&bot_message, data.as_object_mut()) {
        map.insert("bot_response".to_string(), json!(bot));
    }
    success(l.t("message.send.success"), data)
}

/// `PUT /message/{message_id}`
pub async fn update(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(raw_id): Path<String>,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let id = message_id(&raw_id, &l)?;
    current.require_active(&l)?;
    let request = parse_body(body, &l)?;
    let text = required(request.message.as_deref(), "message", &l)?;

    let message = state
        .store
        .update_message(
            &current.0.id,
            &id,
            text,
            &request.pictures,
            &request.voices,
        )
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("message.not_found")))?;

    success(l.t("message.update.success"), json!(message))
}

/// `DELETE /message/{message_id}`
pub async fn delete_one(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let id = message_id(&raw_id, &l)?;
    current.require_active(&l)?;

    let message = state
        .store
        .soft_delete_message(&current.0.id, &id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("message.not_found")))?;

    success(
        l.t("message.delete.success"),
        json!({
            "deleted_message_id": message.id,
            "deletedAt": message.updated_at,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use eko_core::i18n::Catalog;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }

    #[test]
    fn test_page_params() {
        let catalog = Catalog::bundled("en").unwrap();
        let l = catalog.localizer("en");
        let q = |page, limit| PageQuery { page, limit };

        assert_eq!(page_params(q(None, None), &l).unwrap(), (1, 20));
        assert_eq!(page_params(q(Some(3), Some(100)), &l).unwrap(), (3, 100));
        assert!(page_params(q(Some(0), None), &l).is_err());
        assert!(page_params(q(Some(i64::MAX), None), &l).is_err());
        assert!(page_params(q(Some(i64::MAX / MAX_LIMIT), Some(MAX_LIMIT)), &l).is_ok());
        assert!(page_params(q(None, Some(0)), &l).is_err());

        let err = page_params(q(None, Some(101)), &l).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.message,
            "Validation error: limit: must be between 1 and 100"
        );
    }
}
