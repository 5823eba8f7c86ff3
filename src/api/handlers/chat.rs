//! Chat routes: suggestions, saved list, create and soft delete.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use eko_core::{i18n::Localizer, models::parse_id};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::parse_body;
use crate::api::{
    auth::CurrentUser,
    error::{success, ApiError, ApiResult},
    ApiState,
};

/// Suggestion values, in display order.
const SUGGESTIONS: &[&str] = &[
    "coding_help",
    "mental_health",
    "general_chat",
    "learning_help",
    "problem_solving",
];

#[derive(Debug, Deserialize)]
pub struct CreateChat {
    title: Option<String>,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    is_temporary: bool,
}

pub(crate) fn chat_id(raw: &str, l: &Localizer<'_>) -> Result<String, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::bad_request(l.t("general.invalid_chat_id")))
}

/// `GET /chat/suggestions`
pub async fn suggestions(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    current.require_active(&l)?;

    let items: Vec<Value> = SUGGESTIONS
        .iter()
        .map(|value| {
            json!({
                "title": l.t(&format!("chat.suggestions.items.{value}")),
                "value": value,
            })
        })
        .collect();

    success(l.t("chat.suggestions.success"), Value::Array(items))
}

/// `GET /chat/saved`
pub async fn saved(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    current.require_active(&l)?;

    let chats = state
        .store
        .saved_chats(&current.0.id, state.config.memory.saved_chats_limit)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    let items: Vec<Value> = chats
        .iter()
        .map(|chat| {
            json!({
                "chat_id": chat.id,
                "title": chat.title,
                "short_description": chat.short_description,
            })
        })
        .collect();

    success(l.t("chat.saved.success"), Value::Array(items))
}

/// `POST /chat/create`
///
/// A blank or missing title is generated from the user's language.
pub async fn create(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<CreateChat>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    current.require_active(&l)?;
    let request = parse_body(body, &l)?;

    let title = match request.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            state
                .companion
                .chat_name(&state.catalog, current.0.language())
                .await
        }
    };

    let chat = state
        .store
        .create_chat(
            &current.0.id,
            &title,
            request.short_description.trim(),
            request.is_temporary,
        )
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    info!("chat {} created for {}", chat.id, current.0.id);
    success(l.t("chat.create.success"), json!(chat))
}

/// `DELETE /chat/all`
pub async fn delete_all(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    current.require_active(&l)?;

    let (count, at) = state
        .store
        .soft_delete_all_chats(&current.0.id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    info!("{count} chats deleted for {}", current.0.id);
    success(
        l.t("chat.delete_all.success"),
        json!({ "deletedCount": count, "deletedAt": at }),
    )
}

/// `DELETE /chat/{chat_id}`
pub async fn delete_one(
    State(state): State<ApiState>,
    current: CurrentUser,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let id = chat_id(&raw_id, &l)?;
    current.require_active(&l)?;

    let at = state
        .store
        .soft_delete_chat(&current.0.id, &id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("chat.not_found")))?;

    success(
        l.t("chat.delete.success"),
        json!({ "chatId": id, "deletedAt": at }),
    )
}
