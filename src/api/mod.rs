//! HTTP API: accounts, profiles, chats and messages.
//!
//! Every response uses the `{success, message, data}` envelope. Messages
//! are resolved from the locale catalog in the caller's language.

mod auth;
mod error;
mod handlers;


pub use auth::TokenIssuer;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use eko_core::{config::Config, i18n::Catalog, traits::IdentityProvider};
use eko_memory::Store;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::companion::Companion;
use auth::RequestLocale;
use error::{success, ApiResult};
use handlers::{auth as account, chat, message, profile};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<Catalog>,
    pub store: Store,
    pub identity: Arc<dyn IdentityProvider>,
    pub companion: Companion,
    pub tokens: TokenIssuer,
    pub config: Arc<Config>,
}

/// `GET /`
async fn root(State(state): State<ApiState>, RequestLocale(locale): RequestLocale) -> ApiResult {
    success(state.catalog.get(locale, "general.welcome"), Value::Null)
}

/// `GET /health`
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    let body_limit = state.config.api.max_body_bytes;
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/signup", post(account::signup))
        .route("/auth/login", post(account::login))
        .route("/auth/forgot-password", post(account::forgot_password))
        .route("/profile/change-name", put(profile::change_name))
        .route("/profile/change-image", put(profile::change_image))
        .route("/profile/delete", delete(profile::delete_account))
        .route("/profile/is-active", get(profile::is_active))
        .route("/profile/user", get(profile::user))
        .route("/profile/welcome1", get(profile::welcome_first))
        .route("/profile/welcome2", put(profile::welcome_second))
        .route("/profile/update-token", put(profile::update_token))
        .route("/profile/onboarding", put(profile::onboarding))
        .route("/profile/change-language", put(profile::change_language))
        .route("/profile/debug-name", get(profile::debug_name))
        .route("/chat/suggestions", get(chat::suggestions))
        .route("/chat/saved", get(chat::saved))
        .route("/chat/create", post(chat::create))
        .route("/chat/all", delete(chat::delete_all))
        .route("/chat/{chat_id}", delete(chat::delete_one))
        .route(
            "/message/chat/{chat_id}",
            get(message::conversation).post(message::send),
        )
        .route(
            "/message/{message_id}",
            put(message::update).delete(message::delete_one),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.api.host, state.config.api.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("API server failed to bind to {addr}: {e}"))?;

    info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
