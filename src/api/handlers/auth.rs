//! Email/password signup, login and password reset.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use eko_core::{
    error::IdentityError,
    i18n::Localizer,
    models::{NewUser, User, UserKind},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{parse_body, required, required_email, user_json};
use crate::api::{
    auth::RequestLocale,
    error::{success, ApiError, ApiResult},
    ApiState,
};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPassword {
    email: Option<String>,
}

/// Find a user allowed to log in with `email`.
async fn login_candidate(
    state: &ApiState,
    email: &str,
    l: &Localizer<'_>,
) -> Result<User, ApiError> {
    let user = state
        .store
        .find_user_by_email(email)
        .await
        .map_err(|e| ApiError::internal(l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    if user.is_deleted {
        return Err(ApiError::bad_request(l.t("auth.login.account_deleted")));
    }
    if user.kind == UserKind::Brand {
        return Err(ApiError::bad_request(l.t("auth.login.brand_account")));
    }
    Ok(user)
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<ApiState>,
    RequestLocale(locale): RequestLocale,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(locale);
    let request = parse_body(body, &l)?;
    let email = required_email(request.email.as_deref(), &l)?;
    let password = required(request.password.as_deref(), "password", &l)?;

    let existing = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal(&l, e))?;
    if existing.is_some() {
        return Err(ApiError::bad_request(l.t("auth.signup.email_exists")));
    }

    let account = state
        .identity
        .create_user(&email, password)
        .await
        .map_err(|e| match e {
            IdentityError::EmailExists => ApiError::bad_request(l.t("auth.signup.email_exists")),
            IdentityError::WeakPassword => ApiError::bad_request(l.t("auth.signup.weak_password")),
            other => {
                warn!("signup rejected by {}: {other}", state.identity.name());
                ApiError::bad_request(
                    l.t_with("auth.signup.failed", &[("reason", &other.to_string())]),
                )
            }
        })?;

    let user = state
        .store
        .create_user(&NewUser {
            uid: Some(account.uid),
            email,
            provider: "password".to_string(),
            image: state.config.auth.default_image.clone(),
            kind: UserKind::User,
        })
        .await
        .map_err(|e| ApiError::internal(&l, e))?;

    let token = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ApiError::internal(&l, e))?;

    info!("signup: created user {}", user.id);
    success(
        l.t("auth.signup.success"),
        json!({ "user": user_json(&user, Some(&token)) }),
    )
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<ApiState>,
    RequestLocale(locale): RequestLocale,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(locale);
    let request = parse_body(body, &l)?;
    let email = required_email(request.email.as_deref(), &l)?;
    let password = required(request.password.as_deref(), "password", &l)?;

    let user = login_candidate(&state, &email, &l).await?;

    state
        .identity
        .verify_password(&email, password)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidCredentials | IdentityError::UserNotFound => ApiError::new(
                StatusCode::UNAUTHORIZED,
                l.t("auth.login.invalid_credentials"),
            ),
            other => ApiError::internal(&l, other),
        })?;

    let token = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ApiError::internal(&l, e))?;

    info!("login: user {}", user.id);
    success(
        l.t("auth.login.success"),
        json!({ "user": user_json(&user, Some(&token)) }),
    )
}

/// `POST /auth/forgot-password`
pub async fn forgot_password(
    State(state): State<ApiState>,
    RequestLocale(locale): RequestLocale,
    body: Result<Json<ForgotPassword>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(locale);
    let request = parse_body(body, &l)?;
    let email = required_email(request.email.as_deref(), &l)?;

    login_candidate(&state, &email, &l).await?;

    let link = state
        .identity
        .send_password_reset(&email)
        .await
        .map_err(|e| {
            warn!("password reset failed for {email}: {e}");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                l.t("auth.forgot_password.failed"),
            )
        })?;

    success(
        l.t("auth.forgot_password.success"),
        json!({ "resetLink": link }),
    )
}
