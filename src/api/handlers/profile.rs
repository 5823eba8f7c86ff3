//! Profile routes for the authenticated user.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use eko_core::{
    language::{Language, LanguageRequest},
    models::Onboarding,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::{parse_body, required, user_json};
use crate::api::{
    auth::CurrentUser,
    error::{success, ApiError, ApiResult},
    ApiState,
};

const MIN_AGE: i64 = 13;
const MAX_AGE: i64 = 120;

#[derive(Debug, Deserialize)]
pub struct ChangeName {
    #[serde(rename = "newName")]
    new_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeImage {
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateToken {
    #[serde(rename = "notificationToken")]
    notification_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    name: Option<String>,
    age: Option<i64>,
    gender: Option<String>,
    language: Option<String>,
    purpose: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeLanguage {
    language: Option<String>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `PUT /profile/change-name`
pub async fn change_name(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<ChangeName>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let request = parse_body(body, &l)?;
    let name = request.new_name.as_deref().map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(ApiError::bad_request(l.t("profile.change_name.empty")));
    }
    if name == current.0.name {
        return Err(ApiError::bad_request(l.t("profile.change_name.same")));
    }

    if let Some(uid) = &current.0.uid {
        if let Err(e) = state.identity.update_display_name(uid, name).await {
            error!("display name update failed for {uid}: {e}");
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                l.t("profile.change_name.provider_failed"),
            ));
        }
    }

    let user = state
        .store
        .update_user_name(&current.0.id, name)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    success(
        l.t("profile.change_name.success"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `PUT /profile/change-image`
pub async fn change_image(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<ChangeImage>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let request = parse_body(body, &l)?;
    let image = request.image_url.as_deref().map(str::trim).unwrap_or_default();
    if image.is_empty() {
        return Err(ApiError::bad_request(l.t("profile.change_image.empty")));
    }

    let user = state
        .store
        .update_user_image(&current.0.id, image)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    success(
        l.t("profile.change_image.success"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `DELETE /profile/delete`
///
/// Soft-deletes the stored account, then removes the identity-provider
/// account on a best-effort basis.
pub async fn delete_account(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let user = current.0;

    if user.is_deleted {
        return Err(ApiError::bad_request(l.t("profile.delete.already_deleted")));
    }

    let deleted = state
        .store
        .soft_delete_user(&user.id, &state.config.auth.default_image)
        .await
        .map_err(|e| {
            error!("soft delete failed for {}: {e}", user.id);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                l.t("profile.delete.failed"),
            )
        })?;
    if !deleted {
        return Err(ApiError::bad_request(l.t("profile.delete.already_deleted")));
    }

    if let Some(uid) = &user.uid {
        match state.identity.delete_user(uid).await {
            Ok(()) => info!("deleted identity account {uid}"),
            Err(e) => warn!("identity account {uid} not deleted: {e}"),
        }
    }

    info!("user {} soft-deleted", user.id);
    success(
        l.t("profile.delete.success"),
        json!({ "note": l.t("profile.delete.note") }),
    )
}

/// `GET /profile/is-active`
pub async fn is_active(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    success(
        l.t("profile.status.success"),
        json!({ "status": current.0.status.as_str() }),
    )
}

/// `GET /profile/user`
pub async fn user(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    success(
        l.t("profile.user.success"),
        json!({ "user": user_json(&current.0, None) }),
    )
}

/// `GET /profile/welcome1`
pub async fn welcome_first(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    success(l.t("profile.welcome.first"), Value::Null)
}

/// `PUT /profile/welcome2`
pub async fn welcome_second(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let user = state
        .store
        .finish_welcome(&current.0.id)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    success(
        l.t("profile.welcome.second"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `PUT /profile/update-token`
pub async fn update_token(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<UpdateToken>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let request = parse_body(body, &l)?;
    // An empty token clears the registration.
    let token = request.notification_token.ok_or_else(|| {
        ApiError::validation(
            &l,
            &l.t_with("validation.required", &[("field", "notificationToken")]),
        )
    })?;

    let user = state
        .store
        .update_notification_token(&current.0.id, token.trim())
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    success(
        l.t("profile.update_token.success"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `PUT /profile/onboarding`
pub async fn onboarding(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<OnboardingRequest>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let request = parse_body(body, &l)?;

    let name = required(request.name.as_deref(), "name", &l)?.to_string();
    let age = request.age.ok_or_else(|| {
        ApiError::validation(&l, &l.t_with("validation.required", &[("field", "age")]))
    })?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        let (min, max) = (MIN_AGE.to_string(), MAX_AGE.to_string());
        return Err(ApiError::validation(
            &l,
            &l.t_with("validation.invalid_age", &[("min", &min), ("max", &max)]),
        ));
    }
    let language = required(request.language.as_deref(), "language", &l)?;
    let language: Language = LanguageRequest::parse(language)
        .ok_or_else(|| ApiError::validation(&l, &l.t("validation.invalid_language")))?
        .into();

    let answers = Onboarding {
        name,
        age,
        gender: optional_text(request.gender),
        language,
        purpose: optional_text(request.purpose),
    };

    let user = state
        .store
        .complete_onboarding(&current.0.id, &answers)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    let l = state.catalog.localizer(user.locale());
    success(
        l.t("profile.onboarding.success"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `PUT /profile/change-language`
///
/// The confirmation is already in the new language.
pub async fn change_language(
    State(state): State<ApiState>,
    current: CurrentUser,
    body: Result<Json<ChangeLanguage>, JsonRejection>,
) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let request = parse_body(body, &l)?;
    let language = required(request.language.as_deref(), "language", &l)?;
    let language: Language = LanguageRequest::parse(language)
        .ok_or_else(|| ApiError::validation(&l, &l.t("validation.invalid_language")))?
        .into();

    let user = state
        .store
        .update_language(&current.0.id, language)
        .await
        .map_err(|e| ApiError::internal(&l, e))?
        .ok_or_else(|| ApiError::not_found(l.t("auth.login.user_not_found")))?;

    let l = state.catalog.localizer(language.locale_code());
    success(
        l.t("profile.change_language.success"),
        json!({ "user": user_json(&user, None) }),
    )
}

/// `GET /profile/debug-name`
pub async fn debug_name(State(state): State<ApiState>, current: CurrentUser) -> ApiResult {
    let l = state.catalog.localizer(current.locale());
    let user = &current.0;

    let display_name = match &user.uid {
        Some(uid) => match state.identity.display_name(uid).await {
            Ok(name) => name,
            Err(e) => {
                warn!("display name lookup failed for {uid}: {e}");
                None
            }
        },
        None => None,
    };

    success(
        l.t("profile.debug_name.success"),
        json!({
            "store": {
                "uid": user.uid,
                "name": user.name,
                "email": user.email,
            },
            "identity": {
                "uid": user.uid,
                "display_name": display_name,
            },
        }),
    )
}
