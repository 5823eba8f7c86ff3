//! Route handlers, grouped by resource.

pub mod auth;
pub mod chat;
pub mod message;
pub mod profile;

use axum::{extract::rejection::JsonRejection, Json};
use eko_core::{i18n::Localizer, models::User};
use serde_json::{json, Value};

use super::error::ApiError;

/// Unwrap a JSON body, turning a rejection into a 422.
pub(crate) fn parse_body<T>(
    body: Result<Json<T>, JsonRejection>,
    l: &Localizer<'_>,
) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(l, &rejection.body_text()))
}

/// A present, non-blank string field, trimmed.
pub(crate) fn required<'a>(
    value: Option<&'a str>,
    field: &str,
    l: &Localizer<'_>,
) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(l, &l.t_with("validation.required", &[("field", field)])))
}

/// A required email, trimmed and lowercased.
pub(crate) fn required_email(value: Option<&str>, l: &Localizer<'_>) -> Result<String, ApiError> {
    let email = required(value, "email", l)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation(l, &l.t("validation.invalid_email")));
    }
    Ok(email)
}

/// `local@domain.tld` with no whitespace and a dot inside the domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}

/// The user's wire form, with `token` added when one was issued.
pub(crate) fn user_json(user: &User, token: Option<&str>) -> Value {
    let mut value = json!(user);
    if let (Some(token), Value::Object(map)) = (token, &mut value) {
        map.insert("token".to_string(), json!(token));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@mail.example.co"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@example."));
        assert!(!is_valid_email("a da@example.com"));
        assert!(!is_valid_email("ada@ex@ample.com"));
    }
}
