//! Response envelope and the error type every handler returns.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use eko_core::i18n::Localizer;
use serde_json::{json, Value};
use std::fmt::Display;
use tracing::error;

/// Result type of all handlers.
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Successful envelope.
pub fn success(message: String, data: Value) -> ApiResult {
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": data,
    })))
}

/// A failed request, rendered as `{"success": false, "message": ..., "data": null}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(l: &Localizer<'_>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, l.t("general.unauthorized"))
    }

    /// 422 with the localized validation message.
    pub fn validation(l: &Localizer<'_>, details: &str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            l.t_with("general.validation_error", &[("details", details)]),
        )
    }

    /// 500 with the localized generic message; the cause is only logged.
    pub fn internal(l: &Localizer<'_>, cause: impl Display) -> Self {
        error!("request failed: {cause}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            l.t("general.internal_error"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
            "data": Value::Null,
        }));
        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
