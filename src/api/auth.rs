//! Bearer tokens and request extractors.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use eko_core::{
    i18n::Localizer,
    language::locale_from_accept_language,
    models::{parse_id, User},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::debug;

use super::{error::ApiError, ApiState};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "_id")]
    id: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens carrying the user id.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// The `_id` claim of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims.id)
    }
}

/// Locale picked from `Accept-Language`; `"en"` unless French is asked for.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub &'static str);

impl RequestLocale {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let value = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Self(locale_from_accept_language(value))
    }
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// The account behind a valid bearer token. Deleted accounts still
/// authenticate; routes that need a live account call [`CurrentUser::require_active`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Locale from the stored language.
    pub fn locale(&self) -> &'static str {
        self.0.locale()
    }

    pub fn require_active(&self, l: &Localizer<'_>) -> Result<(), ApiError> {
        if self.0.is_deleted {
            return Err(ApiError::not_found(l.t("auth.login.user_not_found")));
        }
        Ok(())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let RequestLocale(locale) = RequestLocale::from_headers(&parts.headers);
        let l = state.catalog.localizer(locale);

        let token = bearer_token(&parts.headers).ok_or_else(|| ApiError::unauthorized(&l))?;
        let claimed = state.tokens.verify(token).map_err(|e| {
            debug!("rejected bearer token: {e}");
            ApiError::unauthorized(&l)
        })?;
        let id = parse_id(&claimed)
            .ok_or_else(|| ApiError::bad_request(l.t("general.invalid_user_id")))?;

        let user = state
            .store
            .find_user(&id)
            .await
            .map_err(|e| ApiError::internal(&l, e))?
            .ok_or_else(|| ApiError::unauthorized(&l))?;

        Ok(Self(user))
    }
}
