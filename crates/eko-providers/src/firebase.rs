//! Firebase Identity Toolkit client.
//!
//! Signup, sign-in and password reset use the public endpoints with the web
//! API key. Display-name updates, lookups and deletes go through the
//! project-scoped admin endpoints with a bearer access token.

use async_trait::async_trait;
use eko_core::{
    config::FirebaseConfig,
    error::{EkoError, IdentityError},
    traits::{IdentityAccount, IdentityProvider},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Identity provider backed by Firebase Authentication.
pub struct FirebaseIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    project_id: String,
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    display_name: Option<String>,
}

impl From<AccountResponse> for IdentityAccount {
    fn from(value: AccountResponse) -> Self {
        Self {
            uid: value.local_id,
            email: value.email,
            display_name: value.display_name.filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobResponse {
    oob_link: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

impl FirebaseIdentity {
    pub fn from_config(config: &FirebaseConfig) -> Result<Self, EkoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EkoError::Provider(format!("firebase: failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            project_id: config.project_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn has_admin_access(&self) -> bool {
        !self.project_id.is_empty() && !self.access_token.is_empty()
    }

    /// POST to a public endpoint authenticated by the API key.
    async fn post_public<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, IdentityError> {
        if self.api_key.is_empty() {
            return Err(IdentityError::NotConfigured);
        }
        let url = format!("{}/v1/accounts:{method}", self.base_url);
        debug!("firebase: POST accounts:{method}");
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Other(format!("firebase request failed: {e}")))?;
        Self::parse(resp).await
    }

    /// POST to a project-scoped admin endpoint.
    async fn post_admin<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, IdentityError> {
        if !self.has_admin_access() {
            return Err(IdentityError::NotConfigured);
        }
        let url = format!(
            "{}/v1/projects/{}/accounts:{method}",
            self.base_url, self.project_id
        );
        debug!("firebase: POST projects/{}/accounts:{method}", self.project_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Other(format!("firebase request failed: {e}")))?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, IdentityError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| IdentityError::Other(format!("firebase: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => IdentityError::from_code(&envelope.error.message),
                Err(_) => IdentityError::Other(format!("firebase returned {status}: {text}")),
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| IdentityError::Other(format!("firebase: failed to parse response: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityAccount, IdentityError> {
        let account: AccountResponse = self
            .post_public(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        info!("firebase: created account {}", account.local_id);
        Ok(account.into())
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityAccount, IdentityError> {
        let account: AccountResponse = self
            .post_public(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.into())
    }

    async fn send_password_reset(&self, email: &str) -> Result<Option<String>, IdentityError> {
        // With admin access the link comes back instead of being emailed.
        if self.has_admin_access() {
            let resp: OobResponse = self
                .post_admin(
                    "sendOobCode",
                    &json!({
                        "requestType": "PASSWORD_RESET",
                        "email": email,
                        "returnOobLink": true,
                    }),
                )
                .await?;
            return Ok(resp.oob_link);
        }

        let _: serde_json::Value = self
            .post_public(
                "sendOobCode",
                &json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(None)
    }

    async fn update_display_name(&self, uid: &str, name: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post_admin("update", &json!({ "localId": uid, "displayName": name }))
            .await?;
        info!("firebase: display name updated for {uid}");
        Ok(())
    }

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post_admin("delete", &json!({ "localId": uid }))
            .await?;
        info!("firebase: deleted account {uid}");
        Ok(())
    }

    async fn display_name(&self, uid: &str) -> Result<Option<String>, IdentityError> {
        let resp: LookupResponse = self
            .post_admin("lookup", &json!({ "localId": [uid] }))
            .await?;
        let account = resp
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::UserNotFound)?;
        Ok(IdentityAccount::from(account).display_name)
    }
}
