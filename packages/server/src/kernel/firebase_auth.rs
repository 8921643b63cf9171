use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::BaseIdentityProvider;
use crate::domains::identity::{Identity, UserId};

pub const IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Anonymous sign-up through the Firebase Identity Toolkit REST API.
pub struct FirebaseAnonymousAuth {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    id_token: Option<String>,
}

impl FirebaseAnonymousAuth {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            base_url: IDENTITY_TOOLKIT_BASE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl BaseIdentityProvider for FirebaseAnonymousAuth {
    async fn sign_in_anonymously(&self) -> Result<Identity> {
        let response = self
            .client
            .post(format!("{}/accounts:signUp", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&SignUpRequest {
                return_secure_token: true,
            })
            .send()
            .await
            .context("Failed to send anonymous sign-up request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Identity Toolkit error {}: {}", status, body);
        }

        let sign_up: SignUpResponse = response
            .json()
            .await
            .context("Failed to parse sign-up response")?;

        debug!(user_id = %sign_up.local_id, "Anonymous account created");

        let identity = Identity::new(UserId::new(sign_up.local_id));
        Ok(match sign_up.id_token {
            Some(token) => identity.with_id_token(token),
            None => identity,
        })
    }
}

/// Mints a random local identity. Used when no Firebase key is configured.
pub struct LocalIdentityProvider;

#[async_trait]
impl BaseIdentityProvider for LocalIdentityProvider {
    async fn sign_in_anonymously(&self) -> Result<Identity> {
        Ok(Identity::new(UserId::new(format!("local-{}", Uuid::new_v4()))))
    }
}
