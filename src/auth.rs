// ABOUTME: Identity provider client verifying bearer tokens against Supabase GoTrue
// ABOUTME: Every request re-verifies; verification results are never cached

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupabaseConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity provider rejected the token")]
    Rejected,
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Identity as reported by the provider for a verified token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    user_endpoint: String,
}

impl AuthClient {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.service_role_key)?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            user_endpoint: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
        })
    }

    /// Resolve a bearer token to the user it was issued for. Any provider
    /// failure, transport failure included, means the caller is not
    /// authenticated; there is no local fallback.
    pub async fn get_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(&self.user_endpoint)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected);
        }

        Ok(response.json().await?)
    }
}
