use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ProviderError, REQUEST_TIMEOUT};
use crate::retry::RetryPolicy;

/// Identité renvoyée par le fournisseur OAuth après échange du code.
#[derive(Debug, Clone)]
pub struct OAuthIdentity {
    pub provider_account_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Échange un authorization code contre l'identité de l'utilisateur.
    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, ProviderError>;
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    id: String,
    email: String,
    name: Option<String>,
}

/// Client OAuth générique: POST /token puis GET /userinfo.
pub struct HttpOAuthProvider {
    client: Client,
    retry: RetryPolicy,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpOAuthProvider {
    pub fn new(
        token_url: String,
        userinfo_url: String,
        client_id: String,
        client_secret: String,
        retry: RetryPolicy,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            retry,
            token_url,
            userinfo_url,
            client_id,
            client_secret,
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, ProviderError> {
        let payload = TokenExchangeRequest {
            grant_type: "authorization_code",
            code,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };

        let response = self
            .retry
            .run(
                || {
                    let request = self.client.post(&self.token_url).form(&payload);
                    async move { request.send().await.map_err(ProviderError::from) }
                },
                ProviderError::is_retryable,
            )
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
                detail: "token exchange rejected".to_string(),
            });
        }

        let body: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body.access_token)
    }
}

#[async_trait]
impl OAuthProvider for HttpOAuthProvider {
    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, ProviderError> {
        let access_token = self.fetch_access_token(code).await?;

        let response = self
            .retry
            .run(
                || {
                    let request = self
                        .client
                        .get(&self.userinfo_url)
                        .bearer_auth(&access_token);
                    async move { request.send().await.map_err(ProviderError::from) }
                },
                ProviderError::is_retryable,
            )
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
                detail: "userinfo rejected".to_string(),
            });
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(OAuthIdentity {
            provider_account_id: info.id,
            email: info.email,
            display_name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userinfo_payload_deserializes_with_optional_name() {
        let full: UserInfoResponse =
            serde_json::from_str(r#"{"id":"u_1","email":"a@b.com","name":"Alice"}"#).unwrap();
        assert_eq!(full.id, "u_1");
        assert_eq!(full.name.as_deref(), Some("Alice"));

        let bare: UserInfoResponse =
            serde_json::from_str(r#"{"id":"u_2","email":"b@c.com"}"#).unwrap();
        assert!(bare.name.is_none());
    }
}
