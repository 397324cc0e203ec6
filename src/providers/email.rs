use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{ProviderError, REQUEST_TIMEOUT};
use crate::retry::RetryPolicy;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ProviderError>;
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Email transactionnel via une API HTTP (codes de réinitialisation).
pub struct HttpEmailProvider {
    client: Client,
    retry: RetryPolicy,
    base_url: String,
    api_key: String,
    sender: String,
}

impl HttpEmailProvider {
    pub fn new(base_url: String, api_key: String, sender: String, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            retry,
            base_url,
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ProviderError> {
        let url = format!("{}/messages", self.base_url);
        let payload = MessageRequest {
            from: &self.sender,
            to,
            subject,
            text: body,
        };

        let response = self
            .retry
            .run(
                || {
                    let request = self
                        .client
                        .post(&url)
                        .bearer_auth(&self.api_key)
                        .json(&payload);
                    async move { request.send().await.map_err(ProviderError::from) }
                },
                ProviderError::is_retryable,
            )
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
                detail: "message rejected".to_string(),
            });
        }

        Ok(())
    }
}
