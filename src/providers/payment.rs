use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProviderError, REQUEST_TIMEOUT};
use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub charge_id: String,
    pub succeeded: bool,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Débite le montant d'une commande. Échec amont ≠ paiement refusé:
    /// un refus est un `ChargeOutcome { succeeded: false }`.
    async fn create_charge(
        &self,
        order_id: Uuid,
        amount_cents: i32,
        currency: &str,
    ) -> Result<ChargeOutcome, ProviderError>;
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    reference: Uuid,
    amount_cents: i32,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    charge_id: String,
    status: String,
}

pub struct HttpPaymentProvider {
    client: Client,
    retry: RetryPolicy,
    base_url: String,
    api_key: String,
}

impl HttpPaymentProvider {
    pub fn new(base_url: String, api_key: String, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            retry,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_charge(
        &self,
        order_id: Uuid,
        amount_cents: i32,
        currency: &str,
    ) -> Result<ChargeOutcome, ProviderError> {
        let url = format!("{}/charges", self.base_url);
        let payload = ChargeRequest {
            reference: order_id,
            amount_cents,
            currency,
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
                detail: "charge creation rejected".to_string(),
            });
        }

        let body: ChargeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ChargeOutcome {
            succeeded: body.status == "succeeded",
            charge_id: body.charge_id,
        })
    }
}
