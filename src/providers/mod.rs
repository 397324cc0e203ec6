//! Collaborateurs tiers: OAuth, paiement, email transactionnel.
//! Seul leur contrat requête/réponse nous intéresse; chaque client HTTP
//! applique un timeout et la politique de retry partagée.

pub mod email;
pub mod oauth;
pub mod payment;

use std::time::Duration;

/// Timeout appliqué à chaque requête sortante
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request timed out: {0}")]
    Timeout(String),
    #[error("Provider returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Seuls les échecs de classe timeout/connexion sont réessayables.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Timeout(err.to_string())
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }
}
