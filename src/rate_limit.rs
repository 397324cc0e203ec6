//! Limitation de débit par fenêtre glissante, par clé (IP, ou IP + compte).
//! Chaque endpoint sensible a son propre limiteur avec sa propre fenêtre.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Compteur à fenêtre glissante: horodatages conservés par clé, élagués à
/// chaque passage. Le (N+1)-ième appel dans la fenêtre est rejeté avec le
/// délai avant que le plus ancien appel ne sorte de la fenêtre.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, Vec<Instant>>,
    config: RateLimitConfig,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Ok si l'appel passe, Err(secondes avant réessai) sinon.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut timestamps = self.windows.entry(key.to_string()).or_default();

        timestamps.retain(|t| now.duration_since(*t) < self.config.window);

        if timestamps.len() >= self.config.max_requests {
            let oldest = timestamps.first().copied().unwrap_or(now);
            let retry_after = self
                .config
                .window
                .saturating_sub(now.duration_since(oldest));
            return Err(retry_after.as_secs().max(1));
        }

        timestamps.push(now);
        Ok(())
    }

    /// Purge les clés dont la fenêtre est entièrement écoulée.
    #[expect(dead_code, reason = "Planned for a periodic sweep task")]
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.windows
            .retain(|_, timestamps| timestamps.iter().any(|t| now.duration_since(*t) < window));
    }
}

/// Limiteur du login, injecté en Extension. Le newtype évite toute collision
/// avec le limiteur du refresh qui partage le même type sous-jacent.
#[derive(Clone)]
pub struct LoginRateLimiter(pub Arc<SlidingWindowLimiter>);

/// Adresse du client, derrière un éventuel reverse proxy.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
        .map_or_else(|| "unknown".to_string(), |ip| ip.trim().to_string())
}

/// Middleware axum: rejette en 429 + Retry-After au-delà du seuil.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!(
        "{}:{}",
        client_ip(request.headers()),
        request.uri().path()
    );

    limiter
        .check(&key)
        .map_err(|retry_after_secs| AppError::RateLimited { retry_after_secs })?;

    Ok(next.run(request).await)
}
