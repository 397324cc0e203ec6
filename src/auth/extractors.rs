use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::auth::jwt::{Claims, JwtManager};
use crate::auth::role::Role;
use crate::error::AppError;

/// Nom du cookie httpOnly transportant le refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Extracteur d'authentification pour les routes protégées.
/// Valide `Authorization: Bearer <JWT>`, vérifie le token via `JwtManager`,
/// et expose les claims utiles (`sub`, `role`).
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub sub: uuid::Uuid,
    pub role: Role,
    #[allow(dead_code)]
    pub iat: i64,
    #[allow(dead_code)]
    pub exp: i64,
}

impl From<Claims> for AuthClaims {
    fn from(c: Claims) -> Self {
        Self {
            sub: c.sub,
            role: c.role,
            iat: c.iat,
            exp: c.exp,
        }
    }
}

/// Implémentation de l'extracteur pour un router ayant `JwtManager` comme state.
impl FromRequestParts<JwtManager> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        jwt_manager: &JwtManager,
    ) -> Result<Self, Self::Rejection> {
        // Récupère le header Authorization
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::InvalidTokenFormat)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidTokenFormat)?;

        // Doit être de type Bearer
        const BEARER: &str = "Bearer ";
        if !auth_str.starts_with(BEARER) {
            return Err(AppError::InvalidTokenFormat);
        }

        let token = &auth_str[BEARER.len()..];

        // Vérifie et décode le token: 401, jamais de panique
        let claims = jwt_manager
            .verify_token(token)
            .map_err(AppError::from)?;

        Ok(AuthClaims::from(claims))
    }
}

/// Identité + rôle Admin. Échec d'identité → 401, mauvais rôle → 403:
/// la distinction est contractuelle.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub AuthClaims);

impl FromRequestParts<JwtManager> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        jwt_manager: &JwtManager,
    ) -> Result<Self, Self::Rejection> {
        let claims = AuthClaims::from_request_parts(parts, jwt_manager).await?;

        match claims.role {
            Role::Admin => Ok(Self(claims)),
            Role::Customer | Role::Enterprise => {
                Err(AppError::forbidden("Admin role required"))
            }
        }
    }
}

/// Identité + rôle Enterprise (tableau de bord restaurateur)
#[derive(Debug, Clone)]
pub struct EnterpriseClaims(pub AuthClaims);

impl FromRequestParts<JwtManager> for EnterpriseClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        jwt_manager: &JwtManager,
    ) -> Result<Self, Self::Rejection> {
        let claims = AuthClaims::from_request_parts(parts, jwt_manager).await?;

        match claims.role {
            Role::Enterprise => Ok(Self(claims)),
            Role::Customer | Role::Admin => {
                Err(AppError::forbidden("Enterprise role required"))
            }
        }
    }
}

// === Cookie helpers ===

/// Construit le Set-Cookie du refresh token. Max-Age = durée de vie du token:
/// le cookie n'est servi que sur /auth et ne survit jamais au token.
pub fn build_refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/auth; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookie d'expiration immédiate (logout)
pub fn clear_refresh_cookie(secure: bool) -> String {
    build_refresh_cookie("", 0, secure)
}

/// Extrait le refresh token du header Cookie, s'il est présent
pub fn refresh_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    let raw_cookie = headers.get(header::COOKIE)?.to_str().ok()?;

    raw_cookie.split(';').find_map(|kv| {
        let mut it = kv.trim().splitn(2, '=');
        match (it.next(), it.next()) {
            (Some(REFRESH_COOKIE), Some(v)) if !v.trim().is_empty() => {
                Some(v.trim().to_string())
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn refresh_cookie_is_http_only_lax_and_scoped_to_auth() {
        let cookie = build_refresh_cookie("tok_123", 1_209_600, false);

        assert!(cookie.starts_with("refresh_token=tok_123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/auth"));
        assert!(cookie.contains("Max-Age=1209600"));
        assert!(!cookie.contains("Secure"), "Secure only in production");
    }

    #[test]
    fn refresh_cookie_is_secure_in_production() {
        let cookie = build_refresh_cookie("tok_123", 60, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(false);
        assert!(cookie.contains("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn refresh_token_is_parsed_out_of_the_cookie_jar() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=tok_456; lang=fr"),
        );

        assert_eq!(
            refresh_token_from_cookies(&headers).as_deref(),
            Some("tok_456")
        );
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        assert!(refresh_token_from_cookies(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("refresh_token=; theme=dark"),
        );
        assert!(refresh_token_from_cookies(&headers).is_none());
    }
}
