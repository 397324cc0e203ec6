// src/handlers/auth.rs

use axum::extract::{Extension, State};
use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use std::sync::Arc;

use crate::auth::extractors::{AuthClaims, refresh_token_from_cookies};
use crate::auth::services::AuthService;
use crate::error::AppError;
use crate::rate_limit::{LoginRateLimiter, client_ip};
use savora_api::{
    ForgotPasswordRequest, LoginRequest, OAuthLoginRequest, PublicLoginResponse,
    RefreshTokenResponse, RegisterRequest, ResetPasswordRequest,
};

fn set_cookie_headers(cookie: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(cookie).map_err(|_| AppError::internal("Failed to set cookie"))?,
    );
    Ok(headers)
}

/// POST /auth/register
/// Inscription d'un nouveau client
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<savora_api::AccountResponse>), AppError> {
    let account = AuthService::register(payload)?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /auth/login
/// Connexion par email + mot de passe
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    Extension(limiter): Extension<LoginRateLimiter>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<PublicLoginResponse>), AppError> {
    // Clé IP + compte: un attaquant ne peut pas marteler un compte précis
    let key = format!("{}:{}", client_ip(&headers), payload.email.to_lowercase());
    limiter
        .0
        .check(&key)
        .map_err(|retry_after_secs| AppError::RateLimited { retry_after_secs })?;

    let response = auth_service.login(&payload)?;

    let out_headers = set_cookie_headers(&auth_service.refresh_cookie(&response.refresh_token))?;

    let public = PublicLoginResponse::from(response);
    Ok((StatusCode::OK, out_headers, Json(public)))
}

/// POST /auth/oauth
/// Connexion via le fournisseur OAuth (échange d'authorization code)
pub async fn oauth_login(
    State(auth_service): State<Arc<AuthService>>,
    Json(payload): Json<OAuthLoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<PublicLoginResponse>), AppError> {
    let response = auth_service.oauth_login(&payload.code).await?;

    let out_headers = set_cookie_headers(&auth_service.refresh_cookie(&response.refresh_token))?;

    let public = PublicLoginResponse::from(response);
    Ok((StatusCode::OK, out_headers, Json(public)))
}

/// POST /auth/refresh
/// Nouvel access token depuis le cookie refresh (rate-limité)
pub async fn refresh_token(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    let refresh_token = refresh_token_from_cookies(&headers)
        .ok_or_else(|| AppError::validation("Missing refresh_token cookie"))?;

    let response = auth_service.refresh(&refresh_token)?;
    Ok(Json(response))
}

/// POST /auth/logout
/// Révoque le refresh token présenté et expire le cookie
pub async fn logout(
    claims: AuthClaims,
    Extension(auth_service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap, Json<serde_json::Value>), AppError> {
    if let Some(refresh_token) = refresh_token_from_cookies(&headers) {
        auth_service.logout(claims.sub, &refresh_token)?;
    }

    let out_headers = set_cookie_headers(&auth_service.logout_cookie())?;

    Ok((
        StatusCode::OK,
        out_headers,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    ))
}

/// POST /auth/forgot-password
/// Envoie un code de réinitialisation. Répond 200 que le compte existe ou non.
pub async fn forgot_password(
    State(auth_service): State<Arc<AuthService>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    auth_service.forgot_password(&payload.email).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "If the account exists, a reset code has been sent"
        })),
    ))
}

/// POST /auth/reset-password
/// Consomme le code et remplace le mot de passe (transaction unique)
pub async fn reset_password(
    State(auth_service): State<Arc<AuthService>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    auth_service.reset_password(&payload.email, &payload.code, &payload.new_password)?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Password has been reset" })),
    ))
}
