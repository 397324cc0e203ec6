use axum::{Json, extract::Path};
use uuid::Uuid;

use crate::auth::extractors::AuthClaims;
use crate::auth::services::AuthService;
use crate::error::AppError;
use crate::response::AppResponse;
use savora_api::{AccountResponse, ChangePasswordRequest, UpdateProfileRequest};

/// GET /accounts/me
/// Récupère le profil du compte courant
pub async fn get_current_account(
    claims: AuthClaims,
) -> Result<AppResponse<AccountResponse>, AppError> {
    let account = AuthService::get_current_account(claims.sub)?;
    Ok(AppResponse::ok(account))
}

/// PATCH /accounts/me
/// Met à jour le profil (pseudo, avatar)
pub async fn update_profile(
    claims: AuthClaims,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<AppResponse<AccountResponse>, AppError> {
    let account = AuthService::update_profile(claims.sub, payload)?;
    Ok(AppResponse::ok(account))
}

/// POST /accounts/{id}/change-password
/// Change le mot de passe du compte
pub async fn change_password(
    Path(account_id): Path<Uuid>,
    claims: AuthClaims,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<AppResponse<serde_json::Value>, AppError> {
    // Vérifier que l'utilisateur change son propre password
    if claims.sub != account_id {
        return Err(AppError::forbidden(
            "You can only change your own password",
        ));
    }

    AuthService::change_password(account_id, &payload.old_password, &payload.new_password)?;
    Ok(AppResponse::ok(serde_json::json!({
        "message": "Password changed successfully"
    })))
}
