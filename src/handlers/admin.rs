use axum::extract::{Extension, Path};
use axum::{Json, http::StatusCode};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::extractors::AdminClaims;
use crate::auth::services::AuthService;
use crate::cache::{MemoryCache, approved_vouchers_key};
use crate::db::models::voucher::NewVoucher;
use crate::db::repositories::account_repository::AccountRepository;
use crate::db::repositories::voucher_repository::VoucherRepository;
use crate::error::AppError;
use crate::response::AppResponse;
use savora_api::{AccountResponse, CreateVoucherRequest, VoucherResponse};

const ACCOUNT_PAGE_SIZE: i64 = 100;

/// GET /admin/accounts
/// Liste des comptes (back-office)
pub async fn list_accounts(
    _claims: AdminClaims,
) -> Result<AppResponse<Vec<AccountResponse>>, AppError> {
    let accounts: Vec<AccountResponse> = AccountRepository::list(ACCOUNT_PAGE_SIZE)?
        .into_iter()
        .map(AccountResponse::from)
        .collect();

    Ok(AppResponse::ok(accounts))
}

/// POST /admin/accounts/{id}/lock
/// Verrouille un compte et révoque toutes ses sessions
pub async fn lock_account(
    Path(account_id): Path<Uuid>,
    claims: AdminClaims,
    Extension(service): Extension<Arc<AuthService>>,
) -> Result<AppResponse<AccountResponse>, AppError> {
    let account = service.lock_account(account_id)?;
    tracing::info!("Account {account_id} locked by admin {}", claims.0.sub);
    Ok(AppResponse::ok(account))
}

/// POST /admin/accounts/{id}/unlock
pub async fn unlock_account(
    Path(account_id): Path<Uuid>,
    claims: AdminClaims,
) -> Result<AppResponse<AccountResponse>, AppError> {
    let account = AuthService::unlock_account(account_id)?;
    tracing::info!("Account {account_id} unlocked by admin {}", claims.0.sub);
    Ok(AppResponse::ok(account))
}

/// POST /admin/vouchers
/// Crée un bon, non approuvé tant qu'un admin ne l'a pas validé
pub async fn create_voucher(
    _claims: AdminClaims,
    Json(payload): Json<CreateVoucherRequest>,
) -> Result<(StatusCode, Json<VoucherResponse>), AppError> {
    if payload.code.trim().is_empty() {
        return Err(AppError::validation("Voucher code must not be empty"));
    }
    if !(1..=100).contains(&payload.discount_percent) {
        return Err(AppError::validation(
            "Discount must be between 1 and 100 percent",
        ));
    }

    let voucher = VoucherRepository::create(&NewVoucher {
        code: payload.code.trim().to_string(),
        discount_percent: payload.discount_percent,
        approved: false,
    })?;

    Ok((StatusCode::CREATED, Json(VoucherResponse::from(voucher))))
}

/// GET /admin/vouchers/pending
pub async fn list_pending_vouchers(
    _claims: AdminClaims,
) -> Result<AppResponse<Vec<VoucherResponse>>, AppError> {
    let vouchers: Vec<VoucherResponse> = VoucherRepository::list_pending()?
        .into_iter()
        .map(VoucherResponse::from)
        .collect();

    Ok(AppResponse::ok(vouchers))
}

/// POST /admin/vouchers/{id}/approve
/// Approuve un bon et efface l'entrée de cache de la liste publique
pub async fn approve_voucher(
    Path(voucher_id): Path<Uuid>,
    claims: AdminClaims,
    Extension(cache): Extension<Arc<MemoryCache>>,
) -> Result<AppResponse<VoucherResponse>, AppError> {
    let voucher = VoucherRepository::find_by_id(voucher_id)?
        .ok_or_else(|| AppError::not_found("Voucher not found"))?;

    let approved = VoucherRepository::approve(voucher.id)?;
    tracing::info!("Voucher {voucher_id} approved by admin {}", claims.0.sub);

    // Invalidation explicite: la liste publique est reconstruite au prochain GET
    cache.clear(Some(&approved_vouchers_key()));

    Ok(AppResponse::ok(VoucherResponse::from(approved)))
}
