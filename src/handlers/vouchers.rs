use axum::Json;
use axum::extract::Extension;
use std::sync::Arc;

use crate::cache::{MemoryCache, approved_vouchers_key};
use crate::config::Config;
use crate::db::repositories::voucher_repository::VoucherRepository;
use crate::error::AppError;
use savora_api::VoucherResponse;

/// GET /vouchers
/// Liste publique des bons approuvés. L'entrée de cache est effacée en bloc
/// quand un admin approuve un bon (voir handlers/admin.rs).
pub async fn list_approved_vouchers(
    Extension(cache): Extension<Arc<MemoryCache>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = approved_vouchers_key();
    if let Some(cached) = cache.get(&key) {
        return Ok(Json(cached));
    }

    let vouchers: Vec<VoucherResponse> = VoucherRepository::list_approved()?
        .into_iter()
        .map(VoucherResponse::from)
        .collect();

    let value = serde_json::to_value(&vouchers)?;
    cache.set(&key, value.clone(), config.voucher_cache_ttl);

    Ok(Json(value))
}
