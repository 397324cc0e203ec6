use axum::extract::Extension;
use axum::{Json, http::StatusCode};
use std::sync::Arc;

use crate::auth::extractors::EnterpriseClaims;
use crate::cache::{MemoryCache, enterprise_revenue_key};
use crate::config::Config;
use crate::db::models::food::NewFood;
use crate::db::repositories::food_repository::FoodRepository;
use crate::db::repositories::order_repository::OrderRepository;
use crate::error::AppError;
use crate::response::AppResponse;
use savora_api::{CreateFoodRequest, FoodResponse, RevenueResponse};

/// GET /enterprise/foods
/// Catalogue du restaurateur connecté
pub async fn list_my_foods(
    claims: EnterpriseClaims,
) -> Result<AppResponse<Vec<FoodResponse>>, AppError> {
    let foods: Vec<FoodResponse> = FoodRepository::list_for_enterprise(claims.0.sub)?
        .into_iter()
        .map(FoodResponse::from)
        .collect();

    Ok(AppResponse::ok(foods))
}

/// POST /enterprise/foods
/// Ajoute un plat au catalogue. Les résultats de recherche mémoïsés sont
/// effacés en bloc: toute requête pourrait désormais matcher ce plat.
pub async fn create_food(
    claims: EnterpriseClaims,
    Extension(cache): Extension<Arc<MemoryCache>>,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<(StatusCode, Json<FoodResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Food name must not be empty"));
    }
    if payload.price_cents <= 0 {
        return Err(AppError::validation("Price must be positive"));
    }

    let food = FoodRepository::create(&NewFood {
        enterprise_id: claims.0.sub,
        name: payload.name.trim().to_string(),
        description: payload.description,
        price_cents: payload.price_cents,
        image_url: payload.image_url,
        available: true,
    })?;

    cache.clear(None);

    Ok((StatusCode::CREATED, Json(FoodResponse::from(food))))
}

/// GET /enterprise/dashboard/revenue
/// Agrégat de revenus, mémoïsé par enterprise
pub async fn revenue_dashboard(
    claims: EnterpriseClaims,
    Extension(cache): Extension<Arc<MemoryCache>>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let enterprise_id = claims.0.sub;

    let key = enterprise_revenue_key(enterprise_id);
    if let Some(cached) = cache.get(&key) {
        return Ok(Json(cached));
    }

    let (order_count, total_cents) = OrderRepository::revenue_for_enterprise(enterprise_id)?;
    let response = RevenueResponse {
        enterprise_id,
        order_count,
        total_cents,
    };

    let value = serde_json::to_value(&response)?;
    cache.set(&key, value.clone(), config.revenue_cache_ttl);

    Ok(Json(value))
}
