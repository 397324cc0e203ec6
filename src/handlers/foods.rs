use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::cache::{MemoryCache, food_search_key};
use crate::config::Config;
use crate::db::repositories::food_repository::FoodRepository;
use crate::error::AppError;
use savora_api::{FoodResponse, FoodSearchResponse};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct FoodSearchParams {
    q: Option<String>,
    limit: Option<i64>,
}

/// GET /foods/search?q=&limit=
/// Recherche dans le catalogue, mémoïsée par (requête, limite)
pub async fn search_foods(
    Extension(cache): Extension<Arc<MemoryCache>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<FoodSearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::validation("Missing search query"));
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let key = food_search_key(query, limit);
    if let Some(cached) = cache.get(&key) {
        return Ok(Json(cached));
    }

    let foods = FoodRepository::search(query, limit)?;
    let response = FoodSearchResponse {
        query: query.to_string(),
        results: foods.into_iter().map(FoodResponse::from).collect(),
    };

    let value = serde_json::to_value(&response)?;
    cache.set(&key, value.clone(), config.search_cache_ttl);

    Ok(Json(value))
}
