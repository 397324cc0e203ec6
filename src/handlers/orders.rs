use axum::extract::Extension;
use axum::{Json, http::StatusCode};
use std::sync::Arc;

use crate::auth::extractors::AuthClaims;
use crate::cache::{MemoryCache, enterprise_revenue_key};
use crate::db::models::order::{NewOrder, OrderStatus};
use crate::db::repositories::food_repository::FoodRepository;
use crate::db::repositories::order_repository::OrderRepository;
use crate::db::repositories::voucher_repository::VoucherRepository;
use crate::error::AppError;
use crate::providers::payment::PaymentProvider;
use crate::response::AppResponse;
use savora_api::{CheckoutRequest, OrderResponse};

const CURRENCY: &str = "EUR";

/// POST /orders/checkout
/// Crée la commande puis débite via le fournisseur de paiement.
/// L'issue du paiement est persistée sur la commande (Paid/Failed).
pub async fn checkout(
    claims: AuthClaims,
    Extension(payment): Extension<Arc<dyn PaymentProvider>>,
    Extension(cache): Extension<Arc<MemoryCache>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    if payload.food_ids.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }

    let foods = FoodRepository::find_available_by_ids(&payload.food_ids)?;
    if foods.len() != payload.food_ids.len() {
        return Err(AppError::not_found("One or more items are unavailable"));
    }
    if foods
        .iter()
        .any(|food| food.enterprise_id != payload.enterprise_id)
    {
        return Err(AppError::validation(
            "All items must belong to the same restaurant",
        ));
    }

    let mut total_cents: i32 = foods.iter().map(|food| food.price_cents).sum();

    // Bon de réduction: approuvé uniquement
    if let Some(code) = payload.voucher_code.as_deref() {
        let voucher = VoucherRepository::find_approved_by_code(code)?
            .ok_or_else(|| AppError::not_found("Voucher not found"))?;
        total_cents -= total_cents * voucher.discount_percent / 100;
    }

    let order = OrderRepository::create(&NewOrder {
        account_id: claims.sub,
        enterprise_id: payload.enterprise_id,
        total_cents,
        status: OrderStatus::Pending,
    })?;

    let outcome = match payment.create_charge(order.id, total_cents, CURRENCY).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // L'échec amont est persisté avant de remonter
            let _ = OrderRepository::settle(order.id, OrderStatus::Failed, None);
            return Err(AppError::from(e));
        }
    };

    if !outcome.succeeded {
        OrderRepository::settle(order.id, OrderStatus::Failed, Some(&outcome.charge_id))?;
        return Err(AppError::PaymentDeclined);
    }

    let settled =
        OrderRepository::settle(order.id, OrderStatus::Paid, Some(&outcome.charge_id))?;

    // Une commande payée périme l'agrégat de revenus de l'enterprise
    cache.clear(Some(&enterprise_revenue_key(payload.enterprise_id)));

    Ok((StatusCode::CREATED, Json(OrderResponse::from(settled))))
}

/// GET /orders/me
/// Historique de commandes du compte courant
pub async fn list_my_orders(
    claims: AuthClaims,
) -> Result<AppResponse<Vec<OrderResponse>>, AppError> {
    let orders: Vec<OrderResponse> = OrderRepository::list_for_account(claims.sub, 50)?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(AppResponse::ok(orders))
}
