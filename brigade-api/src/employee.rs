use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use brigade_order::{lifecycle, KitchenOrder, Order, OrderStatus};

use crate::error::AppError;
use crate::middleware::staff_auth_middleware;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KitchenStatusRequest {
    pub status: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/kitchen/orders", get(kitchen_orders))
        .route("/kitchen/orders/{id}/status", put(update_kitchen_status))
        .route("/cash/orders", get(cash_orders))
        .route("/cash/orders/{id}/payment", put(record_cash_payment))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            staff_auth_middleware,
        ))
}

// ============================================================================
// Kitchen
// ============================================================================

/// GET /api/employe/kitchen/orders
async fn kitchen_orders(State(state): State<AppState>) -> Result<Json<Vec<KitchenOrder>>, AppError> {
    Ok(Json(state.orders.kitchen_queue().await?))
}

/// PUT /api/employe/kitchen/orders/:id/status
///
/// Kitchen screens may send `delivered`; it is stored as `ready`.
async fn update_kitchen_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<KitchenStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let Some(raw) = req.status else {
        return Err(AppError::ValidationError("Status is required".to_string()));
    };
    let status = lifecycle::parse_kitchen_status(&raw)?;

    Ok(Json(state.orders.update_status(id, status).await?))
}

// ============================================================================
// Cash register
// ============================================================================

/// GET /api/employe/cash/orders
async fn cash_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.today_orders().await?))
}

/// PUT /api/employe/cash/orders/:id/payment
///
/// The cashier collects at the counter and hands the tray over; the order
/// is marked served. Receipts come from the client pay flow.
async fn record_cash_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state.orders.update_status(id, OrderStatus::Served).await?,
    ))
}
