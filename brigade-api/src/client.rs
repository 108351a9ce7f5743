use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use brigade_core::User;
use brigade_menu::Dish;
use brigade_order::{price_cart, CartItem, Order, OrderType, OrderWithLines, PaidOrder};

use crate::error::AppError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Option<Vec<CartItem>>,
    pub order_type: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub dish_id: Option<Uuid>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/pay", put(pay_order))
        .route("/orders/{id}/ticket.pdf", get(download_ticket))
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/{dish_id}", delete(remove_favorite))
        .route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

// ============================================================================
// Orders
// ============================================================================

/// GET /api/client/orders
async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_for_user(user.id).await?))
}

/// GET /api/client/orders/:id
async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithLines>, AppError> {
    Ok(Json(state.orders.get_for_user(id, user.id).await?))
}

/// POST /api/client/orders
///
/// Prices come from the dishes table at creation time, never from the
/// request body.
async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let items = req.items.unwrap_or_default();
    let order_type = req
        .order_type
        .as_deref()
        .map(OrderType::parse_or_default)
        .unwrap_or(OrderType::OnSite);

    let dish_ids: Vec<Uuid> = items.iter().map(|item| item.dish_id).collect();
    let dishes = state.menu.dishes_by_ids(&dish_ids).await?;

    let cart = price_cart(&items, &dishes)?;
    let order = state
        .orders
        .create_from_cart(
            Some(user.id),
            &cart,
            order_type,
            req.table_number.as_deref().filter(|s| !s.trim().is_empty()),
            req.notes.as_deref().filter(|s| !s.trim().is_empty()),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/client/orders/:id/pay
async fn pay_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaidOrder>, AppError> {
    let paid = state.orders.pay_order(id, user.id, &state.tickets).await?;
    Ok(Json(paid))
}

/// GET /api/client/orders/:id/ticket.pdf
async fn download_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.orders.ticket_pdf_path(id, user.id).await?;
    let bytes = state.tickets.read_ticket(&path).await?;

    let filename = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("ticket.pdf")
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

// ============================================================================
// Favorites
// ============================================================================

/// GET /api/client/favorites
async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Dish>>, AppError> {
    Ok(Json(state.users.list_favorites(user.id).await?))
}

/// POST /api/client/favorites
async fn add_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Some(dish_id) = req.dish_id else {
        return Err(AppError::ValidationError("dish_id is required".to_string()));
    };

    let added = state.users.add_favorite(user.id, dish_id).await?;
    if added {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Added to favorites" })),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Already in favorites" })),
        ))
    }
}

/// DELETE /api/client/favorites/:dish_id
async fn remove_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(dish_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.users.remove_favorite(user.id, dish_id).await?;
    Ok(Json(json!({ "message": "Removed from favorites" })))
}
