use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use brigade_menu::{
    Category, CategoryUpdate, DishUpdate, DishWithOptions, NewCategory, NewDish, NewDishOption,
};

use crate::error::AppError;
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDishRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub options: Option<Vec<NewDishOption>>,
}

#[derive(Debug, Deserialize)]
pub struct DishFilters {
    pub category_id: Option<Uuid>,
    pub available: Option<bool>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/dishes", post(create_dish))
        .route("/dishes/{id}", put(update_dish).delete(delete_dish))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ));

    Router::new()
        .route("/categories", get(list_categories))
        .route("/dishes", get(list_dishes))
        .merge(admin)
}

// ============================================================================
// Public reads (cached)
// ============================================================================

/// GET /api/menu/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.menu.list_categories().await?))
}

/// GET /api/menu/dishes?category_id=&available=
async fn list_dishes(
    State(state): State<AppState>,
    Query(filters): Query<DishFilters>,
) -> Result<Json<Vec<DishWithOptions>>, AppError> {
    let dishes = state
        .menu
        .list_dishes(filters.category_id, filters.available)
        .await?;
    Ok(Json(dishes))
}

// ============================================================================
// Admin writes
// ============================================================================

/// POST /api/menu/categories
async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let Some(name) = req.name.filter(|s| !s.trim().is_empty()) else {
        return Err(AppError::ValidationError(
            "Category name is required".to_string(),
        ));
    };

    let category = state
        .menu
        .create_category(&NewCategory {
            name,
            description: req.description,
            active: req.active.unwrap_or(true),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/menu/categories/:id
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.menu.update_category(id, &update).await?))
}

/// DELETE /api/menu/categories/:id
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.menu.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/menu/dishes
async fn create_dish(
    State(state): State<AppState>,
    Json(req): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<DishWithOptions>), AppError> {
    let name = req.name.filter(|s| !s.trim().is_empty());
    let (Some(name), Some(price_cents)) = (name, req.price_cents) else {
        return Err(AppError::ValidationError(
            "Dish name and price are required".to_string(),
        ));
    };

    if price_cents < 0 {
        return Err(AppError::ValidationError(
            "Price must not be negative".to_string(),
        ));
    }

    let dish = state
        .menu
        .create_dish(&NewDish {
            name,
            description: req.description,
            price_cents,
            category_id: req.category_id,
            image_url: req.image_url,
            available: req.available.unwrap_or(true),
            options: req.options.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(dish)))
}

/// PUT /api/menu/dishes/:id
async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DishUpdate>,
) -> Result<Json<DishWithOptions>, AppError> {
    Ok(Json(state.menu.update_dish(id, &update).await?))
}

/// DELETE /api/menu/dishes/:id
async fn delete_dish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.menu.delete_dish(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
