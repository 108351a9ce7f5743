use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use brigade_core::{NewUser, Role, UserProfile};
use brigade_order::{lifecycle, Order};
use brigade_store::order_repo::Dashboard;

use crate::auth::hash_password;
use crate::error::AppError;
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderFilters {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: Option<bool>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/orders", get(list_orders))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}/active", patch(set_employee_active))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/admin/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(state.orders.dashboard().await?))
}

/// GET /api/admin/orders?status=
async fn list_orders(
    State(state): State<AppState>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status = filters
        .status
        .as_deref()
        .map(lifecycle::parse_status)
        .transpose()?;

    Ok(Json(state.orders.list_recent(status).await?))
}

/// PUT /api/admin/orders/:id/status
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let Some(raw) = req.status else {
        return Err(AppError::ValidationError("Status is required".to_string()));
    };
    let status = lifecycle::parse_status(&raw)?;

    Ok(Json(state.orders.update_status(id, status).await?))
}

/// GET /api/admin/employees
async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, AppError> {
    let employees = state.users.list_employees().await?;
    Ok(Json(employees.iter().map(|u| u.profile()).collect()))
}

/// POST /api/admin/employees
async fn create_employee(
    State(state): State<AppState>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let last_name = req.last_name.filter(|s| !s.trim().is_empty());
    let first_name = req.first_name.filter(|s| !s.trim().is_empty());
    let email = req.email.filter(|s| !s.trim().is_empty());
    let password = req.password.filter(|s| !s.is_empty());

    let (Some(last_name), Some(first_name), Some(email), Some(password)) =
        (last_name, first_name, email, password)
    else {
        return Err(AppError::ValidationError(
            "Last name, first name, email and password are required".to_string(),
        ));
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ValidationError(
            "Email is already registered".to_string(),
        ));
    }

    let employee = state
        .users
        .create(&NewUser {
            last_name,
            first_name,
            email,
            password_hash: hash_password(&password)?,
            phone: req.phone.filter(|s| !s.trim().is_empty()),
            role: Role::Employee,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(employee.profile())))
}

/// PATCH /api/admin/employees/:id/active
async fn set_employee_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let Some(active) = req.active else {
        return Err(AppError::ValidationError(
            "The active flag is required".to_string(),
        ));
    };

    let employee = state.users.set_active(id, active).await?;
    Ok(Json(employee.profile()))
}
