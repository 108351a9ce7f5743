use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod client;
pub mod employee;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod state;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .nest("/api/auth", auth::routes(state.clone()))
        .nest("/api/menu", menu::routes(state.clone()))
        .nest("/api/admin", admin::routes(state.clone()))
        .nest("/api/employe", employee::routes(state.clone()))
        .nest("/api/client", client::routes(state.clone()))
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    let status = if database == "up" { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "database": database,
        "timestamp": chrono::Utc::now(),
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
