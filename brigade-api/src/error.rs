use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brigade_order::OrderError;
use brigade_store::StoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    UpstreamError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpstreamError(msg) => {
                tracing::error!("Ticket service error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ticket generation failed".to_string(),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFoundError(format!("{what} not found")),
            StoreError::Domain(domain) => AppError::ValidationError(domain.to_string()),
            StoreError::Ticket(msg) => AppError::UpstreamError(msg),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_order::OrderStatus;

    #[test]
    fn store_errors_map_to_their_statuses() {
        let not_found: AppError = StoreError::NotFound("Order").into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let domain: AppError = StoreError::Domain(OrderError::EmptyCart).into();
        assert_eq!(domain.into_response().status(), StatusCode::BAD_REQUEST);

        let upstream: AppError = StoreError::Ticket("service returned 502".into()).into();
        assert_eq!(
            upstream.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn ticket_gating_is_a_client_error() {
        let err: AppError =
            StoreError::Domain(OrderError::TicketUnavailable(OrderStatus::Ready)).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_failures_use_401_and_403() {
        let unauthorized = AppError::AuthenticationError("Invalid or expired token".into());
        assert_eq!(
            unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );

        let forbidden = AppError::AuthorizationError("Admin access required".into());
        assert_eq!(forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }
}
