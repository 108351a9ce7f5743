use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use brigade_core::{Role, User};
use brigade_store::StoreError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("Missing authorization token".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("Invalid authorization header".to_string()))
}

fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("Invalid or expired token".to_string()))
}

/// Claims from the Authorization header without checking `exp`. The refresh
/// and logout endpoints accept an expired access token as identity proof;
/// the refresh token in the body is what actually gets verified.
pub(crate) fn claims_allowing_expired(secret: &str, headers: &HeaderMap) -> Option<Claims> {
    let token = bearer_token(headers).ok()?;
    let mut validation = Validation::default();
    validation.validate_exp = false;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// The account row is reloaded on every request. Deactivation takes effect
/// immediately, not at token expiry.
async fn load_active_user(state: &AppState, claims: &Claims) -> Result<User, AppError> {
    let user = match state.users.get(claims.sub).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            return Err(AppError::AuthenticationError(
                "Account no longer exists".to_string(),
            ))
        }
        Err(e) => return Err(AppError::from(e)),
    };

    if !user.active {
        return Err(AppError::AuthorizationError(
            "Account is deactivated".to_string(),
        ));
    }

    Ok(user)
}

// ============================================================================
// Authentication middleware
// ============================================================================

/// Any authenticated, active account.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claims = decode_claims(&state.auth.secret, token)?;

    let user = load_active_user(&state, &claims).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Kitchen and cash endpoints: employee or admin. The role gate runs on the
/// claims before any database access.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claims = decode_claims(&state.auth.secret, token)?;

    if !claims.role.is_staff() {
        return Err(AppError::AuthorizationError(
            "Staff access required".to_string(),
        ));
    }

    let user = load_active_user(&state, &claims).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Admin-only endpoints.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claims = decode_claims(&state.auth.secret, token)?;

    if claims.role != Role::Admin {
        return Err(AppError::AuthorizationError(
            "Admin access required".to_string(),
        ));
    }

    let user = load_active_user(&state, &claims).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
