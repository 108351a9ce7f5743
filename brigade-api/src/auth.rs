use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use argon2::password_hash::rand_core::OsRng;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use brigade_core::{NewUser, Role, User, UserProfile};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, claims_allowing_expired, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/change-password", put(change_password))
        .route_layer(axum::middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .merge(protected)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
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

    if password.len() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        None => Role::Client,
        Some(r) => Role::parse(r)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid role: {r}")))?,
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ValidationError(
            "Email is already registered".to_string(),
        ));
    }

    let new_user = NewUser {
        last_name,
        first_name,
        email,
        password_hash: hash_password(&password)?,
        phone: req.phone.filter(|s| !s.trim().is_empty()),
        role,
    };
    let user = state.users.create(&new_user).await?;

    let (token, refresh_token) = issue_token_pair(&state, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            refresh_token,
            user: user.profile(),
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (
        req.email.filter(|s| !s.trim().is_empty()),
        req.password.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    };

    // One message for both unknown email and wrong password.
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Invalid credentials".to_string()))?;

    if !verify_password(&password, user.password_hash.expose()) {
        return Err(AppError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    if !user.active {
        return Err(AppError::AuthorizationError(
            "Account is deactivated".to_string(),
        ));
    }

    let (token, refresh_token) = issue_token_pair(&state, &user).await?;
    Ok(Json(AuthResponse {
        token,
        refresh_token,
        user: user.profile(),
    }))
}

/// GET /api/auth/me
async fn me(Extension(user): Extension<User>) -> Json<UserProfile> {
    Json(user.profile())
}

/// PUT /api/auth/profile
async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let updated = state
        .users
        .update_profile(
            user.id,
            req.last_name.as_deref().filter(|s| !s.trim().is_empty()),
            req.first_name.as_deref().filter(|s| !s.trim().is_empty()),
            req.phone.as_deref().filter(|s| !s.trim().is_empty()),
        )
        .await?;

    Ok(Json(updated.profile()))
}

/// PUT /api/auth/change-password
async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(current), Some(new_password)) = (req.current_password, req.new_password) else {
        return Err(AppError::ValidationError(
            "Current and new password are required".to_string(),
        ));
    };

    if !verify_password(&current, user.password_hash.expose()) {
        return Err(AppError::AuthenticationError(
            "Current password is incorrect".to_string(),
        ));
    }

    if new_password.len() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let new_hash = hash_password(&new_password)?;
    state.users.update_password(user.id, &new_hash).await?;

    Ok(Json(json!({ "message": "Password updated" })))
}

/// POST /api/auth/refresh
///
/// Identity comes from the (possibly expired) access token; the refresh
/// token in the body is checked against its Redis copy and rotated.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let claims = claims_allowing_expired(&state.auth.secret, &headers)
        .ok_or_else(|| AppError::AuthenticationError("Invalid or missing token".to_string()))?;

    let presented = req
        .refresh_token
        .ok_or_else(|| AppError::AuthenticationError("Refresh token required".to_string()))?;
    let (token_id, secret) = presented
        .split_once('.')
        .ok_or_else(|| AppError::AuthenticationError("Malformed refresh token".to_string()))?;

    let stored = state
        .redis
        .get_refresh_token(claims.sub, token_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| {
            AppError::AuthenticationError("Unknown or expired refresh token".to_string())
        })?;

    if stored != secret {
        return Err(AppError::AuthenticationError(
            "Refresh token mismatch".to_string(),
        ));
    }

    let user = match state.users.get(claims.sub).await {
        Ok(user) => user,
        Err(brigade_store::StoreError::NotFound(_)) => {
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

    // Rotation: the presented token is dead from here on.
    if let Err(e) = state.redis.revoke_refresh_token(claims.sub, token_id).await {
        warn!("Failed to revoke rotated refresh token for {}: {}", claims.sub, e);
    }

    let (token, refresh_token) = issue_token_pair(&state, &user).await?;
    Ok(Json(RefreshResponse {
        token,
        refresh_token,
    }))
}

/// POST /api/auth/logout
///
/// Best effort: revokes the refresh token when the caller can be identified,
/// and returns 200 no matter what.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Json<serde_json::Value> {
    let refresh_token = payload.ok().and_then(|Json(req)| req.refresh_token);

    if let Some(claims) = claims_allowing_expired(&state.auth.secret, &headers) {
        if let Some((token_id, _)) = refresh_token.as_deref().and_then(|t| t.split_once('.')) {
            if let Err(e) = state.redis.revoke_refresh_token(claims.sub, token_id).await {
                warn!("Failed to revoke refresh token for {}: {}", claims.sub, e);
            }
        }
    }

    Json(json!({ "message": "Logged out" }))
}

// ============================================================================
// Token and password helpers
// ============================================================================

pub(crate) fn issue_access_token(state: &AppState, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: (Utc::now() + Duration::seconds(state.auth.access_expiration as i64)).timestamp()
            as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

/// Access token plus an opaque `{token_id}.{secret}` refresh token. Redis
/// being down does not fail the login; it only means the refresh token will
/// not be honored later.
async fn issue_token_pair(state: &AppState, user: &User) -> Result<(String, String), AppError> {
    let access = issue_access_token(state, user)?;

    let token_id = Uuid::new_v4().simple().to_string();
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();

    if let Err(e) = state
        .redis
        .store_refresh_token(user.id, &token_id, &secret, state.auth.refresh_expiration)
        .await
    {
        warn!("Failed to store refresh token for {}: {}", user.id, e);
    }

    Ok((access, format!("{token_id}.{secret}")))
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashes_verify_and_reject() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
