//! Auth API handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{CurrentUser, TokenPair, password};
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::UserView;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/login - exchange credentials for a token pair
///
/// Failures are deliberately indistinguishable: unknown username,
/// wrong password, and disabled account all return the same message.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !user.is_active {
        warn!(target: "security", username = %payload.username, "Login attempt on disabled account");
        return Err(AppError::invalid_credentials());
    }
    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(target: "security", username = %payload.username, "Failed login attempt");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user.id.clone().unwrap_or_default();
    let tokens = state
        .get_jwt_service()
        .generate_token_pair(&user_id, &user.username, user.role)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    info!(username = %user.username, "User logged in");
    Ok(ok_with_message(
        LoginResponse {
            tokens,
            user: user.into(),
        },
        "Login successful",
    ))
}

/// POST /api/auth/refresh - trade a refresh token for a new pair
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AppResponse<TokenPair>>> {
    let jwt = state.get_jwt_service();
    let claims = jwt
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|e| match e {
            crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

    // The user must still exist and be active
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    let user_id = user.id.clone().unwrap_or_default();
    let tokens = jwt
        .generate_token_pair(&user_id, &user.username, user.role)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;
    Ok(ok(tokens))
}

/// GET /api/auth/me - the authenticated user's profile
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<UserView>>> {
    let repo = UserRepository::new(state.get_db());
    let record = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;
    Ok(ok(UserView::from(record)))
}
