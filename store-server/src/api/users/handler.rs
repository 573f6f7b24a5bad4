//! User API handlers
//!
//! Passwords are hashed here at the boundary; repositories only ever
//! see the Argon2 hash. Responses use [`UserView`] so the hash never
//! leaves the server.

use axum::{
    Json,
    extract::{Path, State},
};

use validator::Validate;

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Role, UserCreate, UserUpdate, UserView};

/// GET /api/users - all users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<UserView>>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(ok(users.into_iter().map(UserView::from).collect()))
}

/// GET /api/users/:id - one user
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<UserView>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    Ok(ok(user.into()))
}

/// POST /api/users - create a user
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<UserView>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = password::hash_password(&payload.password)?;
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(
            payload.username,
            payload.email,
            password_hash,
            payload.role.unwrap_or(Role::Staff),
        )
        .await?;
    Ok(ok_with_message(user.into(), "User created"))
}

/// PUT /api/users/:id - update a user
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<AppResponse<UserView>>> {
    let password_hash = match payload.password {
        Some(password) => Some(password::hash_password(&password)?),
        None => None,
    };
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .update(&id, payload.email, password_hash, payload.role, payload.is_active)
        .await?;
    Ok(ok(user.into()))
}

/// DELETE /api/users/:id - delete a user
///
/// Self-deletion is rejected so an admin cannot lock everyone out by
/// removing the last working account in use.
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let repo = UserRepository::new(state.get_db());
    let target = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    if target.id.as_deref() == Some(current.id.as_str()) {
        return Err(AppError::Validation("cannot delete your own account".into()));
    }

    repo.delete(&id).await?;
    Ok(ok_with_message(true, "User deleted"))
}
