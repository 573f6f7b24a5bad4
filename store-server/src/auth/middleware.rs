//! Authentication middleware
//!
//! Validates the `Authorization: Bearer <token>` header and injects
//! [`CurrentUser`] into the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Paths under /api/ that stay reachable without a token
fn is_public_api_route(path: &str) -> bool {
    matches!(path, "/api/auth/login" | "/api/auth/refresh" | "/api/health")
}

/// Require a valid access token on every /api/ route
///
/// Skips OPTIONS (CORS preflight), non-API paths, and the public auth
/// endpoints. On success, [`CurrentUser`] lands in the request
/// extensions for the extractor to pick up.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if !path.starts_with("/api/") || is_public_api_route(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            warn!(target: "security", uri = %req.uri(), "Missing authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match state.get_jwt_service().validate_access_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|_| AppError::InvalidToken)?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(target: "security", error = %e, uri = %req.uri(), "Token validation failed");
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// Require the admin role
///
/// Must run after [`require_auth`] so the user is already in the
/// request extensions.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    if !user.is_admin() {
        warn!(
            target: "security",
            user_id = %user.id,
            username = %user.username,
            "Admin role required"
        );
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    Ok(next.run(req).await)
}
