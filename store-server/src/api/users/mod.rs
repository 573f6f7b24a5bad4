//! User API module
//!
//! Admin-only; the route builder wraps this router in the admin
//! middleware.

mod handler;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/users", user_routes())
        .layer(axum_middleware::from_fn(require_admin))
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
