//! Upload API module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/upload",
        post(handler::upload).delete(handler::delete_media),
    )
}
