//! Product API module

mod handler;

use axum::{Router, routing::{get, post, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/stock/bulk", post(handler::bulk_adjust_stock))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route(
            "/{id}/stock",
            post(handler::adjust_stock).put(handler::set_stock),
        )
        .route("/{id}/variants/{sku}", put(handler::update_variant))
        .route("/by-category/{category_id}", get(handler::list_by_category))
}
