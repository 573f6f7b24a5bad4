//! Order API handlers
//!
//! All mutations delegate to the lifecycle engine; there is no route
//! that writes order state directly.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::OrderRepository;
use crate::orders::OrderLifecycle;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Order, OrderCreate, OrderUpdate};

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub message: String,
}

/// GET /api/orders - all orders, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let repo = OrderRepository::new(state.get_db());
    Ok(ok(repo.find_all().await?))
}

/// GET /api/orders/:id - one order with its timeline
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
    Ok(ok(order))
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    let order = lifecycle.create_order(payload).await?;
    Ok(ok_with_message(order, "Order placed"))
}

/// PUT /api/orders/:id - transition status and/or merge payment/shipping
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    Ok(ok(lifecycle.update_order(&id, payload).await?))
}

/// POST /api/orders/:id/notes - append a note to the timeline
pub async fn add_note(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    Ok(ok(lifecycle.add_note(&id, payload.message).await?))
}
