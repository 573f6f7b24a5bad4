//! Category API handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

/// GET /api/categories - all categories, sort order then name
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<Category>>>> {
    let repo = CategoryRepository::new(state.get_db());
    Ok(ok(repo.find_all().await?))
}

/// GET /api/categories/:id - one category
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Category>>> {
    let repo = CategoryRepository::new(state.get_db());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
    Ok(ok(category))
}

/// POST /api/categories - create a category
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<AppResponse<Category>>> {
    let repo = CategoryRepository::new(state.get_db());
    let category = repo.create(payload).await?;
    Ok(ok_with_message(category, "Category created"))
}

/// PUT /api/categories/:id - update a category
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<AppResponse<Category>>> {
    let repo = CategoryRepository::new(state.get_db());
    Ok(ok(repo.update(&id, payload).await?))
}

/// DELETE /api/categories/:id - delete a category
///
/// Rejected while products still live in it.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let products = ProductRepository::new(state.get_db());
    if !products.find_by_category(&id).await?.is_empty() {
        return Err(AppError::Conflict(format!(
            "category {} still contains products",
            id
        )));
    }

    let repo = CategoryRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(ok_with_message(true, "Category deleted"))
}
