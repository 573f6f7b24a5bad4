//! Product API handlers
//!
//! Responses carry the derived `stock_status` alongside the stored
//! product; it is computed per response, never persisted.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog;
use crate::core::ServerState;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Product, ProductCreate, ProductUpdate, StockStatus, VariantUpdate};

/// Product plus its derived inventory classification
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = catalog::compute_stock_status(&product);
        Self {
            product,
            stock_status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StockAdjust {
    pub delta: i64,
    pub variant_sku: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockSet {
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct BulkStockAdjust {
    pub product_id: String,
    pub variant_sku: Option<String>,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub stock: i64,
}

/// GET /api/products - list active products
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;
    Ok(ok(products.into_iter().map(ProductView::from).collect()))
}

/// GET /api/products/by-category/:category_id - products in a category
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_by_category(&category_id).await?;
    Ok(ok(products.into_iter().map(ProductView::from).collect()))
}

/// GET /api/products/:id - one product
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
    Ok(ok(product.into()))
}

/// POST /api/products - create a product
///
/// Variant products get their full variant matrix generated here from
/// `variant_options`.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(payload).await?;
    Ok(ok_with_message(product.into(), "Product created"))
}

/// PUT /api/products/:id - update product fields
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, payload).await?;
    Ok(ok(product.into()))
}

/// PUT /api/products/:id/variants/:sku - update one variant
pub async fn update_variant(
    State(state): State<ServerState>,
    Path((id, sku)): Path<(String, String)>,
    Json(payload): Json<VariantUpdate>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.update_variant(&id, &sku, payload).await?;
    Ok(ok(product.into()))
}

/// DELETE /api/products/:id - delete a product
///
/// Rejected while any order still references the product; order line
/// items point at it by ID and history must stay resolvable.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let orders = OrderRepository::new(state.get_db());
    if orders.references_product(&id).await? {
        return Err(AppError::Conflict(format!(
            "product {} is referenced by existing orders",
            id
        )));
    }

    let repo = ProductRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(ok_with_message(true, "Product deleted"))
}

/// POST /api/products/:id/stock - apply a stock delta
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<AppResponse<StockLevel>>> {
    let repo = ProductRepository::new(state.get_db());
    let stock = repo
        .adjust_stock(&id, payload.variant_sku.as_deref(), payload.delta)
        .await?;
    Ok(ok(StockLevel { stock }))
}

/// PUT /api/products/:id/stock - set absolute stock (simple products)
pub async fn set_stock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockSet>,
) -> AppResult<Json<AppResponse<StockLevel>>> {
    let repo = ProductRepository::new(state.get_db());
    let stock = repo.set_stock(&id, payload.stock).await?;
    Ok(ok(StockLevel { stock }))
}

/// POST /api/products/stock/bulk - apply several stock deltas
///
/// Deltas apply independently; a failing line aborts the remainder but
/// already-applied lines stay applied.
pub async fn bulk_adjust_stock(
    State(state): State<ServerState>,
    Json(payload): Json<Vec<BulkStockAdjust>>,
) -> AppResult<Json<AppResponse<Vec<StockLevel>>>> {
    let repo = ProductRepository::new(state.get_db());
    let mut levels = Vec::with_capacity(payload.len());
    for line in payload {
        let stock = repo
            .adjust_stock(&line.product_id, line.variant_sku.as_deref(), line.delta)
            .await?;
        levels.push(StockLevel { stock });
    }
    Ok(ok(levels))
}
