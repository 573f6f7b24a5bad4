//! Product Repository
//!
//! Owns Product/Variant persistence — the catalog store. Stock only
//! moves through [`ProductRepository::adjust_stock`]; there is no raw
//! stock field write anywhere in the API surface.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::catalog;
use shared::models::{Product, ProductCreate, ProductType, ProductUpdate, VariantUpdate};

/// Projection that folds the record id into a plain string
const SELECT_PRODUCT: &str = "SELECT *, <string>id AS id FROM product";

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn key_of(id: &str) -> String {
        id.strip_prefix("product:").unwrap_or(id).to_string()
    }

    /// Find all active products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(format!("{SELECT_PRODUCT} WHERE is_active = true ORDER BY name"))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find products by category
    pub async fn find_by_category(&self, category_id: &str) -> RepoResult<Vec<Product>> {
        let category = category_id.to_string();
        let products: Vec<Product> = self
            .base
            .db()
            .query(format!(
                "{SELECT_PRODUCT} WHERE category = $category AND is_active = true ORDER BY name"
            ))
            .bind(("category", category))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let key = Self::key_of(id);
        let products: Vec<Product> = self
            .base
            .db()
            .query(format!("{SELECT_PRODUCT} WHERE id = type::thing('product', $key)"))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    ///
    /// Assigns slug and SKU when absent, rejects duplicates, and for
    /// variant-typed products expands the option axes into the full
    /// variant list. This is the only place variants are generated.
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }
        if data.base_price < 0.0 {
            return Err(RepoError::Validation("base_price cannot be negative".into()));
        }

        let product_type = data.product_type.unwrap_or_default();
        let sku = data
            .sku
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| catalog::generate_sku(&data.name));
        let slug = data
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| catalog::slugify(&data.name));
        let low_stock_threshold = data.low_stock_threshold.unwrap_or(5);

        let variant_options = data.variant_options.unwrap_or_default();
        let variants = match product_type {
            ProductType::Simple => Vec::new(),
            ProductType::Variant => catalog::generate_variants(
                &sku,
                data.base_price,
                low_stock_threshold,
                &variant_options,
            ),
        };

        // Duplicate checks before touching the table, so callers get a
        // Conflict instead of a raw index violation
        self.ensure_unique_skus(
            std::iter::once(sku.clone())
                .chain(variants.iter().map(|v| v.sku.clone()))
                .collect(),
            None,
        )
        .await?;
        self.ensure_unique_slug(&slug, None).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let product = Product {
            id: None,
            name: data.name,
            slug,
            sku,
            description: data.description,
            category: data.category,
            product_type,
            base_price: data.base_price,
            // Variant products carry no top-level stock
            stock: match product_type {
                ProductType::Simple => catalog::stock::clamp_stock(data.stock.unwrap_or(0)),
                ProductType::Variant => 0,
            },
            low_stock_threshold,
            variant_options,
            variants,
            images: data.images.unwrap_or_default(),
            is_active: true,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        let key = Uuid::new_v4().simple().to_string();
        self.base
            .db()
            .query("CREATE type::thing('product', $key) CONTENT $data RETURN NONE")
            .bind(("key", key.clone()))
            .bind(("data", product))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    ///
    /// Stock counters and variants are untouched here; they have their
    /// own paths (`adjust_stock`, `update_variant`).
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let key = Self::key_of(id);

        if let Some(ref slug) = data.slug {
            self.ensure_unique_slug(slug, Some(&key)).await?;
        }

        // Build dynamic SET clauses, binding only provided fields
        let mut set_parts: Vec<&str> = vec!["updated_at = $updated_at"];

        if data.name.is_some() { set_parts.push("name = $name"); }
        if data.slug.is_some() { set_parts.push("slug = $slug"); }
        if data.description.is_some() { set_parts.push("description = $description"); }
        if data.category.is_some() { set_parts.push("category = $category"); }
        if data.base_price.is_some() { set_parts.push("base_price = $base_price"); }
        if data.low_stock_threshold.is_some() { set_parts.push("low_stock_threshold = $low_stock_threshold"); }
        if data.images.is_some() { set_parts.push("images = $images"); }
        if data.is_active.is_some() { set_parts.push("is_active = $is_active"); }

        let query_str = format!(
            "UPDATE type::thing('product', $key) SET {} RETURN NONE",
            set_parts.join(", ")
        );

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("key", key.clone()))
            .bind(("updated_at", chrono::Utc::now().to_rfc3339()));

        if let Some(v) = data.name { query = query.bind(("name", v)); }
        if let Some(v) = data.slug { query = query.bind(("slug", v)); }
        if let Some(v) = data.description { query = query.bind(("description", v)); }
        if let Some(v) = data.category { query = query.bind(("category", v)); }
        if let Some(v) = data.base_price { query = query.bind(("base_price", v)); }
        if let Some(v) = data.low_stock_threshold { query = query.bind(("low_stock_threshold", v)); }
        if let Some(v) = data.images { query = query.bind(("images", v)); }
        if let Some(v) = data.is_active { query = query.bind(("is_active", v)); }

        query.await?.check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Update one variant's price or threshold
    pub async fn update_variant(
        &self,
        product_id: &str,
        variant_sku: &str,
        data: VariantUpdate,
    ) -> RepoResult<Product> {
        let mut product = self
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;

        let variant = product
            .variants
            .iter_mut()
            .find(|v| v.sku == variant_sku)
            .ok_or_else(|| RepoError::NotFound(format!("Variant {} not found", variant_sku)))?;

        if let Some(price) = data.price {
            if price < 0.0 {
                return Err(RepoError::Validation("price cannot be negative".into()));
            }
            variant.price = price;
        }
        if let Some(threshold) = data.low_stock_threshold {
            variant.low_stock_threshold = threshold;
        }

        self.save_variants(product_id, &product).await?;
        Ok(product)
    }

    /// Hard delete a product
    ///
    /// Callers must reject deletion while orders still reference the
    /// product; see the handler.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        let key = Self::key_of(id);
        self.base
            .db()
            .query("DELETE type::thing('product', $key)")
            .bind(("key", key))
            .await?
            .check()?;
        Ok(())
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Apply a stock delta, clamped at a floor of 0
    ///
    /// Simple products use a single conditional UPDATE so concurrent
    /// deltas cannot lose writes. Variant stock lives inside an
    /// embedded array and falls back to read-modify-write; the floor
    /// still holds but concurrent variant deltas can race (accepted,
    /// see DESIGN notes).
    ///
    /// Returns the new stock value.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        variant_sku: Option<&str>,
        delta: i64,
    ) -> RepoResult<i64> {
        match variant_sku {
            None => self.adjust_simple_stock(product_id, delta).await,
            Some(sku) => self.adjust_variant_stock(product_id, sku, delta).await,
        }
    }

    /// Set a simple product's stock to an absolute value, routed
    /// through the clamped delta path
    pub async fn set_stock(&self, product_id: &str, target: i64) -> RepoResult<i64> {
        let product = self
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;
        if product.product_type != ProductType::Simple {
            return Err(RepoError::Validation(
                "stock can only be set directly on simple products".into(),
            ));
        }
        let delta = catalog::stock::clamp_stock(target) - product.stock;
        self.adjust_simple_stock(product_id, delta).await
    }

    async fn adjust_simple_stock(&self, product_id: &str, delta: i64) -> RepoResult<i64> {
        let key = Self::key_of(product_id);
        let new_stock: Vec<i64> = self
            .base
            .db()
            .query(
                "UPDATE type::thing('product', $key) \
                 SET stock = math::max([stock + $delta, 0]), updated_at = $now \
                 RETURN VALUE stock",
            )
            .bind(("key", key))
            .bind(("delta", delta))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?
            .take(0)?;

        let new_stock = new_stock
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;

        if delta < 0 && new_stock == 0 {
            tracing::warn!(
                product_id,
                delta,
                "Stock floor reached while applying negative delta; counter clamped at 0"
            );
        }
        Ok(new_stock)
    }

    async fn adjust_variant_stock(
        &self,
        product_id: &str,
        variant_sku: &str,
        delta: i64,
    ) -> RepoResult<i64> {
        let mut product = self
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;

        let variant = product
            .variants
            .iter_mut()
            .find(|v| v.sku == variant_sku)
            .ok_or_else(|| RepoError::NotFound(format!("Variant {} not found", variant_sku)))?;

        let proposed = variant.stock + delta;
        let new_stock = catalog::stock::clamp_stock(proposed);
        if proposed < 0 {
            tracing::warn!(
                product_id,
                variant_sku,
                delta,
                "Stock floor reached while applying negative delta; counter clamped at 0"
            );
        }
        variant.stock = new_stock;

        self.save_variants(product_id, &product).await?;
        Ok(new_stock)
    }

    async fn save_variants(&self, product_id: &str, product: &Product) -> RepoResult<()> {
        let key = Self::key_of(product_id);
        self.base
            .db()
            .query(
                "UPDATE type::thing('product', $key) \
                 SET variants = $variants, updated_at = $now RETURN NONE",
            )
            .bind(("key", key))
            .bind(("variants", product.variants.clone()))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?
            .check()?;
        Ok(())
    }

    // =========================================================================
    // Uniqueness checks
    // =========================================================================

    /// Verify that none of the candidate SKUs exists anywhere in the
    /// catalog (product or variant level) and that the candidates do
    /// not collide among themselves.
    async fn ensure_unique_skus(
        &self,
        candidates: Vec<String>,
        exclude_product: Option<&str>,
    ) -> RepoResult<()> {
        // Internal duplicates first: the variant code scheme can
        // produce them for similarly named values
        let mut seen = std::collections::HashSet::new();
        for sku in &candidates {
            if !seen.insert(sku.as_str()) {
                return Err(RepoError::Duplicate(format!("SKU {}", sku)));
            }
        }

        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
            sku: String,
            variant_skus: Vec<String>,
        }

        let rows: Vec<Row> = self
            .base
            .db()
            .query("SELECT <string>id AS id, sku, variants[*].sku AS variant_skus FROM product")
            .await?
            .take(0)?;

        let exclude = exclude_product.map(|id| format!("product:{}", Self::key_of(id)));
        for row in rows {
            if exclude.as_deref() == Some(row.id.as_str()) {
                continue;
            }
            for sku in std::iter::once(&row.sku).chain(row.variant_skus.iter()) {
                if candidates.iter().any(|c| c == sku) {
                    return Err(RepoError::Duplicate(format!("SKU {}", sku)));
                }
            }
        }
        Ok(())
    }

    async fn ensure_unique_slug(&self, slug: &str, exclude_key: Option<&str>) -> RepoResult<()> {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
        }

        let rows: Vec<Row> = self
            .base
            .db()
            .query("SELECT <string>id AS id FROM product WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await?
            .take(0)?;

        let exclude = exclude_key.map(|k| format!("product:{k}"));
        if rows.iter().any(|r| exclude.as_deref() != Some(r.id.as_str())) {
            return Err(RepoError::Duplicate(format!("slug {}", slug)));
        }
        Ok(())
    }
}
