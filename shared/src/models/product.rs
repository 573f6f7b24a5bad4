//! Product Model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Single stock counter on the product itself
    #[default]
    Simple,
    /// Stock lives on the generated variants
    Variant,
}

/// Derived inventory classification. Never stored, always computed
/// from the current stock counters and thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// One axis of variation (e.g. Color with [Red, Blue])
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantOption {
    pub name: String,
    pub values: Vec<String>,
}

/// A concrete purchasable combination under a variant product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Unique across the whole catalog, not just this product
    pub sku: String,
    /// Option values joined by " - " in option order
    pub name: String,
    /// Price in currency unit
    pub price: f64,
    pub stock: i64,
    pub low_stock_threshold: i64,
    /// Option name -> selected value
    pub attributes: BTreeMap<String, String>,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    /// Uppercase, human-assignable or system-generated
    pub sku: String,
    pub description: Option<String>,
    /// Category reference (String ID)
    pub category: Option<String>,
    pub product_type: ProductType,
    /// Price in currency unit
    pub base_price: f64,
    /// Stock counter for simple products; zero for variant products
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub variant_options: Vec<VariantOption>,
    pub variants: Vec<Variant>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    /// Find a variant by SKU
    pub fn variant(&self, sku: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.sku == sku)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
    pub base_price: f64,
    pub stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub variant_options: Option<Vec<VariantOption>>,
    pub images: Option<Vec<String>>,
}

/// Update product payload
///
/// Stock counters are deliberately absent: stock only moves through
/// the catalog's adjust-stock path, never a raw field write.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub base_price: Option<f64>,
    pub low_stock_threshold: Option<i64>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Update payload for a single variant
///
/// Generated variants keep the base price until edited; stock is
/// absent here for the same reason as on [`ProductUpdate`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VariantUpdate {
    pub price: Option<f64>,
    pub low_stock_threshold: Option<i64>,
}
