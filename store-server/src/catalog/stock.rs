//! Derived stock status
//!
//! Stock status is computed on demand and never stored. The two
//! boundaries use different aggregations on purpose:
//!
//! - in-stock / out-of-stock looks at the SUM of all variant stocks
//! - low-stock fires when ANY single variant sits at or below its own
//!   threshold
//!
//! A product with one empty variant and one healthy variant is
//! low_stock, not out_of_stock.

use shared::models::{Product, ProductType, StockStatus};

/// Clamp a stock counter at the floor of zero
pub fn clamp_stock(value: i64) -> i64 {
    value.max(0)
}

/// Compute the derived stock status for a product
pub fn compute_stock_status(product: &Product) -> StockStatus {
    match product.product_type {
        ProductType::Simple => {
            classify(product.stock, product.low_stock_threshold)
        }
        ProductType::Variant => {
            let total: i64 = product.variants.iter().map(|v| v.stock).sum();
            if total <= 0 {
                return StockStatus::OutOfStock;
            }
            let any_low = product
                .variants
                .iter()
                .any(|v| v.stock <= v.low_stock_threshold);
            if any_low {
                StockStatus::LowStock
            } else {
                StockStatus::InStock
            }
        }
    }
}

fn classify(stock: i64, threshold: i64) -> StockStatus {
    if stock <= 0 {
        StockStatus::OutOfStock
    } else if stock <= threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Variant;
    use std::collections::BTreeMap;

    fn simple_product(stock: i64, threshold: i64) -> Product {
        Product {
            id: None,
            name: "Plain Mug".into(),
            slug: "plain-mug".into(),
            sku: "MUG-01".into(),
            description: None,
            category: None,
            product_type: ProductType::Simple,
            base_price: 8.0,
            stock,
            low_stock_threshold: threshold,
            variant_options: Vec::new(),
            variants: Vec::new(),
            images: Vec::new(),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn variant_product(stocks_and_thresholds: &[(i64, i64)]) -> Product {
        let mut product = simple_product(0, 0);
        product.product_type = ProductType::Variant;
        product.variants = stocks_and_thresholds
            .iter()
            .enumerate()
            .map(|(i, &(stock, low_stock_threshold))| Variant {
                sku: format!("MUG-01-V{i}"),
                name: format!("V{i}"),
                price: 8.0,
                stock,
                low_stock_threshold,
                attributes: BTreeMap::new(),
            })
            .collect();
        product
    }

    #[test]
    fn test_clamp_floor() {
        assert_eq!(clamp_stock(5), 5);
        assert_eq!(clamp_stock(0), 0);
        assert_eq!(clamp_stock(-3), 0);
    }

    #[test]
    fn test_simple_product_boundaries() {
        assert_eq!(compute_stock_status(&simple_product(0, 5)), StockStatus::OutOfStock);
        assert_eq!(compute_stock_status(&simple_product(3, 5)), StockStatus::LowStock);
        assert_eq!(compute_stock_status(&simple_product(5, 5)), StockStatus::LowStock);
        assert_eq!(compute_stock_status(&simple_product(6, 5)), StockStatus::InStock);
    }

    #[test]
    fn test_variant_sum_vs_any_asymmetry() {
        // SUM = 3 so not out_of_stock, but one variant is at/below its
        // threshold so the product reports low_stock.
        let product = variant_product(&[(0, 5), (3, 5)]);
        assert_eq!(compute_stock_status(&product), StockStatus::LowStock);
    }

    #[test]
    fn test_variant_all_healthy() {
        let product = variant_product(&[(10, 2), (20, 2)]);
        assert_eq!(compute_stock_status(&product), StockStatus::InStock);
    }

    #[test]
    fn test_variant_all_empty() {
        let product = variant_product(&[(0, 2), (0, 2)]);
        assert_eq!(compute_stock_status(&product), StockStatus::OutOfStock);
    }

    #[test]
    fn test_variant_product_with_no_variants() {
        // Zero option axes => zero variants => no sellable stock
        let product = variant_product(&[]);
        assert_eq!(compute_stock_status(&product), StockStatus::OutOfStock);
    }
}
