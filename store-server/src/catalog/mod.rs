//! Catalog Module
//!
//! Pure catalog logic: variant expansion, derived stock status and
//! identifier generation. Persistence lives in the product repository;
//! everything here is deterministic and side-effect free.

pub mod stock;
pub mod variants;

pub use stock::compute_stock_status;
pub use variants::generate_variants;

use uuid::Uuid;

/// Turn a display name into a URL slug
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Generate an uppercase SKU from a product name
///
/// Word prefix plus a short random suffix, e.g. "Canvas Tote Bag" ->
/// "CAN-TOT-7F3A". Human-assigned SKUs always win over generated ones.
pub fn generate_sku(name: &str) -> String {
    let prefix: Vec<String> = name
        .split_whitespace()
        .take(2)
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .take(3)
                .collect::<String>()
                .to_uppercase()
        })
        .filter(|p| !p.is_empty())
        .collect();

    let suffix = Uuid::new_v4().simple().to_string()[..4].to_uppercase();

    if prefix.is_empty() {
        format!("SKU-{suffix}")
    } else {
        format!("{}-{}", prefix.join("-"), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Canvas Tote Bag"), "canvas-tote-bag");
        assert_eq!(slugify("  Émile's Teapot! "), "émile-s-teapot");
        assert_eq!(slugify("a--b"), "a-b");
    }

    #[test]
    fn test_generate_sku_shape() {
        let sku = generate_sku("Canvas Tote Bag");
        assert!(sku.starts_with("CAN-TOT-"));
        assert_eq!(sku.len(), "CAN-TOT-".len() + 4);
        assert_eq!(sku, sku.to_uppercase());
    }

    #[test]
    fn test_generate_sku_empty_name() {
        let sku = generate_sku("!!!");
        assert!(sku.starts_with("SKU-"));
    }
}
