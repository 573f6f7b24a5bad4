//! Variant Generator
//!
//! Expands a product's variant option axes into the full list of
//! concrete variants, exactly once, at product creation time. The
//! expansion is a depth-first Cartesian product: options in their given
//! order, each value list in its given order, so SKU generation and
//! display order are deterministic.

use std::collections::BTreeMap;

use shared::models::{Variant, VariantOption};

/// Expand option axes into concrete variants
///
/// Every generated variant starts at stock 0 with the product's base
/// price; both are independently editable afterwards. Zero option axes
/// produce an empty list — valid, but with no sellable stock.
pub fn generate_variants(
    product_sku: &str,
    base_price: f64,
    low_stock_threshold: i64,
    options: &[VariantOption],
) -> Vec<Variant> {
    if options.is_empty() {
        return Vec::new();
    }

    let mut variants = Vec::new();
    let mut combination: Vec<(usize, usize)> = Vec::with_capacity(options.len());
    expand(
        product_sku,
        base_price,
        low_stock_threshold,
        options,
        0,
        &mut combination,
        &mut variants,
    );
    variants
}

fn expand(
    product_sku: &str,
    base_price: f64,
    low_stock_threshold: i64,
    options: &[VariantOption],
    depth: usize,
    combination: &mut Vec<(usize, usize)>,
    out: &mut Vec<Variant>,
) {
    if depth == options.len() {
        out.push(build_variant(
            product_sku,
            base_price,
            low_stock_threshold,
            options,
            combination,
        ));
        return;
    }
    for value_idx in 0..options[depth].values.len() {
        combination.push((depth, value_idx));
        expand(
            product_sku,
            base_price,
            low_stock_threshold,
            options,
            depth + 1,
            combination,
            out,
        );
        combination.pop();
    }
}

fn build_variant(
    product_sku: &str,
    base_price: f64,
    low_stock_threshold: i64,
    options: &[VariantOption],
    combination: &[(usize, usize)],
) -> Variant {
    let mut names = Vec::with_capacity(combination.len());
    let mut sku = String::from(product_sku);
    let mut attributes = BTreeMap::new();

    for &(opt_idx, value_idx) in combination {
        let option = &options[opt_idx];
        let value = &option.values[value_idx];
        names.push(value.clone());
        sku.push('-');
        sku.push_str(&variant_code(&option.name, value));
        attributes.insert(option.name.clone(), value.clone());
    }

    Variant {
        sku,
        name: names.join(" - "),
        price: base_price,
        stock: 0,
        low_stock_threshold,
        attributes,
    }
}

/// Letter code for one option/value pair
///
/// First letter of the option name plus the first two letters of the
/// value, uppercased with spaces stripped: (Color, Red) -> "CRE",
/// (Size, S) -> "SS".
///
/// Known limitation carried over from the legacy system: similar values
/// can collide ("Blue" and "Black" both yield "BL"). Generation does
/// not deduplicate; the catalog-wide unique-SKU check at save time
/// rejects the colliding product instead.
fn variant_code(option_name: &str, value: &str) -> String {
    let name_initial: String = option_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(1)
        .flat_map(|c| c.to_uppercase())
        .collect();
    let value_prefix: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(2)
        .flat_map(|c| c.to_uppercase())
        .collect();
    format!("{name_initial}{value_prefix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<VariantOption> {
        vec![
            VariantOption {
                name: "Color".into(),
                values: vec!["Red".into(), "Blue".into()],
            },
            VariantOption {
                name: "Size".into(),
                values: vec!["S".into(), "M".into()],
            },
        ]
    }

    #[test]
    fn test_cartesian_order_and_skus() {
        let variants = generate_variants("TEE", 19.99, 5, &axes());

        assert_eq!(variants.len(), 4);
        let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Red - S", "Red - M", "Blue - S", "Blue - M"]);
        let skus: Vec<&str> = variants.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, ["TEE-CRE-SS", "TEE-CRE-SM", "TEE-CBL-SS", "TEE-CBL-SM"]);
    }

    #[test]
    fn test_generated_defaults() {
        let variants = generate_variants("TEE", 19.99, 5, &axes());
        for v in &variants {
            assert_eq!(v.stock, 0);
            assert_eq!(v.price, 19.99);
            assert_eq!(v.low_stock_threshold, 5);
        }
        assert_eq!(variants[0].attributes.get("Color"), Some(&"Red".to_string()));
        assert_eq!(variants[0].attributes.get("Size"), Some(&"S".to_string()));
    }

    #[test]
    fn test_zero_axes_yields_empty() {
        let variants = generate_variants("TEE", 19.99, 5, &[]);
        assert!(variants.is_empty());
    }

    #[test]
    fn test_single_axis() {
        let options = vec![VariantOption {
            name: "Material".into(),
            values: vec!["Wool".into(), "Cotton".into()],
        }];
        let variants = generate_variants("HAT", 9.0, 3, &options);
        let skus: Vec<&str> = variants.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, ["HAT-MWO", "HAT-MCO"]);
    }

    #[test]
    fn test_code_strips_spaces() {
        let options = vec![VariantOption {
            name: "Trim Color".into(),
            values: vec!["Navy Blue".into()],
        }];
        let variants = generate_variants("BAG", 5.0, 1, &options);
        // "Trim Color" -> T, "Navy Blue" -> NA
        assert_eq!(variants[0].sku, "BAG-TNA");
    }

    #[test]
    fn test_known_collision_is_not_defended() {
        // "Blue" and "Black" both code to BL; generation stays faithful
        // to the legacy scheme and produces the duplicate SKUs. The
        // unique-SKU check at save time is what rejects these.
        let options = vec![VariantOption {
            name: "Color".into(),
            values: vec!["Blue".into(), "Black".into()],
        }];
        let variants = generate_variants("MUG", 7.5, 2, &options);
        assert_eq!(variants[0].sku, "MUG-CBL");
        assert_eq!(variants[1].sku, "MUG-CBL");
    }
}
