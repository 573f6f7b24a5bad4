//! End-to-end order flow over the in-memory database
//!
//! Exercises the catalog and the lifecycle engine together: variant
//! generation, derived stock status, delivery-time stock commitment,
//! refund restoration, and catalog-wide SKU uniqueness.

use store_server::catalog;
use store_server::db::DbService;
use store_server::db::repository::{ProductRepository, RepoError};
use store_server::orders::{OrderLifecycle, timeline};

use shared::models::{
    Address, CustomerInfo, OrderCreate, OrderItemInput, OrderStatus, OrderUpdate, ProductCreate,
    ProductType, StockStatus, VariantOption,
};

async fn setup() -> (OrderLifecycle, ProductRepository) {
    let db = DbService::memory().await.expect("in-memory db");
    (
        OrderLifecycle::new(db.db.clone()),
        ProductRepository::new(db.db),
    )
}

fn tee_shirt() -> ProductCreate {
    ProductCreate {
        name: "Tee Shirt".into(),
        slug: None,
        sku: Some("TEE".into()),
        description: None,
        category: None,
        product_type: Some(ProductType::Variant),
        base_price: 19.0,
        stock: None,
        low_stock_threshold: Some(5),
        variant_options: Some(vec![
            VariantOption {
                name: "Color".into(),
                values: vec!["Red".into(), "Blue".into()],
            },
            VariantOption {
                name: "Size".into(),
                values: vec!["S".into(), "M".into()],
            },
        ]),
        images: None,
    }
}

fn order_for(product_id: &str, sku: &str, quantity: i64) -> OrderCreate {
    OrderCreate {
        customer: CustomerInfo {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            phone: None,
        },
        items: vec![OrderItemInput {
            product_id: product_id.to_string(),
            variant_sku: Some(sku.to_string()),
            quantity,
        }],
        shipping_address: Address {
            line1: "1 Harbor Lane".into(),
            line2: None,
            city: "Arlington".into(),
            postal_code: "22201".into(),
            country: "US".into(),
        },
        billing_address: None,
        payment: None,
        shipping: None,
        shipping_cost: None,
        tax: None,
        discount: None,
    }
}

fn transition(status: OrderStatus) -> OrderUpdate {
    OrderUpdate {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn variant_order_delivery_and_refund_flow() {
    let (lifecycle, products) = setup().await;

    // Cartesian expansion: 2 colors x 2 sizes
    let product = products.create(tee_shirt()).await.expect("create product");
    let pid = product.id.clone().expect("product id");
    assert_eq!(product.variants.len(), 4);
    let skus: Vec<&str> = product.variants.iter().map(|v| v.sku.as_str()).collect();
    assert_eq!(skus, ["TEE-CRE-SS", "TEE-CRE-SM", "TEE-CBL-SS", "TEE-CBL-SM"]);

    // Variant products hold no stock on the product itself
    assert_eq!(product.stock, 0);
    assert_eq!(catalog::compute_stock_status(&product), StockStatus::OutOfStock);

    // Receive inventory for one variant
    products
        .adjust_stock(&pid, Some("TEE-CRE-SS"), 10)
        .await
        .expect("receive stock");
    let product = products.find_by_id(&pid).await.unwrap().unwrap();
    // Total is positive but the other variants sit at zero
    assert_eq!(catalog::compute_stock_status(&product), StockStatus::LowStock);

    // Place and deliver an order for 4 units
    let order = lifecycle
        .create_order(order_for(&pid, "TEE-CRE-SS", 4))
        .await
        .expect("place order");
    let oid = order.id.clone().expect("order id");
    assert_eq!(order.subtotal, 19.0 * 4.0);
    assert!(order.order_number.starts_with("ORD-"));

    // Placement reserves nothing
    let variant_stock = |p: &shared::models::Product| p.variant("TEE-CRE-SS").unwrap().stock;
    let product = products.find_by_id(&pid).await.unwrap().unwrap();
    assert_eq!(variant_stock(&product), 10);

    let delivered = lifecycle
        .update_order(&oid, transition(OrderStatus::Delivered))
        .await
        .expect("deliver");
    assert!(delivered.shipping.delivered_at.is_some());
    let product = products.find_by_id(&pid).await.unwrap().unwrap();
    assert_eq!(variant_stock(&product), 6);

    // Refund puts the units back
    let refunded = lifecycle
        .update_order(&oid, transition(OrderStatus::Refunded))
        .await
        .expect("refund");
    assert_eq!(refunded.status, OrderStatus::Refunded);
    let product = products.find_by_id(&pid).await.unwrap().unwrap();
    assert_eq!(variant_stock(&product), 10);

    // Timeline carries placed + 2 status changes with an intact chain
    assert_eq!(refunded.timeline.len(), 3);
    assert!(timeline::verify_chain(&refunded.timeline));
}

#[tokio::test]
async fn duplicate_sku_is_rejected_catalog_wide() {
    let (_, products) = setup().await;
    products.create(tee_shirt()).await.expect("first product");

    let mut second = tee_shirt();
    second.name = "Another Tee".into();
    second.slug = Some("another-tee".into());
    let err = products.create(second).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn stock_clamps_at_zero_floor() {
    let (_, products) = setup().await;
    let product = products
        .create(ProductCreate {
            name: "Mug".into(),
            slug: None,
            sku: Some("MUG".into()),
            description: None,
            category: None,
            product_type: None,
            base_price: 9.0,
            stock: Some(3),
            low_stock_threshold: None,
            variant_options: None,
            images: None,
        })
        .await
        .expect("create product");
    let pid = product.id.expect("product id");

    let stock = products.adjust_stock(&pid, None, -999).await.expect("adjust");
    assert_eq!(stock, 0);

    let product = products.find_by_id(&pid).await.unwrap().unwrap();
    assert_eq!(catalog::compute_stock_status(&product), StockStatus::OutOfStock);
}

#[tokio::test]
async fn delivery_requires_defined_transition() {
    let (lifecycle, products) = setup().await;
    let product = products.create(tee_shirt()).await.expect("create product");
    let pid = product.id.expect("product id");

    let order = lifecycle
        .create_order(order_for(&pid, "TEE-CBL-SM", 1))
        .await
        .expect("place order");
    let oid = order.id.expect("order id");

    lifecycle
        .update_order(&oid, transition(OrderStatus::Cancelled))
        .await
        .expect("cancel");

    // Terminal state: no way forward
    let err = lifecycle
        .update_order(&oid, transition(OrderStatus::Delivered))
        .await
        .unwrap_err();
    assert!(matches!(err, store_server::AppError::InvalidTransition(_)));
}
