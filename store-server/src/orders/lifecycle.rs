//! Order Lifecycle Engine
//!
//! Single owner of order state. Creation snapshots prices and names
//! from the catalog; transitions follow [`OrderStatus::can_transition_to`]
//! and carry the only stock side effects in the system:
//!
//! - entering `delivered` decrements stock for every line item
//! - leaving `delivered` for `cancelled`/`refunded` restores it
//! - every other transition, including pre-delivery cancellation, is
//!   stock-neutral
//!
//! Stock is committed at delivery, not at placement. A placed order
//! reserves nothing; an abandoned or cancelled order needs no
//! compensation path.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::info;
use uuid::Uuid;

use crate::db::repository::{OrderRepository, ProductRepository};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Order, OrderCreate, OrderItem, OrderStatus, OrderUpdate, PaymentInfo, PaymentStatus,
    PaymentUpdate, ProductType, ShippingInfo, ShippingUpdate, TimelineEventType,
};

use super::timeline;

/// Orchestrates order creation and transitions over the repositories
#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
    products: ProductRepository,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Place a new order
    ///
    /// Resolves every cart line against the catalog, snapshots unit
    /// price and display name into the line items, computes the money
    /// fields once, and opens the timeline with a `placed` event.
    /// Stock is NOT touched here.
    pub async fn create_order(&self, input: OrderCreate) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::Validation("order must contain at least one item".into()));
        }
        if input.customer.name.trim().is_empty() {
            return Err(AppError::Validation("customer name is required".into()));
        }

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            if line.quantity < 1 {
                return Err(AppError::Validation(format!(
                    "quantity must be at least 1 for product {}",
                    line.product_id
                )));
            }
            items.push(self.snapshot_line(&line.product_id, line.variant_sku.as_deref(), line.quantity).await?);
        }

        let subtotal: f64 = items.iter().map(|i| i.subtotal).sum();
        let shipping_cost = input.shipping_cost.unwrap_or(0.0);
        let tax = input.tax.unwrap_or(0.0);
        let discount = input.discount.unwrap_or(0.0);
        let total = compute_total(subtotal, shipping_cost, tax, discount);

        let now = chrono::Utc::now().to_rfc3339();
        let order_number = generate_order_number();

        let mut order = Order {
            id: None,
            order_number: order_number.clone(),
            customer: input.customer,
            items,
            billing_address: input
                .billing_address
                .unwrap_or_else(|| input.shipping_address.clone()),
            shipping_address: input.shipping_address,
            status: OrderStatus::Pending,
            payment: PaymentInfo::default(),
            shipping: ShippingInfo::default(),
            subtotal,
            shipping_cost,
            tax,
            discount,
            total,
            timeline: Vec::new(),
            created_at: Some(now),
        };

        timeline::append(
            &mut order.timeline,
            TimelineEventType::Placed,
            Some(format!("Order {} placed", order.order_number)),
            Some(serde_json::json!({ "total": order.total })),
        );

        if let Some(payment) = input.payment {
            merge_payment(&mut order, payment);
        }
        if let Some(shipping) = input.shipping {
            merge_shipping(&mut order.shipping, shipping);
        }

        let order = self.orders.create(order).await?;
        info!(
            order_number = %order_number,
            total = order.total,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    /// Apply an admin update: optional status transition plus shallow
    /// payment/shipping merges
    ///
    /// Undefined transitions are rejected with `InvalidTransition` and
    /// leave the order untouched. A same-status "transition" is a
    /// no-op, which is what makes delivery idempotent: only the edge
    /// into `delivered` moves stock, never the state itself.
    pub async fn update_order(&self, id: &str, update: OrderUpdate) -> AppResult<Order> {
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        if let Some(payment) = update.payment {
            merge_payment(&mut order, payment);
        }
        if let Some(shipping) = update.shipping {
            merge_shipping(&mut order.shipping, shipping);
        }

        if let Some(next) = update.status {
            let current = order.status;
            if !current.can_transition_to(next) {
                return Err(AppError::InvalidTransition(format!(
                    "order {} cannot move from {} to {}",
                    order.order_number, current, next
                )));
            }
            if next != current {
                self.apply_transition(&mut order, next).await?;
            }
        }

        Ok(self.orders.save(&order).await?)
    }

    /// Append a free-form note to the order timeline
    pub async fn add_note(&self, id: &str, message: String) -> AppResult<Order> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("note message is required".into()));
        }
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        timeline::append(&mut order.timeline, TimelineEventType::Note, Some(message), None);
        Ok(self.orders.save(&order).await?)
    }

    /// Commit a defined, state-changing transition
    async fn apply_transition(&self, order: &mut Order, next: OrderStatus) -> AppResult<()> {
        let current = order.status;
        let now = chrono::Utc::now().to_rfc3339();

        if next == OrderStatus::Delivered {
            self.apply_stock_delta(order, -1).await?;
            if order.shipping.delivered_at.is_none() {
                order.shipping.delivered_at = Some(now.clone());
            }
        }
        if current == OrderStatus::Delivered
            && matches!(next, OrderStatus::Cancelled | OrderStatus::Refunded)
        {
            self.apply_stock_delta(order, 1).await?;
        }
        if next == OrderStatus::Shipped && order.shipping.shipped_at.is_none() {
            order.shipping.shipped_at = Some(now);
        }

        order.status = next;
        timeline::append(
            &mut order.timeline,
            TimelineEventType::StatusChange,
            Some(format!("{} -> {}", current, next)),
            Some(serde_json::json!({ "from": current, "to": next })),
        );
        info!(
            order_number = %order.order_number,
            from = %current,
            to = %next,
            "Order status changed"
        );
        Ok(())
    }

    /// Move stock for every line item, sign * quantity each
    async fn apply_stock_delta(&self, order: &Order, sign: i64) -> AppResult<()> {
        for item in &order.items {
            self.products
                .adjust_stock(&item.product_id, item.variant_sku.as_deref(), sign * item.quantity)
                .await?;
        }
        Ok(())
    }

    /// Resolve one cart line into a snapshotted [`OrderItem`]
    async fn snapshot_line(
        &self,
        product_id: &str,
        variant_sku: Option<&str>,
        quantity: i64,
    ) -> AppResult<OrderItem> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        let (name, price, variant_sku) = match (product.product_type, variant_sku) {
            (ProductType::Simple, None) => (product.name.clone(), product.base_price, None),
            (ProductType::Simple, Some(sku)) => {
                return Err(AppError::Validation(format!(
                    "product {} is a simple product, variant {} does not apply",
                    product.name, sku
                )));
            }
            (ProductType::Variant, None) => {
                return Err(AppError::Validation(format!(
                    "product {} requires a variant_sku",
                    product.name
                )));
            }
            (ProductType::Variant, Some(sku)) => {
                let variant = product.variant(sku).ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Variant {} not found on product {}",
                        sku, product.name
                    ))
                })?;
                (
                    format!("{} ({})", product.name, variant.name),
                    variant.price,
                    Some(sku.to_string()),
                )
            }
        };

        Ok(OrderItem {
            product_id: product.id.unwrap_or_else(|| product_id.to_string()),
            variant_sku,
            name,
            quantity,
            price,
            subtotal: price * quantity as f64,
        })
    }
}

/// subtotal + tax + shipping - discount
pub fn compute_total(subtotal: f64, shipping_cost: f64, tax: f64, discount: f64) -> f64 {
    subtotal + tax + shipping_cost - discount
}

/// ORD-YYYYMMDD-XXXXXX, unique per the order_number index
fn generate_order_number() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("ORD-{}-{}", date, suffix)
}

/// Shallow merge of a payment update into the order
///
/// Flipping the status to `paid` stamps `paid_at` once and logs a
/// payment event; other field updates are silent.
fn merge_payment(order: &mut Order, update: PaymentUpdate) {
    if let Some(method) = update.method {
        order.payment.method = Some(method);
    }
    if let Some(transaction_id) = update.transaction_id {
        order.payment.transaction_id = Some(transaction_id);
    }
    if let Some(status) = update.status {
        if status != order.payment.status {
            order.payment.status = status;
            if status == PaymentStatus::Paid && order.payment.paid_at.is_none() {
                order.payment.paid_at = Some(chrono::Utc::now().to_rfc3339());
            }
            timeline::append(
                &mut order.timeline,
                TimelineEventType::Payment,
                Some(format!("Payment {}", status.as_str())),
                order
                    .payment
                    .transaction_id
                    .as_ref()
                    .map(|t| serde_json::json!({ "transaction_id": t })),
            );
        }
    }
}

fn merge_shipping(shipping: &mut ShippingInfo, update: ShippingUpdate) {
    if let Some(carrier) = update.carrier {
        shipping.carrier = Some(carrier);
    }
    if let Some(tracking_number) = update.tracking_number {
        shipping.tracking_number = Some(tracking_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{Address, CustomerInfo, OrderItemInput, ProductCreate, ProductUpdate};

    async fn setup() -> (OrderLifecycle, ProductRepository) {
        let db = DbService::memory().await.expect("in-memory db");
        (
            OrderLifecycle::new(db.db.clone()),
            ProductRepository::new(db.db),
        )
    }

    async fn seed_simple(products: &ProductRepository, name: &str, price: f64, stock: i64) -> String {
        let product = products
            .create(ProductCreate {
                name: name.to_string(),
                slug: None,
                sku: None,
                description: None,
                category: None,
                product_type: None,
                base_price: price,
                stock: Some(stock),
                low_stock_threshold: None,
                variant_options: None,
                images: None,
            })
            .await
            .expect("seed product");
        product.id.expect("product id")
    }

    fn order_input(product_id: &str, quantity: i64) -> OrderCreate {
        OrderCreate {
            customer: CustomerInfo {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                phone: None,
            },
            items: vec![OrderItemInput {
                product_id: product_id.to_string(),
                variant_sku: None,
                quantity,
            }],
            shipping_address: Address {
                line1: "1 Analytical Way".into(),
                line2: None,
                city: "London".into(),
                postal_code: "N1 9GU".into(),
                country: "GB".into(),
            },
            billing_address: None,
            payment: None,
            shipping: None,
            shipping_cost: Some(5.0),
            tax: Some(2.0),
            discount: None,
        }
    }

    async fn stock_of(products: &ProductRepository, id: &str) -> i64 {
        products
            .find_by_id(id)
            .await
            .expect("find product")
            .expect("product exists")
            .stock
    }

    fn transition(status: OrderStatus) -> OrderUpdate {
        OrderUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_creation_does_not_touch_stock() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;

        let order = lifecycle.create_order(order_input(&pid, 3)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, 37.5);
        assert_eq!(order.total, 37.5 + 2.0 + 5.0);
        assert_eq!(order.timeline.len(), 1);
        assert_eq!(order.timeline[0].event_type, TimelineEventType::Placed);
        assert_eq!(stock_of(&products, &pid).await, 10);
    }

    #[tokio::test]
    async fn test_delivery_decrements_stock_exactly_once() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 3)).await.unwrap();
        let oid = order.id.unwrap();

        lifecycle
            .update_order(&oid, transition(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 7);

        // Repeating the delivered status is a no-op on stock
        lifecycle
            .update_order(&oid, transition(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 7);
    }

    #[tokio::test]
    async fn test_cancel_after_delivery_restores_stock() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 4)).await.unwrap();
        let oid = order.id.unwrap();

        lifecycle
            .update_order(&oid, transition(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 6);

        let cancelled = lifecycle
            .update_order(&oid, transition(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&products, &pid).await, 10);
    }

    #[tokio::test]
    async fn test_oversold_delivery_clamps_then_restore_overshoots() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 2).await;
        let order = lifecycle.create_order(order_input(&pid, 5)).await.unwrap();
        let oid = order.id.unwrap();

        // Placement reserved nothing, so delivery can exceed the counter;
        // the floor holds at 0
        lifecycle
            .update_order(&oid, transition(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 0);

        // The restore is the full line quantity, not the clamped amount
        lifecycle
            .update_order(&oid, transition(OrderStatus::Refunded))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 5);
    }

    #[tokio::test]
    async fn test_cancel_before_delivery_is_stock_neutral() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 4)).await.unwrap();
        let oid = order.id.unwrap();

        lifecycle
            .update_order(&oid, transition(OrderStatus::Processing))
            .await
            .unwrap();
        lifecycle
            .update_order(&oid, transition(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(stock_of(&products, &pid).await, 10);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_catalog_changes() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 2)).await.unwrap();
        let oid = order.id.unwrap();

        products
            .update(
                &pid,
                ProductUpdate {
                    base_price: Some(99.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reread = lifecycle
            .update_order(&oid, transition(OrderStatus::Processing))
            .await
            .unwrap();
        assert_eq!(reread.items[0].price, 12.5);
        assert_eq!(reread.subtotal, 25.0);
        assert_eq!(reread.total, 25.0 + 2.0 + 5.0);
    }

    #[tokio::test]
    async fn test_undefined_transition_is_rejected() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 1)).await.unwrap();
        let oid = order.id.unwrap();

        lifecycle
            .update_order(&oid, transition(OrderStatus::Cancelled))
            .await
            .unwrap();

        let err = lifecycle
            .update_order(&oid, transition(OrderStatus::Processing))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_status_changes_append_chained_events() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;
        let order = lifecycle.create_order(order_input(&pid, 1)).await.unwrap();
        let oid = order.id.unwrap();

        lifecycle
            .update_order(&oid, transition(OrderStatus::Processing))
            .await
            .unwrap();
        let order = lifecycle
            .update_order(&oid, transition(OrderStatus::Shipped))
            .await
            .unwrap();

        // placed + two status changes
        assert_eq!(order.timeline.len(), 3);
        assert_eq!(order.timeline[1].event_type, TimelineEventType::StatusChange);
        assert_eq!(order.timeline[2].message.as_deref(), Some("processing -> shipped"));
        assert!(timeline::verify_chain(&order.timeline));
        assert!(order.shipping.shipped_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_product_fails_creation() {
        let (lifecycle, _) = setup().await;
        let err = lifecycle
            .create_order(order_input("product:doesnotexist", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_paid_at_creation_logs_payment_event() {
        let (lifecycle, products) = setup().await;
        let pid = seed_simple(&products, "Notebook", 12.5, 10).await;

        let mut input = order_input(&pid, 1);
        input.payment = Some(PaymentUpdate {
            method: Some("card".into()),
            status: Some(PaymentStatus::Paid),
            transaction_id: Some("txn_123".into()),
        });

        let order = lifecycle.create_order(input).await.unwrap();
        assert_eq!(order.payment.status, PaymentStatus::Paid);
        assert!(order.payment.paid_at.is_some());
        assert_eq!(order.timeline.len(), 2);
        assert_eq!(order.timeline[1].event_type, TimelineEventType::Payment);
        assert!(timeline::verify_chain(&order.timeline));
    }
}
