//! Order Model
//!
//! Orders are append-only once placed: line items and money fields are
//! snapshots taken at creation time, and all later changes flow through
//! the lifecycle engine's transition operations.

use serde::{Deserialize, Serialize};

/// Order status state machine
///
/// ```text
/// pending -> processing -> shipped -> delivered
/// pending/processing/shipped -> cancelled
/// pending/processing <-> on_hold, on_hold -> cancelled
/// delivered -> cancelled | refunded
/// ```
///
/// `cancelled` and `refunded` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    OnHold,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// Position in the fulfilment progression, None for off-path states
    fn progression(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            _ => None,
        }
    }

    /// Whether the transition `self -> next` is defined
    ///
    /// Forward moves along the fulfilment progression may skip states
    /// (an admin marking a pending order delivered is legal). A
    /// same-status "transition" is allowed and treated as a no-op by
    /// the lifecycle engine.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.progression(), next.progression()) {
            // Forward progression, skips allowed
            (Some(a), Some(b)) => b > a,
            _ => matches!(
                (*self, next),
                // Cancellation from any non-terminal state
                (_, Self::Cancelled)
                    // Refund only after delivery
                    | (Self::Delivered, Self::Refunded)
                    // Parking and resuming
                    | (Self::Pending, Self::OnHold)
                    | (Self::Processing, Self::OnHold)
                    | (Self::OnHold, Self::Pending)
                    | (Self::OnHold, Self::Processing)
            ),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::OnHold => "on_hold",
        };
        write!(f, "{}", s)
    }
}

/// Payment status, loosely coupled to the order status machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    PartiallyRefunded,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Refunded => "refunded",
        }
    }
}

/// Order line item, snapshotted at order time
///
/// Prices are copied, not referenced live: a later product price change
/// must not alter an existing order's totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product reference (String ID)
    pub product_id: String,
    /// Variant SKU for variant products
    pub variant_sku: Option<String>,
    pub name: String,
    pub quantity: i64,
    /// Unit price in currency unit at order time
    pub price: f64,
    /// price * quantity at order time
    pub subtotal: f64,
}

/// Payment sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentInfo {
    pub method: Option<String>,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub paid_at: Option<String>,
}

/// Shipping sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShippingInfo {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<String>,
    pub delivered_at: Option<String>,
}

/// Postal address
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Customer snapshot embedded in the order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Order timeline event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    Placed,
    Payment,
    StatusChange,
    Note,
}

impl TimelineEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Payment => "payment",
            Self::StatusChange => "status_change",
            Self::Note => "note",
        }
    }
}

/// Order timeline event — immutable once appended
///
/// Events are hash-chained: `curr_hash` covers the previous event's
/// hash plus this event's content, so retroactive edits break the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event_type: TimelineEventType,
    pub timestamp: String,
    pub message: Option<String>,
    pub data: Option<serde_json::Value>,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable unique number, e.g. ORD-20260829-4F2A1C
    pub order_number: String,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub shipping: ShippingInfo,
    /// Money fields, computed once at creation
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub discount: f64,
    /// subtotal + tax + shipping_cost - discount
    pub total: f64,
    pub timeline: Vec<TimelineEvent>,
    pub created_at: Option<String>,
}

/// Cart line in the create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub variant_sku: Option<String>,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer: CustomerInfo,
    pub items: Vec<OrderItemInput>,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment: Option<PaymentUpdate>,
    pub shipping: Option<ShippingUpdate>,
    pub shipping_cost: Option<f64>,
    pub tax: Option<f64>,
    pub discount: Option<f64>,
}

/// Partial payment update — merged shallowly into the sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentUpdate {
    pub method: Option<String>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

/// Partial shipping update — merged shallowly into the sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShippingUpdate {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
}

/// Update order payload (admin transition endpoint)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment: Option<PaymentUpdate>,
    pub shipping: Option<ShippingUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_progression() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        // Skips are legal
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        // No going back
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancellation_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Refunded));
        // Refund only after delivery
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Refunded.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_on_hold_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::OnHold));
        assert!(OrderStatus::OnHold.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::OnHold.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::OnHold));
        assert!(!OrderStatus::OnHold.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_same_status_is_allowed() {
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Delivered));
    }
}
