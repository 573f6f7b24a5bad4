//! Domain Models
//!
//! Wire-level entities shared between the server and its clients.
//! Each entity comes with Create/Update payload structs so handlers
//! never accept raw partial documents.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use order::{
    Address, CustomerInfo, Order, OrderCreate, OrderItem, OrderItemInput, OrderStatus,
    OrderUpdate, PaymentInfo, PaymentStatus, PaymentUpdate, ShippingInfo, ShippingUpdate,
    TimelineEvent, TimelineEventType,
};
pub use product::{
    Product, ProductCreate, ProductType, ProductUpdate, StockStatus, Variant, VariantOption,
    VariantUpdate,
};
pub use user::{Role, User, UserCreate, UserUpdate, UserView};
