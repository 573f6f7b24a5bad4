//! Orders Module
//!
//! The order lifecycle engine and its append-only timeline. All order
//! mutations in the system go through [`OrderLifecycle`]; handlers and
//! repositories never change order state on their own.

pub mod lifecycle;
pub mod timeline;

pub use lifecycle::OrderLifecycle;
