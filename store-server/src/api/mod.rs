//! HTTP API Module
//!
//! One submodule per resource, each exposing a `router()` that the
//! route builder merges. Handlers stay thin: parse, delegate to a
//! repository or the lifecycle engine, wrap in the response envelope.

pub mod auth;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;
pub mod users;
