//! Shared types for the Reef store server
//!
//! Common types used across the workspace: domain models, the wire
//! error taxonomy and the API response envelope.

pub mod error;
pub mod models;
pub mod response;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::ApiErrorCode;
pub use response::ApiResponse;
