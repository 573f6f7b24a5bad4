//! Services Module
//!
//! External collaborators behind injected configuration.

pub mod media;

pub use media::{MediaConfig, MediaService};
