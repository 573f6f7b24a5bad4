//! Authentication Module
//!
//! JWT issuing and validation, Argon2 password hashing, and the axum
//! middleware/extractor glue that injects [`CurrentUser`] into handlers.

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenPair};
pub use middleware::{require_admin, require_auth};
pub use password::{hash_password, verify_password};
