//! Reef Store Server - back-office commerce core
//!
//! # Architecture overview
//!
//! - **Catalog** (`catalog`): variant expansion, SKU/slug generation,
//!   derived stock status
//! - **Orders** (`orders`): lifecycle engine with delivery-time stock
//!   commitment and a hash-chained timeline
//! - **Database** (`db`): embedded SurrealDB storage behind repositories
//! - **Auth** (`auth`): JWT + Argon2
//! - **HTTP API** (`api`): RESTful routes and handlers
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT auth, password hashing
//! ├── catalog/       # variant generator, stock rules
//! ├── orders/        # order lifecycle engine, timeline
//! ├── services/      # media storage
//! ├── api/           # HTTP routes and handlers
//! ├── routes/        # router assembly, middleware stack
//! ├── utils/         # errors, logging
//! └── db/            # database layer
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderLifecycle;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____             ____
   / __ \___  ___  / __/
  / /_/ / _ \/ _ \/ /_
 / _, _/  __/  __/ __/
/_/ |_|\___/\___/_/
   Store Server
    "#
    );
}

/// Prepare the process environment: dotenv, work directories, logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(Some(&config.log_level), log_dir.to_str());

    Ok(())
}
